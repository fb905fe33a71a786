//! The `caseng` command line front end: a `clap`-derived arg struct plus a
//! `run_cli` entry point that returns `Result<(), Box<dyn std::error::Error>>`
//! and talks to the user with plain `println!`/`eprintln!`.

use std::io::{self, BufRead, Write};

use clap::Parser;

use crate::config::EngineOptions;
use crate::engine::{Engine, EvaluationResult};
use crate::error::display_with_source;

/// A symbolic math engine: differentiation, integration, limits, quadratics,
/// matrix operations, and algebraic manipulation.
#[derive(Debug, Parser)]
#[command(name = "caseng")]
#[command(about = "Evaluate a symbolic math expression and print its solution as JSON", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The expression to evaluate. When omitted, one expression is read per
    /// line from stdin until EOF.
    pub expression: Option<String>,

    /// Decimal digits of precision used when rendering approximate values.
    #[arg(long, default_value_t = crate::config::DEFAULT_PRECISION)]
    pub precision: u8,
}

pub fn run_cli() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let options = EngineOptions { precision: cli.precision, ..EngineOptions::default() };
    let engine = Engine::with_options(options);

    match cli.expression {
        Some(expression) => evaluate_and_report(&engine, &expression),
        None => run_stdin_loop(&engine),
    }
}

fn run_stdin_loop(engine: &Engine) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let mut any_failure = false;
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if !evaluate_and_report(engine, &line)? {
            any_failure = true;
        }
    }
    if any_failure {
        std::process::exit(1);
    }
    Ok(())
}

/// Evaluates one expression, prints the result, and returns whether it succeeded.
fn evaluate_and_report(engine: &Engine, expression: &str) -> Result<bool, Box<dyn std::error::Error>> {
    match engine.analyze(expression) {
        EvaluationResult::Success { solution, .. } => {
            let json = serde_json::to_string_pretty(&solution)?;
            println!("{}", json);
            Ok(true)
        }
        EvaluationResult::Failure { message, position } => {
            eprintln!("{}", display_with_source(&message, position, expression));
            io::stdout().flush()?;
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_an_expression_argument() {
        let cli = Cli::try_parse_from(["caseng", "1+2"]).unwrap();
        assert_eq!(cli.expression.as_deref(), Some("1+2"));
        assert_eq!(cli.precision, crate::config::DEFAULT_PRECISION);
    }

    #[test]
    fn cli_accepts_a_precision_override() {
        let cli = Cli::try_parse_from(["caseng", "--precision", "4", "1+2"]).unwrap();
        assert_eq!(cli.precision, 4);
    }
}
