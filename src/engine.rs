//! The façade: `tokenize → parse → simplify → classify → resolve_strategy →
//! strategy-or-fallback → SolutionBundle`. The library's only public entry
//! point besides the individual stage modules.

use crate::ast::Node;
use crate::bundle::SolutionBundle;
use crate::classifier::{self, Tag};
use crate::config::EngineOptions;
use crate::error::EvaluationFailure;
use crate::formatter::{format_approx, to_katex};
use crate::lexer;
use crate::parser;
use crate::simplify::simplify;
use crate::strategy::{self, Context, Strategy};
use crate::token::Token;

#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationResult {
    Success {
        tokens: Vec<Token>,
        ast: Node,
        simplified: Node,
        solution: SolutionBundle,
        exact: String,
        approx: Option<String>,
        approx_value: Option<f64>,
    },
    Failure {
        message: String,
        position: usize,
    },
}

/// Owns the strategy registry (populated once, never mutated after
/// construction) plus the engine's configuration.
pub struct Engine {
    options: EngineOptions,
    strategies: Vec<Box<dyn Strategy>>,
}

impl Engine {
    pub fn new() -> Self {
        Self { options: EngineOptions::default(), strategies: strategy::registry() }
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self { options, strategies: strategy::registry() }
    }

    pub fn analyze(&self, input: &str) -> EvaluationResult {
        match self.analyze_inner(input) {
            Ok(result) => result,
            Err(failure) => EvaluationResult::Failure { message: failure.message, position: failure.position },
        }
    }

    fn analyze_inner(&self, input: &str) -> Result<EvaluationResult, EvaluationFailure> {
        if input.len() > self.options.max_input_len {
            return Err(EvaluationFailure {
                message: format!("input exceeds the maximum length of {} bytes", self.options.max_input_len),
                position: input.len(),
            });
        }

        let tokens = lexer::tokenize(input)?;
        let ast = parser::parse(tokens.clone(), input)?;
        let simplified = simplify(&ast);
        let descriptor = classifier::analyze_problem(&simplified);

        let ctx = Context {
            input,
            tokens: &tokens,
            ast: &ast,
            simplified: &simplified,
            descriptor: &descriptor,
            options: &self.options,
        };

        let solution = strategy::resolve_strategy(&self.strategies, &ctx).unwrap_or_else(|| fallback(&ctx));

        Ok(EvaluationResult::Success {
            exact: solution.exact.clone(),
            approx: solution.approx.clone(),
            approx_value: solution.approx_value,
            tokens,
            ast,
            simplified,
            solution,
        })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Used only when no strategy matches: format `simplified` as TeX and
/// attempt a ground numeric evaluation for `approx`.
fn fallback(ctx: &Context) -> SolutionBundle {
    let locale = &ctx.options.locale;
    let exact = to_katex(ctx.simplified);
    let env = crate::evaluator::Env::new();
    let (approx, approx_value) = match crate::evaluator::evaluate(ctx.simplified, &env) {
        Ok(value) => match value.as_real() {
            Some(r) => (Some(format_approx(r, ctx.options.precision)), Some(r)),
            None => (None, None),
        },
        Err(_) => (None, None),
    };

    SolutionBundle {
        tag: Tag::Unknown,
        descriptor: ctx.descriptor.clone(),
        exact,
        approx,
        approx_value,
        steps: vec![],
        follow_ups: vec![],
        plot_config: None,
        details: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_simple_arithmetic() {
        let engine = Engine::new();
        match engine.analyze("1+2") {
            EvaluationResult::Success { approx, exact, .. } => {
                assert_eq!(approx.as_deref(), Some("3"));
                assert!(exact.contains('3'));
            }
            EvaluationResult::Failure { .. } => panic!("expected success"),
        }
    }

    #[test]
    fn analyze_reports_a_syntax_failure_with_a_position() {
        let engine = Engine::new();
        match engine.analyze("log(,10)") {
            EvaluationResult::Failure { position, .. } => assert!(position < usize::MAX),
            EvaluationResult::Success { .. } => panic!("expected failure"),
        }
    }

    #[test]
    fn analyze_quadratic_routes_to_the_quadratic_strategy() {
        let engine = Engine::new();
        match engine.analyze("x^2-5*x+6=0") {
            EvaluationResult::Success { solution, .. } => assert_eq!(solution.tag, Tag::Quadratic),
            EvaluationResult::Failure { message, .. } => panic!("expected success, got {}", message),
        }
    }

    #[test]
    fn input_longer_than_max_len_is_rejected() {
        let options = EngineOptions { max_input_len: 4, ..EngineOptions::default() };
        let engine = Engine::with_options(options);
        match engine.analyze("1+2+3+4+5") {
            EvaluationResult::Failure { position, .. } => assert_eq!(position, 9),
            EvaluationResult::Success { .. } => panic!("expected failure"),
        }
    }
}
