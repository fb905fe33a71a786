//! A process-wide ordered list of strategies behind a narrow interface.
//! No hidden reflection: the registry is a plain `Vec` built once.

mod calculus;
mod manipulation;
mod matrix;
mod quadratic;

use crate::ast::Node;
use crate::bundle::SolutionBundle;
use crate::classifier::ProblemDescriptor;
use crate::config::EngineOptions;
use crate::token::Token;

/// Everything a strategy needs to decide whether it applies and, if so, to
/// build its bundle. Borrowed, not owned: strategies never mutate the
/// pipeline's intermediate values.
pub struct Context<'a> {
    pub input: &'a str,
    pub tokens: &'a [Token],
    pub ast: &'a Node,
    pub simplified: &'a Node,
    pub descriptor: &'a ProblemDescriptor,
    pub options: &'a EngineOptions,
}

pub trait Strategy {
    fn matches(&self, ctx: &Context) -> bool;
    fn solve(&self, ctx: &Context) -> SolutionBundle;
}

/// Built once, in registration order; registration order is the tie-breaker
/// when more than one strategy would match.
pub fn registry() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(quadratic::QuadraticStrategy),
        Box::new(calculus::CalculusStrategy),
        Box::new(manipulation::ManipulationStrategy),
        Box::new(matrix::MatrixStrategy),
    ]
}

/// Returns the first matching strategy's bundle, or `None` if no strategy
/// in `strategies` matches — the caller (the engine façade) then falls back
/// to formatting the simplified AST directly.
pub fn resolve_strategy(strategies: &[Box<dyn Strategy>], ctx: &Context) -> Option<SolutionBundle> {
    strategies.iter().find(|s| s.matches(ctx)).map(|s| s.solve(ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::analyze_problem;
    use crate::parser::parse_str;
    use crate::simplify::simplify;

    fn context_for<'a>(
        input: &'a str,
        ast: &'a Node,
        simplified: &'a Node,
        descriptor: &'a ProblemDescriptor,
        options: &'a EngineOptions,
    ) -> Context<'a> {
        Context { input, tokens: &[], ast, simplified, descriptor, options }
    }

    #[test]
    fn resolve_strategy_picks_the_first_match_in_registration_order() {
        let ast = parse_str("diff(sin(x), x)").unwrap();
        let simplified = simplify(&ast);
        let descriptor = analyze_problem(&ast);
        let options = EngineOptions::default();
        let strategies = registry();
        let ctx = context_for("diff(sin(x), x)", &ast, &simplified, &descriptor, &options);
        let bundle = resolve_strategy(&strategies, &ctx).expect("calculus strategy should match");
        assert!(!bundle.steps.is_empty());
    }

    #[test]
    fn resolve_strategy_returns_none_for_unmatched_input() {
        let ast = parse_str("x+y+z").unwrap();
        let simplified = simplify(&ast);
        let descriptor = analyze_problem(&ast);
        let options = EngineOptions::default();
        let strategies = registry();
        let ctx = context_for("x+y+z", &ast, &simplified, &descriptor, &options);
        assert!(resolve_strategy(&strategies, &ctx).is_none());
    }
}
