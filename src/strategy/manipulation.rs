//! `simplify(...)`, `expand(...)`, `factor(...)` command forms: delegates
//! to the simplifier's manipulation helpers, emits before/after steps.

use crate::ast::Node;
use crate::bundle::{FollowUp, SolutionBundle, Step};
use crate::classifier::Tag;
use crate::formatter::to_katex;
use crate::simplify::manipulate::{expand, factor};
use crate::simplify::simplify;

use super::{Context, Strategy};

pub struct ManipulationStrategy;

const COMMANDS: &[&str] = &["simplify", "expand", "factor"];

impl Strategy for ManipulationStrategy {
    fn matches(&self, ctx: &Context) -> bool {
        matches!(ctx.simplified, Node::Call { name, args } if COMMANDS.contains(&name.as_str()) && args.len() == 1)
    }

    fn solve(&self, ctx: &Context) -> SolutionBundle {
        let locale = &ctx.options.locale;
        let Node::Call { name, args } = ctx.simplified else {
            unreachable!("ManipulationStrategy::matches only accepts single-argument commands");
        };
        let input_expr = &args[0];

        let (title, description, result) = match name.as_str() {
            "simplify" => (locale.simplify_title.clone(), locale.simplify_description.clone(), simplify(input_expr)),
            "expand" => (locale.expand_title.clone(), locale.expand_description.clone(), expand(input_expr)),
            "factor" => (locale.factor_title.clone(), locale.factor_description.clone(), factor(input_expr)),
            _ => unreachable!("ManipulationStrategy::matches only accepts COMMANDS"),
        };

        let steps = vec![
            Step::new(locale.manipulation_before_title.clone(), locale.manipulation_before_description.clone())
                .with_latex(to_katex(input_expr)),
            Step::new(title, description).with_latex(to_katex(&result)),
        ];

        SolutionBundle {
            tag: Tag::Algebraic,
            descriptor: ctx.descriptor.clone(),
            exact: to_katex(&result),
            approx: None,
            approx_value: None,
            steps,
            follow_ups: vec![FollowUp {
                label: locale.follow_up_differentiate_label.clone(),
                description: locale.follow_up_differentiate_description.clone(),
            }],
            plot_config: None,
            details: Default::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::analyze_problem;
    use crate::config::EngineOptions;
    use crate::parser::parse_str;
    use crate::simplify::simplify as simplify_ast;

    fn solve(src: &str) -> SolutionBundle {
        let ast = parse_str(src).unwrap();
        let simplified = simplify_ast(&ast);
        let descriptor = analyze_problem(&simplified);
        let options = EngineOptions::default();
        let ctx = Context { input: src, tokens: &[], ast: &ast, simplified: &simplified, descriptor: &descriptor, options: &options };
        ManipulationStrategy.solve(&ctx)
    }

    #[test]
    fn expand_distributes_multiplication() {
        let bundle = solve("expand((x+1)*(x+2))");
        assert!(bundle.exact.contains("x^{2}"));
    }

    #[test]
    fn factor_recovers_roots() {
        let bundle = solve("factor(x^2-5*x+6)");
        assert!(bundle.exact.contains('-'));
        assert_eq!(bundle.steps.len(), 2);
    }
}
