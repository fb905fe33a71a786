//! `diff`/`differentiate`, `integrate`/`int`, and `limit` command forms:
//! delegates to the calculus module, emits per-rule trace steps.

use crate::ast::Node;
use crate::bundle::{FollowUp, SolutionBundle, Step};
use crate::calculus::{differentiate, integrate, limit};
use crate::classifier::Tag;
use crate::formatter::{format_approx, to_katex};

use super::{Context, Strategy};

pub struct CalculusStrategy;

impl Strategy for CalculusStrategy {
    fn matches(&self, ctx: &Context) -> bool {
        matches!(ctx.descriptor.tag, Tag::CalculusDiff | Tag::CalculusIntegrate | Tag::CalculusLimit)
    }

    fn solve(&self, ctx: &Context) -> SolutionBundle {
        match ctx.descriptor.tag {
            Tag::CalculusDiff => solve_diff(ctx),
            Tag::CalculusIntegrate => solve_integrate(ctx),
            Tag::CalculusLimit => solve_limit(ctx),
            _ => unreachable!("CalculusStrategy::matches only accepts the three calculus tags"),
        }
    }
}

fn call_args(node: &Node) -> &[Node] {
    match node {
        Node::Call { args, .. } => args,
        _ => &[],
    }
}

fn solve_diff(ctx: &Context) -> SolutionBundle {
    let locale = &ctx.options.locale;
    let args = call_args(ctx.simplified);
    let (expr, var) = match args {
        [expr, Node::Symbol { name }] => (expr, name.clone()),
        _ => return unresolved_calculus_bundle(ctx, Tag::CalculusDiff),
    };

    let derivative = differentiate(expr, &var);
    let steps = vec![
        Step::new(locale.differentiate_title.clone(), locale.differentiate_description.clone())
            .with_latex(format!("\\frac{{d}}{{d{}}}\\left({}\\right)", var, to_katex(expr))),
        Step::new(locale.result_title.clone(), locale.result_description.clone()).with_latex(to_katex(&derivative)),
    ];

    SolutionBundle {
        tag: Tag::CalculusDiff,
        descriptor: ctx.descriptor.clone(),
        exact: to_katex(&derivative),
        approx: None,
        approx_value: None,
        steps,
        follow_ups: vec![FollowUp {
            label: locale.follow_up_simplify_label.clone(),
            description: locale.follow_up_simplify_description.clone(),
        }],
        plot_config: None,
        details: Default::default(),
    }
}

fn solve_integrate(ctx: &Context) -> SolutionBundle {
    let locale = &ctx.options.locale;
    let args = call_args(ctx.simplified);
    let (expr, var) = match args {
        [expr, Node::Symbol { name }] => (expr, name.clone()),
        _ => return unresolved_calculus_bundle(ctx, Tag::CalculusIntegrate),
    };

    let mut details = std::collections::BTreeMap::new();
    let integral_latex = format!("\\int {} \\, d{}", to_katex(expr), var);

    let (exact, steps) = match integrate(expr, &var) {
        Some(antiderivative) => {
            let exact = format!("{} + C", to_katex(&antiderivative));
            let steps = vec![
                Step::new(locale.integrate_title.clone(), locale.integrate_description.clone())
                    .with_latex(integral_latex.clone()),
                Step::new(locale.result_title.clone(), locale.result_description.clone()).with_latex(exact.clone()),
            ];
            (exact, steps)
        }
        None => {
            details.insert("resolved".to_string(), serde_json::json!(false));
            let steps = vec![Step::new(locale.integrate_title.clone(), locale.integrate_unresolved_description.clone())
                .with_latex(integral_latex.clone())];
            (integral_latex, steps)
        }
    };

    SolutionBundle {
        tag: Tag::CalculusIntegrate,
        descriptor: ctx.descriptor.clone(),
        exact,
        approx: None,
        approx_value: None,
        steps,
        follow_ups: vec![FollowUp {
            label: locale.follow_up_differentiate_label.clone(),
            description: locale.follow_up_differentiate_description.clone(),
        }],
        plot_config: None,
        details,
    }
}

fn solve_limit(ctx: &Context) -> SolutionBundle {
    let locale = &ctx.options.locale;
    let precision = ctx.options.precision;
    let args = call_args(ctx.simplified);
    let (expr, var, target_node) = match args {
        [expr, Node::Arrow { from, to }] => match from.as_ref() {
            Node::Symbol { name } => (expr, name.clone(), to.as_ref()),
            _ => return unresolved_calculus_bundle(ctx, Tag::CalculusLimit),
        },
        _ => return unresolved_calculus_bundle(ctx, Tag::CalculusLimit),
    };
    let Some(target) = target_node.number_value() else {
        return unresolved_calculus_bundle(ctx, Tag::CalculusLimit);
    };

    let limit_latex = format!("\\lim_{{{} \\to {}}} {}", var, to_katex(target_node), to_katex(expr));
    let mut steps =
        vec![Step::new(locale.limit_title.clone(), locale.limit_description.clone()).with_latex(limit_latex)];

    let (exact, approx, approx_value) = match limit(expr, &var, target) {
        Some(value) => {
            let rendered = format_approx(value, precision);
            steps.push(Step::new(locale.result_title.clone(), locale.result_description.clone()).with_latex(rendered.clone()));
            (rendered.clone(), Some(rendered), Some(value))
        }
        None => {
            steps.push(Step::new(locale.result_title.clone(), locale.limit_divergent_description.clone()));
            ("\\text{undefined}".to_string(), None, None)
        }
    };

    SolutionBundle {
        tag: Tag::CalculusLimit,
        descriptor: ctx.descriptor.clone(),
        exact,
        approx,
        approx_value,
        steps,
        follow_ups: vec![],
        plot_config: None,
        details: Default::default(),
    }
}

fn unresolved_calculus_bundle(ctx: &Context, tag: Tag) -> SolutionBundle {
    let locale = &ctx.options.locale;
    SolutionBundle {
        tag,
        descriptor: ctx.descriptor.clone(),
        exact: to_katex(ctx.simplified),
        approx: None,
        approx_value: None,
        steps: vec![Step::new(locale.fallback_title.clone(), locale.fallback_description.clone())],
        follow_ups: vec![],
        plot_config: None,
        details: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::analyze_problem;
    use crate::config::EngineOptions;
    use crate::parser::parse_str;
    use crate::simplify::simplify;

    fn solve(src: &str) -> SolutionBundle {
        let ast = parse_str(src).unwrap();
        let simplified = simplify(&ast);
        let descriptor = analyze_problem(&simplified);
        let options = EngineOptions::default();
        let ctx = Context { input: src, tokens: &[], ast: &ast, simplified: &simplified, descriptor: &descriptor, options: &options };
        CalculusStrategy.solve(&ctx)
    }

    #[test]
    fn differentiate_sin_squared_mentions_sin_and_cos() {
        let bundle = solve("diff(sin(x)^2, x)");
        assert!(bundle.exact.contains("\\sin"));
        assert!(bundle.exact.contains("\\cos"));
        assert!(bundle.steps.len() > 1);
    }

    #[test]
    fn integrate_arctan_pattern_includes_constant_of_integration() {
        let bundle = solve("integrate(1/(1+x^2), x)");
        assert!(bundle.exact.contains("arctan"));
        assert!(bundle.exact.contains('C'));
    }

    #[test]
    fn limit_of_sinc_is_near_one() {
        let bundle = solve("limit(sin(x)/x, x->0)");
        let value = bundle.approx_value.unwrap();
        assert!((value - 1.0).abs() < 1e-4);
    }
}
