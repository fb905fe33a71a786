//! The quadratic-equation solver: discriminant, roots, and a parabola plot
//! config.

use serde_json::json;

use crate::bundle::{FollowUp, PlotConfig, SolutionBundle, Step};
use crate::classifier::Tag;
use crate::formatter::{format_approx, to_katex};
use crate::simplify::manipulate::quadratic_coefficients;

use super::{Context, Strategy};

pub struct QuadraticStrategy;

impl Strategy for QuadraticStrategy {
    fn matches(&self, ctx: &Context) -> bool {
        ctx.descriptor.tag == Tag::Quadratic
    }

    fn solve(&self, ctx: &Context) -> SolutionBundle {
        let locale = &ctx.options.locale;
        let precision = ctx.options.precision;
        let Some((a, b, c, var)) = quadratic_coefficients(ctx.simplified) else {
            return unresolved_quadratic_bundle(ctx);
        };

        let discriminant = b * b - 4.0 * a * c;
        let discriminant_step = Step::new(
            locale.quadratic_discriminant_title.clone(),
            locale.quadratic_discriminant_description.clone(),
        )
        .with_latex(format!("{}^2 - 4({})({}) = {}", b, a, c, format_approx(discriminant, precision)));
        let mut steps = vec![discriminant_step];

        let two_a = 2.0 * a;
        let (roots_tex, roots_json, root_description) = if discriminant > 1e-12 {
            let sqrt_d = discriminant.sqrt();
            let r1 = (-b + sqrt_d) / two_a;
            let r2 = (-b - sqrt_d) / two_a;
            (
                format!(
                    "{} = {}, \\quad {} = {}",
                    symbol_tex(&var, 1),
                    format_approx(r1, precision),
                    symbol_tex(&var, 2),
                    format_approx(r2, precision)
                ),
                json!([format_approx(r1, precision), format_approx(r2, precision)]),
                locale.quadratic_roots_real_description.clone(),
            )
        } else if discriminant >= -1e-12 {
            let r = -b / two_a;
            (
                format!("{} = {}", to_katex(&crate::ast::Node::symbol(var.clone())), format_approx(r, precision)),
                json!([format_approx(r, precision)]),
                locale.quadratic_roots_double_description.clone(),
            )
        } else {
            let re = -b / two_a;
            let im = (-discriminant).sqrt() / two_a;
            (
                format!(
                    "{} = {} \\pm {}i",
                    to_katex(&crate::ast::Node::symbol(var.clone())),
                    format_approx(re, precision),
                    format_approx(im.abs(), precision)
                ),
                json!([
                    format!("{}+{}i", format_approx(re, precision), format_approx(im.abs(), precision)),
                    format!("{}-{}i", format_approx(re, precision), format_approx(im.abs(), precision)),
                ]),
                locale.quadratic_roots_complex_description.clone(),
            )
        };

        steps.push(Step::new(locale.quadratic_roots_title.clone(), root_description).with_latex(roots_tex));

        let vertex_x = -b / two_a;
        let plot_config = PlotConfig {
            kind: "parabola".to_string(),
            expression: to_katex(ctx.simplified),
            variable: var.clone(),
            x_min: vertex_x - 10.0,
            x_max: vertex_x + 10.0,
        };

        let mut details = std::collections::BTreeMap::new();
        details.insert("discriminant".to_string(), json!(discriminant));
        details.insert("roots".to_string(), roots_json);

        SolutionBundle {
            tag: Tag::Quadratic,
            descriptor: ctx.descriptor.clone(),
            exact: to_katex(ctx.simplified),
            approx: None,
            approx_value: None,
            steps,
            follow_ups: vec![FollowUp {
                label: locale.follow_up_simplify_label.clone(),
                description: locale.follow_up_simplify_description.clone(),
            }],
            plot_config: Some(plot_config),
            details,
        }
    }
}

fn symbol_tex(var: &str, index: usize) -> String {
    format!("{}_{{{}}}", to_katex(&crate::ast::Node::symbol(var.to_string())), index)
}

/// Used when the classifier tags an equation quadratic but coefficient
/// extraction can't pin down a single free variable (e.g. a second free
/// variable appears in a cross term that the degree count alone let through).
fn unresolved_quadratic_bundle(ctx: &Context) -> SolutionBundle {
    let locale = &ctx.options.locale;
    SolutionBundle {
        tag: Tag::Quadratic,
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
