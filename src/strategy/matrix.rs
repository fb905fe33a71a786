//! Matrix-operation call names: dispatches to the numeric linear-algebra
//! kernels. Covers both `matrixOp` calls and `solveSystem`, which is
//! classified separately as `linearSystem` but still a matrix-kernel call.

use serde_json::json;

use crate::ast::Node;
use crate::bundle::{SolutionBundle, Step};
use crate::classifier::{Tag, MATRIX_OPERATIONS};
use crate::error::EvaluationError;
use crate::formatter::format_approx;
use crate::matrix::{matrix_from_node, Matrix};

use super::{Context, Strategy};

pub struct MatrixStrategy;

impl Strategy for MatrixStrategy {
    fn matches(&self, ctx: &Context) -> bool {
        matches!(ctx.descriptor.tag, Tag::MatrixOp | Tag::LinearSystem)
    }

    fn solve(&self, ctx: &Context) -> SolutionBundle {
        let locale = &ctx.options.locale;
        let precision = ctx.options.precision;
        let Node::Call { name, args } = ctx.simplified else {
            return error_bundle(ctx, ctx.descriptor.tag, "expected a matrix operation call");
        };

        let result = dispatch(name, args, precision);
        let (exact, approx, approx_value, details) = match result {
            Ok(outcome) => outcome,
            Err(e) => return error_bundle(ctx, ctx.descriptor.tag, &e.message),
        };

        SolutionBundle {
            tag: ctx.descriptor.tag,
            descriptor: ctx.descriptor.clone(),
            exact,
            approx,
            approx_value,
            steps: vec![Step::new(locale.matrix_title.clone(), locale.matrix_description.clone())],
            follow_ups: vec![],
            plot_config: None,
            details,
        }
    }
}

type Outcome = (String, Option<String>, Option<f64>, std::collections::BTreeMap<String, serde_json::Value>);

fn dispatch(name: &str, args: &[Node], precision: u8) -> Result<Outcome, EvaluationError> {
    if !MATRIX_OPERATIONS.contains(&name) {
        return Err(EvaluationError::new(format!("unrecognized matrix operation '{}'", name), 0));
    }
    match name {
        "det" => {
            let m = matrix_from_node(one_arg(args)?)?;
            let value = m.determinant()?;
            let rendered = format_approx(value, precision);
            Ok((format!("\\det\\left(M\\right) = {}", rendered.clone()), Some(rendered), Some(value), details()))
        }
        "rank" => {
            let m = matrix_from_node(one_arg(args)?)?;
            let value = m.rank() as f64;
            Ok((
                format!("\\operatorname{{rank}}(M) = {}", value as i64),
                Some(format_approx(value, precision)),
                Some(value),
                details(),
            ))
        }
        "inverse" => {
            let m = matrix_from_node(one_arg(args)?)?;
            let inv = m.inverse()?;
            Ok((format!("M^{{-1}} = {}", matrix_to_latex(&inv, precision)), None, None, details()))
        }
        "matAdd" => {
            let (a, b) = two_args(args)?;
            let sum = matrix_from_node(a)?.add(&matrix_from_node(b)?)?;
            Ok((matrix_to_latex(&sum, precision), None, None, details()))
        }
        "matMul" => {
            let (a, b) = two_args(args)?;
            let product = matrix_from_node(a)?.mul(&matrix_from_node(b)?)?;
            Ok((matrix_to_latex(&product, precision), None, None, details()))
        }
        "eig" => {
            let m = matrix_from_node(one_arg(args)?)?;
            let eigenvalues = m.eigenvalues()?;
            let rendered: Vec<String> = eigenvalues.iter().map(|v| format_approx(*v, precision)).collect();
            let latex = format!("\\lambda \\in \\{{{}\\}}", rendered.join(", "));
            let mut d = details();
            // Stable data-contract key, not localizable step text.
            d.insert("eigenwaarden".to_string(), json!(rendered));
            Ok((latex, None, None, d))
        }
        "svd" => {
            let m = matrix_from_node(one_arg(args)?)?;
            let singular_values = m.singular_values()?;
            let rendered: Vec<String> = singular_values.iter().map(|v| format_approx(*v, precision)).collect();
            let latex = format!("\\sigma \\in \\{{{}\\}}", rendered.join(", "));
            let mut d = details();
            d.insert("singularValues".to_string(), json!(rendered));
            Ok((latex, None, None, d))
        }
        "solveSystem" => {
            let (a, b) = two_args(args)?;
            let matrix = matrix_from_node(a)?;
            let rhs = matrix_from_node(b)?;
            let column: Vec<f64> = (0..rhs.rows).map(|r| rhs.get(r, 0)).collect();
            let solution = matrix.solve_linear_system(&column)?;
            let rendered: Vec<String> = solution.iter().map(|v| format_approx(*v, precision)).collect();
            let latex = format!("x = \\left({}\\right)", rendered.join(", "));
            Ok((latex, None, None, details()))
        }
        _ => Err(EvaluationError::new(format!("unrecognized matrix operation '{}'", name), 0)),
    }
}

fn details() -> std::collections::BTreeMap<String, serde_json::Value> {
    Default::default()
}

fn one_arg(args: &[Node]) -> Result<&Node, EvaluationError> {
    args.first().ok_or_else(|| EvaluationError::new("missing matrix argument", 0))
}

fn two_args(args: &[Node]) -> Result<(&Node, &Node), EvaluationError> {
    if args.len() < 2 {
        return Err(EvaluationError::new("expected two matrix arguments", 0));
    }
    Ok((&args[0], &args[1]))
}

fn matrix_to_latex(m: &Matrix, precision: u8) -> String {
    let rows: Vec<String> = (0..m.rows)
        .map(|r| (0..m.cols).map(|c| format_approx(m.get(r, c), precision)).collect::<Vec<_>>().join(" & "))
        .collect();
    format!("\\begin{{bmatrix}} {} \\end{{bmatrix}}", rows.join(" \\\\ "))
}

fn error_bundle(ctx: &Context, tag: Tag, message: &str) -> SolutionBundle {
    let locale = &ctx.options.locale;
    SolutionBundle {
        tag,
        descriptor: ctx.descriptor.clone(),
        exact: format!("\\text{{{}}}", message),
        approx: None,
        approx_value: None,
        steps: vec![Step::new(locale.matrix_title.clone(), message.to_string())],
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
        MatrixStrategy.solve(&ctx)
    }

    #[test]
    fn determinant_scenario() {
        let bundle = solve("det(matrix(row(2,1),row(5,3)))");
        assert!(bundle.exact.contains("\\det"));
        assert_eq!(bundle.approx.as_deref(), Some("1"));
    }

    #[test]
    fn eigenvalues_scenario_uses_the_pinned_details_key() {
        let bundle = solve("eig(matrix(row(2,0),row(0,3)))");
        let eigenwaarden = bundle.details.get("eigenwaarden").unwrap();
        let rendered: Vec<String> = serde_json::from_value(eigenwaarden.clone()).unwrap();
        assert_eq!(rendered, vec!["2".to_string(), "3".to_string()]);
    }

    #[test]
    fn solve_system_is_tagged_as_a_linear_system() {
        let bundle = solve("solveSystem(matrix(row(1,1),row(0,1)), matrix(row(3),row(2)))");
        assert_eq!(bundle.tag, Tag::LinearSystem);
        assert!(bundle.exact.contains('x'));
    }
}
