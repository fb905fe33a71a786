//! Single-traversal problem classification: AST → `ProblemDescriptor`.

use std::collections::BTreeSet;

use crate::ast::{BinaryOp, Node};
use crate::simplify::simplify;

pub const MATRIX_OPERATIONS: &[&str] =
    &["matAdd", "matMul", "det", "rank", "inverse", "eig", "svd", "solveSystem"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tag {
    Unknown,
    Polynomial,
    Quadratic,
    LinearSystem,
    MatrixOp,
    CalculusDiff,
    CalculusIntegrate,
    CalculusLimit,
    Algebraic,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MatrixShape {
    pub rows: usize,
    pub cols: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LimitShape {
    pub variable: String,
    pub target: f64,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Metadata {
    pub variables: BTreeSet<String>,
    pub primary_variable: Option<String>,
    pub has_equality: bool,
    pub operators: BTreeSet<&'static str>,
    pub functions: BTreeSet<String>,
    pub matrix: Option<MatrixShape>,
    pub limit: Option<LimitShape>,
    pub has_differential: bool,
    pub has_probability: bool,
    pub has_optimization: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProblemDescriptor {
    pub tag: Tag,
    pub metadata: Metadata,
}

pub fn analyze_problem(ast: &Node) -> ProblemDescriptor {
    let mut metadata = Metadata::default();
    collect(ast, &mut metadata);
    metadata.primary_variable = primary_variable(&metadata.variables);

    let tag = classify_tag(ast, &metadata);
    ProblemDescriptor { tag, metadata }
}

fn primary_variable(variables: &BTreeSet<String>) -> Option<String> {
    let single_letter = variables.iter().filter(|v| v.chars().count() == 1).min().cloned();
    single_letter.or_else(|| if variables.contains("x") { Some("x".to_string()) } else { None })
}

fn classify_tag(ast: &Node, metadata: &Metadata) -> Tag {
    if let Node::Call { name, args } = ast {
        match name.as_str() {
            "diff" | "differentiate" => return Tag::CalculusDiff,
            "integrate" | "int" => return Tag::CalculusIntegrate,
            "limit" => return Tag::CalculusLimit,
            "solveSystem" => return Tag::LinearSystem,
            _ if MATRIX_OPERATIONS.contains(&name.as_str()) => return Tag::MatrixOp,
            _ => {
                let _ = args;
            }
        }
    }

    if let Node::Binary { op: BinaryOp::Eq, .. } = ast {
        if let Some(var) = &metadata.primary_variable {
            if is_quadratic_in(ast, var) {
                return Tag::Quadratic;
            }
        }
    }

    if metadata.functions.is_empty() && metadata.has_equality {
        return Tag::Polynomial;
    }
    if !metadata.functions.is_empty() || metadata.operators.contains("^") {
        return Tag::Algebraic;
    }
    if !metadata.variables.is_empty() {
        return Tag::Polynomial;
    }
    Tag::Unknown
}

fn is_quadratic_in(eq: &Node, var: &str) -> bool {
    let Node::Binary { op: BinaryOp::Eq, left, right } = eq else { return false };
    let lhs_minus_rhs = Node::binary(BinaryOp::Sub, (**left).clone(), (**right).clone());
    let simplified = simplify(&lhs_minus_rhs);
    degree_in(&simplified, var) == Some(2)
}

fn degree_in(node: &Node, var: &str) -> Option<u32> {
    match node {
        Node::Number { .. } => Some(0),
        Node::Symbol { name } => {
            if name == var {
                Some(1)
            } else if name == "pi" || name == "e" || name == "i" {
                Some(0)
            } else {
                // A second free variable means this isn't a single-variable
                // polynomial in `var`; bail out rather than treating it as a
                // constant, matching `quadratic_coefficients`' rejection of
                // mixed-variable terms.
                None
            }
        }
        Node::Unary { operand, .. } => degree_in(operand, var),
        Node::Binary { op: BinaryOp::Add | BinaryOp::Sub, left, right } => {
            Some(degree_in(left, var)?.max(degree_in(right, var)?))
        }
        Node::Binary { op: BinaryOp::Mul, left, right } => Some(degree_in(left, var)? + degree_in(right, var)?),
        Node::Binary { op: BinaryOp::Pow, left, right } => {
            let base_degree = degree_in(left, var)?;
            let exp = right.number_value()?;
            if exp.fract() != 0.0 || exp < 0.0 {
                return None;
            }
            Some(base_degree * exp as u32)
        }
        Node::Binary { op: BinaryOp::Div, left, right } => {
            if degree_in(right, var)? == 0 {
                degree_in(left, var)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn collect(node: &Node, meta: &mut Metadata) {
    match node {
        Node::Number { .. } => {}
        Node::Symbol { name } => {
            if name != "pi" && name != "e" && name != "i" {
                meta.variables.insert(name.clone());
            }
        }
        Node::UnitQuantity { magnitude, .. } => collect(magnitude, meta),
        Node::Unary { operand, .. } => collect(operand, meta),
        Node::Binary { op, left, right } => {
            meta.operators.insert(op.symbol());
            if matches!(op, BinaryOp::Eq) {
                meta.has_equality = true;
            }
            collect(left, meta);
            collect(right, meta);
        }
        Node::Call { name, args } => {
            meta.functions.insert(name.clone());
            if name == "matrix" {
                let rows = args.len();
                let cols = args
                    .first()
                    .and_then(|r| if let Node::List { items } = r { Some(items.len()) } else { None })
                    .unwrap_or(0);
                meta.matrix = Some(MatrixShape { rows, cols });
            }
            if name == "limit" {
                if let (Some(expr), Some(Node::Arrow { from, to })) = (args.first(), args.get(1)) {
                    collect(expr, meta);
                    if let Node::Symbol { name } = from.as_ref() {
                        if let Some(target) = to.number_value() {
                            meta.limit = Some(LimitShape { variable: name.clone(), target });
                        }
                    }
                    return;
                }
            }
            for arg in args {
                collect(arg, meta);
            }
        }
        Node::Arrow { from, to } => {
            collect(from, meta);
            collect(to, meta);
        }
        Node::List { items } => {
            for item in items {
                collect(item, meta);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    fn classify(src: &str) -> ProblemDescriptor {
        analyze_problem(&parse_str(src).unwrap())
    }

    #[test]
    fn diff_call_is_calculus_diff() {
        assert_eq!(classify("diff(sin(x), x)").tag, Tag::CalculusDiff);
    }

    #[test]
    fn limit_call_is_calculus_limit() {
        let descriptor = classify("limit(sin(x)/x, x->0)");
        assert_eq!(descriptor.tag, Tag::CalculusLimit);
        let shape = descriptor.metadata.limit.unwrap();
        assert_eq!(shape.variable, "x");
        assert_eq!(shape.target, 0.0);
    }

    #[test]
    fn quadratic_equation_is_tagged_quadratic() {
        assert_eq!(classify("x^2+5*x+6=0").tag, Tag::Quadratic);
    }

    #[test]
    fn matrix_call_is_matrix_op() {
        let descriptor = classify("det(matrix(row(1,2),row(3,4)))");
        assert_eq!(descriptor.tag, Tag::MatrixOp);
    }

    #[test]
    fn solve_system_call_is_tagged_linear_system() {
        let descriptor = classify("solveSystem(matrix(row(1,1),row(0,1)), matrix(row(3),row(2)))");
        assert_eq!(descriptor.tag, Tag::LinearSystem);
    }

    #[test]
    fn a_cross_term_with_a_second_variable_is_not_tagged_quadratic() {
        assert_ne!(classify("x^2*y=0").tag, Tag::Quadratic);
    }

    #[test]
    fn primary_variable_prefers_single_letter() {
        let descriptor = classify("y = m*x + b");
        assert_eq!(descriptor.metadata.primary_variable, Some("b".to_string()));
    }
}
