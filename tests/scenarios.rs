//! End-to-end coverage for the engine's documented concrete scenarios:
//! arithmetic, a malformed call, differentiation, integration, a limit,
//! a matrix determinant, and a matrix eigenvalue problem.

use caseng::classifier::Tag;
use caseng::{Engine, EvaluationResult};

fn success(engine: &Engine, expr: &str) -> caseng::SolutionBundle {
    match engine.analyze(expr) {
        EvaluationResult::Success { solution, .. } => solution,
        EvaluationResult::Failure { message, .. } => panic!("expected success for {:?}, got {}", expr, message),
    }
}

#[test]
fn arithmetic_expression_evaluates_to_a_number() {
    let engine = Engine::new();
    let bundle = success(&engine, "1+2");
    assert_eq!(bundle.approx.as_deref(), Some("3"));
}

#[test]
fn malformed_call_is_reported_as_a_failure_with_a_position() {
    let engine = Engine::new();
    match engine.analyze("log(,10)") {
        EvaluationResult::Failure { message, position } => {
            assert!(!message.is_empty());
            assert!(position < usize::MAX);
        }
        EvaluationResult::Success { .. } => panic!("expected a syntax failure"),
    }
}

#[test]
fn differentiating_sin_squared_produces_the_chain_rule_form() {
    let engine = Engine::new();
    let bundle = success(&engine, "diff(sin(x)^2,x)");
    assert_eq!(bundle.tag, Tag::CalculusDiff);
    assert!(bundle.exact.contains("\\cos"));
    assert!(bundle.exact.contains("\\sin"));
}

#[test]
fn integrating_the_arctan_pattern_includes_the_constant_of_integration() {
    let engine = Engine::new();
    let bundle = success(&engine, "integrate(1/(1+x^2),x)");
    assert_eq!(bundle.tag, Tag::CalculusIntegrate);
    assert!(bundle.exact.contains("+ C"));
    assert!(bundle.exact.contains("\\arctan") || bundle.exact.contains("\\tan^{-1}"));
}

#[test]
fn the_limit_of_sinc_at_zero_is_near_one() {
    let engine = Engine::new();
    let bundle = success(&engine, "limit(sin(x)/x, x->0)");
    assert_eq!(bundle.tag, Tag::CalculusLimit);
    let value = bundle.approx_value.expect("limit should converge");
    assert!((value - 1.0).abs() < 1e-6, "expected ~1.0, got {}", value);
}

#[test]
fn a_two_by_two_determinant_is_exact() {
    let engine = Engine::new();
    let bundle = success(&engine, "det(matrix(row(2,1),row(5,3)))");
    assert_eq!(bundle.tag, Tag::MatrixOp);
    assert_eq!(bundle.approx.as_deref(), Some("1"));
}

#[test]
fn diagonal_eigenvalues_are_reported_under_the_pinned_details_key() {
    let engine = Engine::new();
    let bundle = success(&engine, "eig(matrix(row(2,0),row(0,3)))");
    assert_eq!(bundle.tag, Tag::MatrixOp);
    let eigenwaarden = bundle.details.get("eigenwaarden").expect("eigenwaarden key must be present");
    let rendered: Vec<String> = serde_json::from_value(eigenwaarden.clone()).unwrap();
    assert_eq!(rendered, vec!["2".to_string(), "3".to_string()]);
}
