//! Universal invariants checked against small generated expression trees:
//! parse→format determinism, simplifier idempotence, evaluator agreement
//! with the simplifier's rewrites, and differentiation linearity.

use proptest::prelude::*;

use caseng::ast::{BinaryOp, Node};
use caseng::calculus::differentiate::differentiate;
use caseng::evaluator::{evaluate, Env};
use caseng::formatter::to_katex;
use caseng::parser::parse_str;
use caseng::simplify::simplify;

const TOLERANCE: f64 = 1e-9;

/// A small arithmetic source string built from digits, `x`, and `+ - * /`,
/// fully parenthesized so the parser never has to disambiguate precedence.
fn arb_source(depth: u32) -> BoxedStrategy<String> {
    let leaf = prop_oneof![(1u32..9).prop_map(|n| n.to_string()), Just("x".to_string()),];
    if depth == 0 {
        return leaf.boxed();
    }
    let op = prop_oneof![Just("+"), Just("-"), Just("*"), Just("/")];
    (arb_source(depth - 1), arb_source(depth - 1), op)
        .prop_map(|(l, r, op)| format!("({}{}{})", l, op, r))
        .boxed()
}

/// A small arithmetic AST restricted to `Add`/`Sub`/`Mul` over digits and `x`,
/// avoiding `Div` so every generated tree evaluates and differentiates
/// without needing to dodge a division by zero.
fn arb_expr(depth: u32) -> BoxedStrategy<Node> {
    let leaf = prop_oneof![
        (1i64..9).prop_map(Node::int),
        Just(Node::symbol("x")),
    ];
    if depth == 0 {
        return leaf.boxed();
    }
    let op = prop_oneof![Just(BinaryOp::Add), Just(BinaryOp::Sub), Just(BinaryOp::Mul)];
    (arb_expr(depth - 1), arb_expr(depth - 1), op)
        .prop_map(|(l, r, op)| Node::binary(op, l, r))
        .boxed()
}

fn eval_at(node: &Node, x: f64) -> f64 {
    let mut env = Env::new();
    env.insert("x".to_string(), x);
    evaluate(node, &env).unwrap().as_real().unwrap()
}

proptest! {
    #[test]
    fn parse_then_format_is_deterministic(src in arb_source(3)) {
        let ast = parse_str(&src).unwrap();
        let rendered_once = to_katex(&ast);
        let rendered_again = to_katex(&parse_str(&src).unwrap());
        prop_assert_eq!(rendered_once, rendered_again);
    }

    #[test]
    fn simplify_is_idempotent(expr in arb_expr(3)) {
        let once = simplify(&expr);
        let twice = simplify(&once);
        prop_assert_eq!(to_katex(&once), to_katex(&twice));
    }

    #[test]
    fn simplification_preserves_numeric_value(expr in arb_expr(3), x in -5.0f64..5.0) {
        let direct = eval_at(&expr, x);
        let simplified = eval_at(&simplify(&expr), x);
        prop_assert!((direct - simplified).abs() < 1e-6 * direct.abs().max(1.0));
        let _ = TOLERANCE;
    }

    #[test]
    fn differentiation_is_linear_over_addition(f in arb_expr(2), g in arb_expr(2), x in -5.0f64..5.0) {
        let sum = Node::binary(BinaryOp::Add, f.clone(), g.clone());
        let d_sum = eval_at(&differentiate(&sum, "x"), x);
        let d_f = eval_at(&differentiate(&f, "x"), x);
        let d_g = eval_at(&differentiate(&g, "x"), x);
        prop_assert!((d_sum - (d_f + d_g)).abs() < 1e-6);
    }
}
