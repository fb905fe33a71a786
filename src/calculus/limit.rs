//! Numeric limit evaluation by bidirectional sampling. Indeterminate forms
//! are never resolved symbolically; sampling is the whole algorithm.

use crate::ast::Node;
use crate::evaluator::{evaluate, Env, Value};

const DELTAS: [f64; 4] = [1e-9, 1e-7, 1e-5, 1e-3];
const RELATIVE_TOLERANCE: f64 = 1e-6;

/// Samples `expr` at `target ± delta` for successively coarser `delta`,
/// returning the midpoint of the first pair that agrees within tolerance.
pub fn limit(expr: &Node, variable: &str, target: f64) -> Option<f64> {
    for delta in DELTAS {
        let left = sample(expr, variable, target - delta);
        let right = sample(expr, variable, target + delta);
        if let (Some(l), Some(r)) = (left, right) {
            let scale = 1.0f64.max(l.abs()).max(r.abs());
            if (l - r).abs() <= RELATIVE_TOLERANCE * scale {
                return Some((l + r) / 2.0);
            }
        }
    }
    None
}

fn sample(expr: &Node, variable: &str, value: f64) -> Option<f64> {
    let mut env = Env::new();
    env.insert(variable.to_string(), value);
    match evaluate(expr, &env) {
        Ok(Value::Real(r)) if r.is_finite() => Some(r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    #[test]
    fn sinc_limit_at_zero() {
        let expr = parse_str("sin(x)/x").unwrap();
        let result = limit(&expr, "x", 0.0).unwrap();
        assert!((result - 1.0).abs() < 1e-4);
    }

    #[test]
    fn continuous_polynomial_limit() {
        let expr = parse_str("x^2+1").unwrap();
        let result = limit(&expr, "x", 2.0).unwrap();
        assert!((result - 5.0).abs() < 1e-6);
    }

    #[test]
    fn divergent_limit_is_none() {
        let expr = parse_str("1/x").unwrap();
        assert!(limit(&expr, "x", 0.0).is_none());
    }
}
