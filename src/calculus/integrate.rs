//! Pattern-based integration over a small rule table, checked in a fixed
//! order, with linear substitution `u = ax + b` for the listed rules.

use crate::ast::{BinaryOp, Node, UnaryOp};
use crate::simplify::simplify;

/// Returns `None` when no rule in the table fires; the caller appends `+ C`.
pub fn integrate(node: &Node, variable: &str) -> Option<Node> {
    integrate_raw(node, variable).map(|n| simplify(&n))
}

fn integrate_raw(node: &Node, var: &str) -> Option<Node> {
    if !contains_variable(node, var) {
        // Constant rule: integral c dx = c*x
        return Some(Node::binary(BinaryOp::Mul, node.clone(), Node::symbol(var)));
    }

    match node {
        Node::Symbol { name } if name == var => {
            Some(Node::binary(BinaryOp::Div, Node::binary(BinaryOp::Pow, node.clone(), Node::int(2)), Node::int(2)))
        }
        Node::Binary { op: BinaryOp::Add, left, right } => {
            Some(Node::binary(BinaryOp::Add, integrate_raw(left, var)?, integrate_raw(right, var)?))
        }
        Node::Binary { op: BinaryOp::Sub, left, right } => {
            Some(Node::binary(BinaryOp::Sub, integrate_raw(left, var)?, integrate_raw(right, var)?))
        }
        Node::Unary { op: UnaryOp::Minus, operand } => {
            Some(Node::unary(UnaryOp::Minus, integrate_raw(operand, var)?))
        }
        Node::Unary { op: UnaryOp::Plus, operand } => integrate_raw(operand, var),
        Node::Binary { op: BinaryOp::Mul, left, right } => {
            if !contains_variable(left, var) {
                Some(Node::binary(BinaryOp::Mul, (**left).clone(), integrate_raw(right, var)?))
            } else if !contains_variable(right, var) {
                Some(Node::binary(BinaryOp::Mul, (**right).clone(), integrate_raw(left, var)?))
            } else {
                None
            }
        }
        Node::Binary { op: BinaryOp::Pow, left: base, right: exp } => {
            let (a, _b) = linear_coeffs(base, var)?;
            let n = exp.number_value()?;
            if (n + 1.0).abs() < 1e-9 {
                let abs_base = Node::call("abs", vec![(**base).clone()]);
                let ln_abs = Node::call("ln", vec![abs_base]);
                Some(Node::binary(BinaryOp::Div, ln_abs, Node::number(format_num(a))))
            } else {
                let raised = Node::binary(BinaryOp::Pow, (**base).clone(), Node::number(format_num(n + 1.0)));
                Some(Node::binary(BinaryOp::Div, raised, Node::number(format_num(a * (n + 1.0)))))
            }
        }
        Node::Binary { op: BinaryOp::Div, left: numerator, right: denominator } => {
            if let Some(1.0) = numerator.number_value() {
                if is_one_plus_square(denominator, var) {
                    return Some(Node::call("atan", vec![Node::symbol(var)]));
                }
                if let Some((a, _b)) = linear_coeffs(denominator, var) {
                    let abs_denom = Node::call("abs", vec![(**denominator).clone()]);
                    let ln_abs = Node::call("ln", vec![abs_denom]);
                    return Some(Node::binary(BinaryOp::Div, ln_abs, Node::number(format_num(a))));
                }
            }
            None
        }
        Node::Call { name, args } if args.len() == 1 => {
            let arg = &args[0];
            let (a, _b) = linear_coeffs(arg, var)?;
            let antiderivative = match name.as_str() {
                "exp" => Node::call("exp", vec![arg.clone()]),
                "sin" => Node::unary(UnaryOp::Minus, Node::call("cos", vec![arg.clone()])),
                "cos" => Node::call("sin", vec![arg.clone()]),
                _ => return None,
            };
            Some(Node::binary(BinaryOp::Div, antiderivative, Node::number(format_num(a))))
        }
        _ => None,
    }
}

/// `node == a*var + b` for literal rational `a`, `b`; `None` when not linear.
fn linear_coeffs(node: &Node, var: &str) -> Option<(f64, f64)> {
    match node {
        Node::Symbol { name } if name == var => Some((1.0, 0.0)),
        Node::Number { .. } => Some((0.0, node.number_value()?)),
        Node::Binary { op: BinaryOp::Add, left, right } => {
            let (a1, b1) = linear_coeffs(left, var)?;
            let (a2, b2) = linear_coeffs(right, var)?;
            Some((a1 + a2, b1 + b2))
        }
        Node::Binary { op: BinaryOp::Sub, left, right } => {
            let (a1, b1) = linear_coeffs(left, var)?;
            let (a2, b2) = linear_coeffs(right, var)?;
            Some((a1 - a2, b1 - b2))
        }
        Node::Unary { op: UnaryOp::Minus, operand } => {
            let (a, b) = linear_coeffs(operand, var)?;
            Some((-a, -b))
        }
        Node::Unary { op: UnaryOp::Plus, operand } => linear_coeffs(operand, var),
        Node::Binary { op: BinaryOp::Mul, left, right } => {
            if !contains_variable(left, var) {
                let k = left.number_value()?;
                let (a, b) = linear_coeffs(right, var)?;
                Some((k * a, k * b))
            } else if !contains_variable(right, var) {
                let k = right.number_value()?;
                let (a, b) = linear_coeffs(left, var)?;
                Some((k * a, k * b))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn is_one_plus_square(node: &Node, var: &str) -> bool {
    if let Node::Binary { op: BinaryOp::Add, left, right } = node {
        let sides = [(left.as_ref(), right.as_ref()), (right.as_ref(), left.as_ref())];
        for (one_side, square_side) in sides {
            if one_side.number_value() == Some(1.0) {
                if let Node::Binary { op: BinaryOp::Pow, left: base, right: exp } = square_side {
                    if matches!(base.as_ref(), Node::Symbol { name } if name == var) && exp.number_value() == Some(2.0)
                    {
                        return true;
                    }
                }
            }
        }
    }
    false
}

fn contains_variable(node: &Node, var: &str) -> bool {
    match node {
        Node::Number { .. } => false,
        Node::Symbol { name } => name == var,
        Node::UnitQuantity { magnitude, .. } => contains_variable(magnitude, var),
        Node::Unary { operand, .. } => contains_variable(operand, var),
        Node::Binary { left, right, .. } => contains_variable(left, var) || contains_variable(right, var),
        Node::Call { args, .. } => args.iter().any(|a| contains_variable(a, var)),
        Node::Arrow { from, to } => contains_variable(from, var) || contains_variable(to, var),
        Node::List { items } => items.iter().any(|i| contains_variable(i, var)),
    }
}

fn format_num(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    fn integ(src: &str, var: &str) -> Option<Node> {
        integrate(&parse_str(src).unwrap(), var)
    }

    #[test]
    fn power_rule() {
        assert_eq!(integ("x^2", "x"), Some(simplify(&parse_str("x^3/3").unwrap())));
    }

    #[test]
    fn reciprocal_is_natural_log() {
        let result = integ("1/x", "x").unwrap();
        assert_eq!(result, simplify(&Node::call("ln", vec![Node::call("abs", vec![Node::symbol("x")])])));
    }

    #[test]
    fn arctan_rule() {
        let result = integ("1/(1+x^2)", "x").unwrap();
        assert_eq!(result, Node::call("atan", vec![Node::symbol("x")]));
    }

    #[test]
    fn linearity_over_sums() {
        let result = integ("x+1", "x").unwrap();
        let expected = simplify(&parse_str("x^2/2+x").unwrap());
        assert_eq!(result, expected);
    }

    #[test]
    fn unrecognized_pattern_returns_none() {
        assert!(integ("tan(x^2)", "x").is_none());
    }

    #[test]
    fn substitution_for_linear_inner_argument() {
        let result = integ("sin(2*x)", "x").unwrap();
        let expected = simplify(&Node::binary(
            BinaryOp::Div,
            Node::unary(UnaryOp::Minus, Node::call("cos", vec![parse_str("2*x").unwrap()])),
            Node::int(2),
        ));
        assert_eq!(result, expected);
    }
}
