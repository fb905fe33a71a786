//! Symbolic differentiation over the elementary function library.

use crate::ast::{BinaryOp, Node, UnaryOp};
use crate::simplify::simplify;

pub fn differentiate(node: &Node, variable: &str) -> Node {
    simplify(&differentiate_raw(node, variable))
}

fn differentiate_raw(node: &Node, var: &str) -> Node {
    match node {
        Node::Number { .. } => Node::int(0),
        Node::Symbol { name } => {
            if name == var {
                Node::int(1)
            } else {
                Node::int(0)
            }
        }
        Node::UnitQuantity { magnitude, unit } => {
            Node::UnitQuantity { magnitude: Box::new(differentiate_raw(magnitude, var)), unit: unit.clone() }
        }
        Node::Unary { op: UnaryOp::Plus, operand } => differentiate_raw(operand, var),
        Node::Unary { op: UnaryOp::Minus, operand } => {
            Node::unary(UnaryOp::Minus, differentiate_raw(operand, var))
        }
        Node::Binary { op: op @ (BinaryOp::Add | BinaryOp::Sub), left, right } => {
            Node::binary(*op, differentiate_raw(left, var), differentiate_raw(right, var))
        }
        Node::Binary { op: BinaryOp::Mul, left, right } => {
            let dl = differentiate_raw(left, var);
            let dr = differentiate_raw(right, var);
            let term1 = Node::binary(BinaryOp::Mul, dl, (**right).clone());
            let term2 = Node::binary(BinaryOp::Mul, (**left).clone(), dr);
            Node::binary(BinaryOp::Add, term1, term2)
        }
        Node::Binary { op: BinaryOp::Div, left, right } => {
            let dl = differentiate_raw(left, var);
            let dr = differentiate_raw(right, var);
            let numerator = Node::binary(
                BinaryOp::Sub,
                Node::binary(BinaryOp::Mul, dl, (**right).clone()),
                Node::binary(BinaryOp::Mul, (**left).clone(), dr),
            );
            let denominator = Node::binary(BinaryOp::Pow, (**right).clone(), Node::int(2));
            Node::binary(BinaryOp::Div, numerator, denominator)
        }
        Node::Binary { op: BinaryOp::Pow, left: base, right: exp } => differentiate_pow(base, exp, var, node),
        Node::Binary { op: BinaryOp::Eq, left, right } => {
            Node::binary(BinaryOp::Eq, differentiate_raw(left, var), differentiate_raw(right, var))
        }
        Node::Call { name, args } => differentiate_call(name, args, var),
        Node::Arrow { .. } | Node::List { .. } => Node::int(0),
    }
}

fn differentiate_pow(base: &Node, exp: &Node, var: &str, whole: &Node) -> Node {
    let base_has = contains_variable(base, var);
    let exp_has = contains_variable(exp, var);
    match (base_has, exp_has) {
        (false, false) => Node::int(0),
        (true, false) => {
            // Power rule with chain rule: n * base^(n-1) * base'
            let n_minus_one = Node::binary(BinaryOp::Sub, exp.clone(), Node::int(1));
            let reduced_power = Node::binary(BinaryOp::Pow, base.clone(), n_minus_one);
            let dbase = differentiate_raw(base, var);
            Node::binary(BinaryOp::Mul, Node::binary(BinaryOp::Mul, exp.clone(), reduced_power), dbase)
        }
        (false, true) => {
            // Exponential rule: base^exp * ln(base) * exp'
            let dexp = differentiate_raw(exp, var);
            let ln_base = Node::call("ln", vec![base.clone()]);
            Node::binary(BinaryOp::Mul, Node::binary(BinaryOp::Mul, whole.clone(), ln_base), dexp)
        }
        (true, true) => {
            // Logarithmic differentiation: base^exp * (exp' ln(base) + exp base'/base)
            let dbase = differentiate_raw(base, var);
            let dexp = differentiate_raw(exp, var);
            let ln_base = Node::call("ln", vec![base.clone()]);
            let first = Node::binary(BinaryOp::Mul, dexp, ln_base);
            let second = Node::binary(BinaryOp::Mul, exp.clone(), Node::binary(BinaryOp::Div, dbase, base.clone()));
            let inner = Node::binary(BinaryOp::Add, first, second);
            Node::binary(BinaryOp::Mul, whole.clone(), inner)
        }
    }
}

fn differentiate_call(name: &str, args: &[Node], var: &str) -> Node {
    if args.len() != 1 {
        // Not part of the elementary single-argument library (e.g. two-arg `log`);
        // emit an unresolved derivative marker rather than guessing.
        return Node::call("diff", vec![Node::call(name.to_string(), args.to_vec()), Node::symbol(var)]);
    }
    let g = &args[0];
    let dg = differentiate_raw(g, var);
    let inner_rule = match name {
        "sin" => Node::call("cos", vec![g.clone()]),
        "cos" => Node::unary(UnaryOp::Minus, Node::call("sin", vec![g.clone()])),
        "tan" => {
            let sec_sq = Node::binary(BinaryOp::Pow, Node::call("cos", vec![g.clone()]), Node::int(2));
            Node::binary(BinaryOp::Div, Node::int(1), sec_sq)
        }
        "asin" => {
            let denom = Node::call("sqrt", vec![Node::binary(
                BinaryOp::Sub,
                Node::int(1),
                Node::binary(BinaryOp::Pow, g.clone(), Node::int(2)),
            )]);
            return Node::binary(BinaryOp::Mul, Node::binary(BinaryOp::Div, Node::int(1), denom), dg);
        }
        "acos" => {
            let denom = Node::call("sqrt", vec![Node::binary(
                BinaryOp::Sub,
                Node::int(1),
                Node::binary(BinaryOp::Pow, g.clone(), Node::int(2)),
            )]);
            let frac = Node::binary(BinaryOp::Div, Node::int(1), denom);
            return Node::unary(UnaryOp::Minus, Node::binary(BinaryOp::Mul, frac, dg));
        }
        "atan" => {
            let denom = Node::binary(BinaryOp::Add, Node::int(1), Node::binary(BinaryOp::Pow, g.clone(), Node::int(2)));
            return Node::binary(BinaryOp::Mul, Node::binary(BinaryOp::Div, Node::int(1), denom), dg);
        }
        "exp" => Node::call("exp", vec![g.clone()]),
        "ln" => return Node::binary(BinaryOp::Mul, Node::binary(BinaryOp::Div, Node::int(1), g.clone()), dg),
        "sqrt" => {
            let denom = Node::binary(BinaryOp::Mul, Node::int(2), Node::call("sqrt", vec![g.clone()]));
            return Node::binary(BinaryOp::Mul, Node::binary(BinaryOp::Div, Node::int(1), denom), dg);
        }
        "abs" => Node::call("sgn", vec![g.clone()]),
        _ => {
            return Node::call("diff", vec![Node::call(name.to_string(), args.to_vec()), Node::symbol(var)]);
        }
    };
    Node::binary(BinaryOp::Mul, inner_rule, dg)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    fn d(src: &str, var: &str) -> Node {
        differentiate(&parse_str(src).unwrap(), var)
    }

    #[test]
    fn power_rule() {
        assert_eq!(d("x^3", "x"), simplify(&parse_str("3*x^2").unwrap()));
    }

    #[test]
    fn sum_rule() {
        assert_eq!(d("x+x^2", "x"), simplify(&parse_str("1+2*x").unwrap()));
    }

    #[test]
    fn chain_rule_on_sin_squared() {
        let result = d("sin(x)^2", "x");
        let expected = simplify(&parse_str("2*sin(x)*cos(x)").unwrap());
        assert_eq!(result, expected);
    }

    #[test]
    fn derivative_of_constant_is_zero() {
        assert_eq!(d("5", "x"), Node::int(0));
    }

    #[test]
    fn linearity_property() {
        let a = parse_str("sin(x)").unwrap();
        let b = parse_str("x^2").unwrap();
        let sum = Node::binary(BinaryOp::Add, a.clone(), b.clone());
        let lhs = differentiate(&sum, "x");
        let rhs = simplify(&Node::binary(BinaryOp::Add, differentiate(&a, "x"), differentiate(&b, "x")));
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn abs_rewrites_to_sgn() {
        let result = d("abs(x)", "x");
        assert_eq!(result, Node::call("sgn", vec![Node::symbol("x")]));
    }
}
