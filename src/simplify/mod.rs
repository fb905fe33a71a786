//! Bottom-up rewrite system: canonicalization, like-term collection, and
//! identity laws, iterated to a fixed point under a hard pass cap.

use crate::ast::{compare_canonical, BinaryOp, Node, UnaryOp};

pub mod manipulate;

const MAX_PASSES: usize = 64;

pub fn simplify(node: &Node) -> Node {
    let mut current = node.clone();
    for _ in 0..MAX_PASSES {
        let next = simplify_pass(&current);
        if next == current {
            return next;
        }
        current = next;
    }
    current
}

fn simplify_pass(node: &Node) -> Node {
    match node {
        Node::Number { .. } | Node::Symbol { .. } => node.clone(),
        Node::UnitQuantity { magnitude, unit } => {
            Node::UnitQuantity { magnitude: Box::new(simplify_pass(magnitude)), unit: unit.clone() }
        }
        Node::Unary { op, operand } => {
            let o = simplify_pass(operand);
            simplify_unary(*op, o)
        }
        Node::Binary { op: op @ (BinaryOp::Add | BinaryOp::Sub), left, right } => {
            let l = simplify_pass(left);
            let r = simplify_pass(right);
            simplify_sum(&Node::binary(*op, l, r))
        }
        Node::Binary { op: BinaryOp::Mul, left, right } => {
            let l = simplify_pass(left);
            let r = simplify_pass(right);
            simplify_product(&Node::binary(BinaryOp::Mul, l, r))
        }
        Node::Binary { op: BinaryOp::Div, left, right } => {
            let l = simplify_pass(left);
            let r = simplify_pass(right);
            simplify_div(l, r)
        }
        Node::Binary { op: BinaryOp::Pow, left, right } => {
            let l = simplify_pass(left);
            let r = simplify_pass(right);
            simplify_pow(l, r)
        }
        Node::Binary { op: BinaryOp::Eq, left, right } => {
            Node::binary(BinaryOp::Eq, simplify_pass(left), simplify_pass(right))
        }
        Node::Call { name, args } => Node::call(name.clone(), args.iter().map(simplify_pass).collect()),
        Node::Arrow { from, to } => {
            Node::Arrow { from: Box::new(simplify_pass(from)), to: Box::new(simplify_pass(to)) }
        }
        Node::List { items } => Node::List { items: items.iter().map(simplify_pass).collect() },
    }
}

fn simplify_unary(op: UnaryOp, operand: Node) -> Node {
    match op {
        UnaryOp::Plus => operand,
        UnaryOp::Minus => match operand {
            Node::Number { value } => match value.parse::<f64>() {
                Ok(v) => Node::number(format_number(-v)),
                Err(_) => Node::unary(UnaryOp::Minus, Node::Number { value }),
            },
            Node::Unary { op: UnaryOp::Minus, operand: inner } => *inner,
            other => Node::unary(UnaryOp::Minus, other),
        },
    }
}

/// Flattens a chain of `+`/`-`/unary-minus into signed addends. Transparent
/// through unary plus and nested sums, so `-(-x)` and `a - (b - c)` fold in
/// the same pass that collects like terms.
fn flatten_add(node: &Node) -> Vec<(bool, Node)> {
    match node {
        Node::Binary { op: BinaryOp::Add, left, right } => {
            let mut v = flatten_add(left);
            v.extend(flatten_add(right));
            v
        }
        Node::Binary { op: BinaryOp::Sub, left, right } => {
            let mut v = flatten_add(left);
            v.extend(flatten_add(right).into_iter().map(|(neg, n)| (!neg, n)));
            v
        }
        Node::Unary { op: UnaryOp::Minus, operand } => {
            flatten_add(operand).into_iter().map(|(neg, n)| (!neg, n)).collect()
        }
        Node::Unary { op: UnaryOp::Plus, operand } => flatten_add(operand),
        other => vec![(false, other.clone())],
    }
}

fn flatten_mul(node: &Node) -> (bool, Vec<Node>) {
    match node {
        Node::Binary { op: BinaryOp::Mul, left, right } => {
            let (ln, lf) = flatten_mul(left);
            let (rn, rf) = flatten_mul(right);
            let mut factors = lf;
            factors.extend(rf);
            (ln ^ rn, factors)
        }
        Node::Unary { op: UnaryOp::Minus, operand } => {
            let (n, f) = flatten_mul(operand);
            (!n, f)
        }
        Node::Unary { op: UnaryOp::Plus, operand } => flatten_mul(operand),
        other => (false, vec![other.clone()]),
    }
}

fn rebuild_product(factors: Vec<Node>) -> Node {
    let mut it = factors.into_iter();
    match it.next() {
        None => Node::int(1),
        Some(first) => it.fold(first, |acc, f| Node::binary(BinaryOp::Mul, acc, f)),
    }
}

/// `coefficient * monomial` decomposition used for like-term collection.
fn split_coefficient(node: &Node) -> (f64, Node) {
    if let Some(v) = node.number_value() {
        return (v, Node::int(1));
    }
    match node {
        Node::Binary { op: BinaryOp::Mul, .. } => {
            let (neg, factors) = flatten_mul(node);
            let mut coeff = if neg { -1.0 } else { 1.0 };
            let mut rest = Vec::new();
            for f in factors {
                if let Some(v) = f.number_value() {
                    coeff *= v;
                } else {
                    rest.push(f);
                }
            }
            rest.sort_by(compare_canonical);
            (coeff, rebuild_product(rest))
        }
        Node::Unary { op: UnaryOp::Minus, operand } => {
            let (c, m) = split_coefficient(operand);
            (-c, m)
        }
        other => (1.0, other.clone()),
    }
}

fn build_sum(mut terms: Vec<(bool, Node)>) -> Node {
    if terms.is_empty() {
        return Node::int(0);
    }
    terms.sort_by(|a, b| compare_canonical(&a.1, &b.1));
    let mut it = terms.into_iter();
    let (neg0, n0) = it.next().unwrap();
    let mut acc = if neg0 { Node::unary(UnaryOp::Minus, n0) } else { n0 };
    for (neg, n) in it {
        acc = if neg {
            Node::binary(BinaryOp::Sub, acc, n)
        } else {
            Node::binary(BinaryOp::Add, acc, n)
        };
    }
    acc
}

fn simplify_sum(node: &Node) -> Node {
    let terms = flatten_add(node);
    let mut const_acc = 0.0f64;
    let mut has_const = false;
    let mut groups: Vec<(String, f64, Node)> = Vec::new();

    for (neg, term) in terms {
        if let Some(v) = term.number_value() {
            const_acc += if neg { -v } else { v };
            has_const = true;
            continue;
        }
        let (coeff, monomial) = split_coefficient(&term);
        let eff = if neg { -coeff } else { coeff };
        let key = crate::formatter::to_katex(&monomial);
        if let Some(g) = groups.iter_mut().find(|g| g.0 == key) {
            g.1 += eff;
        } else {
            groups.push((key, eff, monomial));
        }
    }

    let mut finals: Vec<(bool, Node)> = Vec::new();
    if has_const && const_acc != 0.0 {
        finals.push((const_acc < 0.0, Node::number(format_number(const_acc.abs()))));
    }
    for (_, coeff, monomial) in groups {
        if coeff == 0.0 {
            continue;
        }
        let neg = coeff < 0.0;
        let abscoeff = coeff.abs();
        let term = if (abscoeff - 1.0).abs() < 1e-12 {
            monomial
        } else {
            Node::binary(BinaryOp::Mul, Node::number(format_number(abscoeff)), monomial)
        };
        finals.push((neg, term));
    }

    build_sum(finals)
}

fn simplify_product(node: &Node) -> Node {
    let (neg, factors) = flatten_mul(node);
    let mut coeff = 1.0f64;
    let mut rest: Vec<Node> = Vec::new();
    for f in factors {
        if let Some(v) = f.number_value() {
            coeff *= v;
        } else {
            rest.push(f);
        }
    }
    if coeff == 0.0 {
        return Node::int(0);
    }

    let mut groups: Vec<(String, Node, f64)> = Vec::new();
    for f in rest {
        let (base, exp) = match &f {
            Node::Binary { op: BinaryOp::Pow, left, right } if right.number_value().is_some() => {
                ((**left).clone(), right.number_value().unwrap())
            }
            other => (other.clone(), 1.0),
        };
        let key = crate::formatter::to_katex(&base);
        if let Some(g) = groups.iter_mut().find(|g| g.0 == key) {
            g.2 += exp;
        } else {
            groups.push((key, base, exp));
        }
    }

    let mut out_factors: Vec<Node> = Vec::new();
    for (_, base, exp) in groups {
        if exp == 0.0 {
            continue;
        }
        if (exp - 1.0).abs() < 1e-12 {
            out_factors.push(base);
        } else {
            out_factors.push(Node::binary(BinaryOp::Pow, base, Node::number(format_number(exp))));
        }
    }
    out_factors.sort_by(compare_canonical);

    let node = if (coeff - 1.0).abs() < 1e-12 {
        if out_factors.is_empty() {
            Node::int(1)
        } else {
            rebuild_product(out_factors)
        }
    } else if out_factors.is_empty() {
        Node::number(format_number(coeff))
    } else {
        let mut all = vec![Node::number(format_number(coeff))];
        all.extend(out_factors);
        rebuild_product(all)
    };

    if neg {
        Node::unary(UnaryOp::Minus, node)
    } else {
        node
    }
}

fn simplify_div(l: Node, r: Node) -> Node {
    if let Some(1.0) = r.number_value() {
        return l;
    }
    if let (Some(lv), Some(rv)) = (l.number_value(), r.number_value()) {
        if rv != 0.0 {
            if lv.fract() == 0.0 && rv.fract() == 0.0 {
                let (num, den) = reduce_fraction(lv as i64, rv as i64);
                return if den == 1 {
                    Node::number(num.to_string())
                } else {
                    Node::binary(BinaryOp::Div, Node::number(num.to_string()), Node::number(den.to_string()))
                };
            }
            return Node::number(format_number(lv / rv));
        }
    }
    Node::binary(BinaryOp::Div, l, r)
}

fn simplify_pow(base: Node, exp: Node) -> Node {
    if let Some(0.0) = exp.number_value() {
        return Node::int(1);
    }
    if let Some(1.0) = exp.number_value() {
        return base;
    }
    if let (Some(bv), Some(ev)) = (base.number_value(), exp.number_value()) {
        return Node::number(format_number(bv.powf(ev)));
    }
    Node::binary(BinaryOp::Pow, base, exp)
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a.abs()
    } else {
        gcd(b, a % b)
    }
}

fn reduce_fraction(mut num: i64, mut den: i64) -> (i64, i64) {
    if den < 0 {
        num = -num;
        den = -den;
    }
    let g = gcd(num, den).max(1);
    (num / g, den / g)
}

fn format_number(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    fn s(src: &str) -> Node {
        simplify(&parse_str(src).unwrap())
    }

    #[test]
    fn folds_constant_sum() {
        assert_eq!(s("1+2"), Node::int(3));
    }

    #[test]
    fn collects_like_terms() {
        assert_eq!(s("x+x"), Node::binary(BinaryOp::Mul, Node::int(2), Node::symbol("x")));
        assert_eq!(s("2x+x"), Node::binary(BinaryOp::Mul, Node::int(3), Node::symbol("x")));
    }

    #[test]
    fn combines_repeated_factors_into_a_power() {
        assert_eq!(s("x*x"), Node::binary(BinaryOp::Pow, Node::symbol("x"), Node::int(2)));
    }

    #[test]
    fn drops_additive_and_multiplicative_identities() {
        assert_eq!(s("x+0"), Node::symbol("x"));
        assert_eq!(s("x*1"), Node::symbol("x"));
        assert_eq!(s("x*0"), Node::int(0));
        assert_eq!(s("x/1"), Node::symbol("x"));
    }

    #[test]
    fn power_identities() {
        assert_eq!(s("x^0"), Node::int(1));
        assert_eq!(s("x^1"), Node::symbol("x"));
    }

    #[test]
    fn reduces_integer_fractions_by_gcd() {
        assert_eq!(s("4/2"), Node::int(2));
        assert_eq!(s("6/8"), Node::binary(BinaryOp::Div, Node::int(3), Node::int(4)));
    }

    #[test]
    fn double_negation_cancels() {
        assert_eq!(s("-(-x)"), Node::symbol("x"));
    }

    #[test]
    fn is_idempotent() {
        let once = s("2*x + 3*x - 1 + 5");
        let twice = simplify(&once);
        assert_eq!(once, twice);
    }
}
