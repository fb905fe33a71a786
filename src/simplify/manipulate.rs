//! Targeted algebraic manipulations layered on top of the simplifier:
//! distribution, integer-root quadratic factoring, rational reduction, and
//! cover-up partial fractions.

use crate::ast::{BinaryOp, Node, UnaryOp};
use crate::simplify::simplify;

/// Distributes `*` over `+` and expands `(a+b)^n` for small integer `n`, then re-simplifies.
pub fn expand(node: &Node) -> Node {
    let expanded = expand_pass(node);
    simplify(&expanded)
}

fn expand_pass(node: &Node) -> Node {
    match node {
        Node::Binary { op: BinaryOp::Mul, left, right } => {
            let l = expand_pass(left);
            let r = expand_pass(right);
            distribute(&l, &r)
        }
        Node::Binary { op: BinaryOp::Pow, left, right } => {
            let base = expand_pass(left);
            if let Some(n) = right.number_value() {
                if n.fract() == 0.0 && (0.0..=6.0).contains(&n) && is_sum(&base) {
                    return expand_integer_power(&base, n as u32);
                }
            }
            Node::binary(BinaryOp::Pow, base, (**right).clone())
        }
        Node::Binary { op, left, right } => {
            Node::binary(*op, expand_pass(left), expand_pass(right))
        }
        Node::Unary { op, operand } => Node::unary(*op, expand_pass(operand)),
        Node::UnitQuantity { magnitude, unit } => {
            Node::UnitQuantity { magnitude: Box::new(expand_pass(magnitude)), unit: unit.clone() }
        }
        Node::Call { name, args } => Node::call(name.clone(), args.iter().map(expand_pass).collect()),
        Node::Arrow { from, to } => {
            Node::Arrow { from: Box::new(expand_pass(from)), to: Box::new(expand_pass(to)) }
        }
        Node::List { items } => Node::List { items: items.iter().map(expand_pass).collect() },
        Node::Number { .. } | Node::Symbol { .. } => node.clone(),
    }
}

fn is_sum(node: &Node) -> bool {
    matches!(node, Node::Binary { op: BinaryOp::Add | BinaryOp::Sub, .. })
}

fn terms_of(node: &Node) -> Vec<Node> {
    match node {
        Node::Binary { op: BinaryOp::Add, left, right } => {
            let mut v = terms_of(left);
            v.extend(terms_of(right));
            v
        }
        Node::Binary { op: BinaryOp::Sub, left, right } => {
            let mut v = terms_of(left);
            v.push(Node::unary(UnaryOp::Minus, (**right).clone()));
            v
        }
        other => vec![other.clone()],
    }
}

fn distribute(left: &Node, right: &Node) -> Node {
    if is_sum(left) {
        let terms = terms_of(left).into_iter().map(|t| distribute(&t, right));
        terms.reduce(|a, b| Node::binary(BinaryOp::Add, a, b)).unwrap()
    } else if is_sum(right) {
        let terms = terms_of(right).into_iter().map(|t| distribute(left, &t));
        terms.reduce(|a, b| Node::binary(BinaryOp::Add, a, b)).unwrap()
    } else {
        Node::binary(BinaryOp::Mul, left.clone(), right.clone())
    }
}

fn expand_integer_power(base: &Node, n: u32) -> Node {
    let mut acc = Node::int(1);
    for _ in 0..n {
        acc = distribute(&acc, base);
    }
    acc
}

/// Factors monic or integer-leading quadratics with an integer-valued,
/// nonnegative discriminant whose roots are integers. Any other shape is
/// returned unchanged.
pub fn factor(node: &Node) -> Node {
    let simplified = simplify(node);
    if let Some((a, b, c, var)) = quadratic_coefficients(&simplified) {
        if let Some((r1, r2)) = integer_roots(a, b, c) {
            let x = Node::symbol(var);
            let factor1 = Node::binary(BinaryOp::Sub, x.clone(), Node::number(format_int(r1)));
            let factor2 = Node::binary(BinaryOp::Sub, x, Node::number(format_int(r2)));
            let product = Node::binary(BinaryOp::Mul, factor1, factor2);
            return if (a - 1.0).abs() < 1e-9 {
                product
            } else {
                Node::binary(BinaryOp::Mul, Node::number(format_num(a)), product)
            };
        }
    }
    simplified
}

fn format_int(v: i64) -> String {
    v.to_string()
}

fn format_num(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

fn integer_roots(a: f64, b: f64, c: f64) -> Option<(i64, i64)> {
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    if sqrt_disc.fract().abs() > 1e-9 {
        return None;
    }
    let sqrt_disc = sqrt_disc.round();
    let two_a = 2.0 * a;
    let r1 = (-b + sqrt_disc) / two_a;
    let r2 = (-b - sqrt_disc) / two_a;
    if r1.fract().abs() > 1e-9 || r2.fract().abs() > 1e-9 {
        return None;
    }
    Some((r1.round() as i64, r2.round() as i64))
}

/// Extracts `(a, b, c, variable)` from a simplified polynomial that is
/// exactly `a*x^2 + b*x + c` (in any term order, any subset of terms present).
pub(crate) fn quadratic_coefficients(node: &Node) -> Option<(f64, f64, f64, String)> {
    let lhs = match node {
        Node::Binary { op: BinaryOp::Eq, left, right } => {
            Node::binary(BinaryOp::Sub, (**left).clone(), (**right).clone())
        }
        other => other.clone(),
    };
    let simplified = simplify(&lhs);
    let terms = additive_terms(&simplified);

    let mut a = 0.0;
    let mut b = 0.0;
    let mut c = 0.0;
    let mut var: Option<String> = None;

    for term in terms {
        match classify_term(&term) {
            Some((degree, coeff, name)) => {
                if let Some(ref v) = var {
                    if name.as_ref().is_some_and(|n| n != v) {
                        return None;
                    }
                } else if let Some(n) = name {
                    var = Some(n);
                }
                match degree {
                    2 => a += coeff,
                    1 => b += coeff,
                    0 => c += coeff,
                    _ => return None,
                }
            }
            None => return None,
        }
    }

    if a == 0.0 {
        return None;
    }
    var.map(|v| (a, b, c, v))
}

fn additive_terms(node: &Node) -> Vec<Node> {
    match node {
        Node::Binary { op: BinaryOp::Add, left, right } => {
            let mut v = additive_terms(left);
            v.extend(additive_terms(right));
            v
        }
        Node::Binary { op: BinaryOp::Sub, left, right } => {
            let mut v = additive_terms(left);
            v.push(Node::unary(UnaryOp::Minus, (**right).clone()));
            v
        }
        other => vec![other.clone()],
    }
}

/// `(degree in the sole free variable, coefficient, variable name)` of a single term.
fn classify_term(term: &Node) -> Option<(u32, f64, Option<String>)> {
    match term {
        Node::Number { .. } => Some((0, term.number_value()?, None)),
        Node::Symbol { name } => Some((1, 1.0, Some(name.clone()))),
        Node::Unary { op: UnaryOp::Minus, operand } => {
            let (d, c, n) = classify_term(operand)?;
            Some((d, -c, n))
        }
        Node::Binary { op: BinaryOp::Pow, left, right } => {
            let name = match left.as_ref() {
                Node::Symbol { name } => name.clone(),
                _ => return None,
            };
            let exp = right.number_value()?;
            if exp.fract() != 0.0 || exp < 0.0 {
                return None;
            }
            Some((exp as u32, 1.0, Some(name)))
        }
        Node::Binary { op: BinaryOp::Mul, left, right } => {
            let (ld, lc, ln) = classify_term(left)?;
            let (rd, rc, rn) = classify_term(right)?;
            let name = match (ln, rn) {
                (Some(n), None) | (None, Some(n)) => Some(n),
                (None, None) => None,
                (Some(a), Some(b)) if a == b => return None, // x*x not supported here; simplifier folds to x^2 first
                _ => return None,
            };
            Some((ld + rd, lc * rc, name))
        }
        _ => None,
    }
}

/// Normalizes `(k*P(x))/m` by dividing numerator and denominator by `gcd(k, m)`.
pub fn rational_simplify(node: &Node) -> Node {
    if let Node::Binary { op: BinaryOp::Div, left, right } = node {
        if let Some(m) = right.number_value() {
            if m.fract() == 0.0 {
                let (k, rest) = extract_integer_coefficient(left);
                if k.fract() == 0.0 {
                    let g = gcd_i64(k as i64, m as i64).max(1);
                    let new_k = (k as i64) / g;
                    let new_m = (m as i64) / g;
                    let numerator = if new_k == 1 {
                        rest
                    } else {
                        Node::binary(BinaryOp::Mul, Node::number(new_k.to_string()), rest)
                    };
                    return if new_m == 1 {
                        simplify(&numerator)
                    } else {
                        simplify(&Node::binary(BinaryOp::Div, numerator, Node::number(new_m.to_string())))
                    };
                }
            }
        }
    }
    simplify(node)
}

fn extract_integer_coefficient(node: &Node) -> (f64, Node) {
    if let Some(v) = node.number_value() {
        return (v, Node::int(1));
    }
    if let Node::Binary { op: BinaryOp::Mul, left, right } = node {
        if let Some(v) = left.number_value() {
            return (v, (**right).clone());
        }
        if let Some(v) = right.number_value() {
            return (v, (**left).clone());
        }
    }
    (1.0, node.clone())
}

fn gcd_i64(a: i64, b: i64) -> i64 {
    if b == 0 {
        a.abs()
    } else {
        gcd_i64(b, a % b)
    }
}

/// Cover-up partial fractions for `P(x) / (Q(x)*R(x))` where `P` has degree <
/// 2 and `Q`, `R` are distinct linear integer factors. Anything else falls
/// back to `simplify(node)`.
pub fn partial_fraction(node: &Node) -> Node {
    if let Node::Binary { op: BinaryOp::Div, left, right } = node {
        if let Some((var, r1, r2)) = distinct_linear_roots(right) {
            if r1 != r2 {
                if let Some((p1, p0)) = linear_numerator(left, &var) {
                    let numerator_at = |x: f64| p1 * x + p0;
                    let denom1 = r1 as f64 - r2 as f64;
                    let denom2 = r2 as f64 - r1 as f64;
                    if denom1 == 0.0 || denom2 == 0.0 {
                        return simplify(node);
                    }
                    let residue1 = numerator_at(r1 as f64) / denom1;
                    let residue2 = numerator_at(r2 as f64) / denom2;
                    let term1 = fraction_term(residue1, &var, r1);
                    let term2 = fraction_term(residue2, &var, r2);
                    return simplify(&Node::binary(BinaryOp::Add, term1, term2));
                }
            }
        }
    }
    simplify(node)
}

fn fraction_term(residue: f64, var: &str, root: i64) -> Node {
    let denom = Node::binary(BinaryOp::Sub, Node::symbol(var), Node::number(root.to_string()));
    Node::binary(BinaryOp::Div, Node::number(format_num(residue)), denom)
}

/// Recognizes `Q(x)*R(x)` as two distinct linear factors `(x - r1)(x - r2)`.
fn distinct_linear_roots(node: &Node) -> Option<(String, i64, i64)> {
    let simplified = simplify(node);
    if let Node::Binary { op: BinaryOp::Mul, left, right } = &simplified {
        let (var1, r1) = linear_root(left)?;
        let (var2, r2) = linear_root(right)?;
        if var1 == var2 {
            return Some((var1, r1, r2));
        }
    }
    None
}

/// Recognizes `x - r` (r an integer) and returns `(variable, root)`.
fn linear_root(node: &Node) -> Option<(String, i64)> {
    if let Node::Binary { op: BinaryOp::Sub, left, right } = node {
        if let Node::Symbol { name } = left.as_ref() {
            let r = right.number_value()?;
            if r.fract() == 0.0 {
                return Some((name.clone(), r as i64));
            }
        }
    }
    None
}

/// Recognizes a degree-`<2` numerator `p1*x + p0` in `var`.
fn linear_numerator(node: &Node, var: &str) -> Option<(f64, f64)> {
    let simplified = simplify(node);
    if let Some(c) = simplified.number_value() {
        return Some((0.0, c));
    }
    let terms = additive_terms(&simplified);
    let mut p1 = 0.0;
    let mut p0 = 0.0;
    for term in terms {
        let (degree, coeff, name) = classify_term(&term)?;
        match degree {
            0 => p0 += coeff,
            1 if name.as_deref() == Some(var) => p1 += coeff,
            _ => return None,
        }
    }
    Some((p1, p0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    fn expand_src(src: &str) -> Node {
        expand(&parse_str(src).unwrap())
    }

    fn factor_src(src: &str) -> Node {
        factor(&parse_str(src).unwrap())
    }

    #[test]
    fn expand_distributes_multiplication_over_addition() {
        assert_eq!(
            expand_src("x*(x+1)"),
            simplify(&Node::binary(
                BinaryOp::Add,
                Node::binary(BinaryOp::Pow, Node::symbol("x"), Node::int(2)),
                Node::symbol("x"),
            ))
        );
    }

    #[test]
    fn expand_applies_binomial_square() {
        let expanded = expand_src("(x+1)^2");
        let expected = simplify(&parse_str("x^2+2*x+1").unwrap());
        assert_eq!(expanded, expected);
    }

    #[test]
    fn factor_recovers_integer_roots() {
        let factored = factor_src("x^2-5*x+6");
        let expected = simplify(&Node::binary(
            BinaryOp::Mul,
            Node::binary(BinaryOp::Sub, Node::symbol("x"), Node::int(2)),
            Node::binary(BinaryOp::Sub, Node::symbol("x"), Node::int(3)),
        ));
        assert_eq!(factored, expected);
    }

    #[test]
    fn factor_leaves_irrational_root_quadratics_unchanged() {
        let input = simplify(&parse_str("x^2-2").unwrap());
        assert_eq!(factor_src("x^2-2"), input);
    }

    #[test]
    fn expand_factor_round_trip() {
        let q = parse_str("x^2-5*x+6").unwrap();
        let round_tripped = expand(&factor(&q));
        assert_eq!(round_tripped, simplify(&q));
    }

    #[test]
    fn rational_simplify_reduces_by_gcd() {
        assert_eq!(rational_simplify(&parse_str("(6*x)/8").unwrap()), simplify(&parse_str("(3*x)/4").unwrap()));
    }

    #[test]
    fn partial_fraction_cover_up() {
        // 1 / ((x-1)(x-2)) = -1/(x-1) + 1/(x-2)
        let result = partial_fraction(&parse_str("1/((x-1)*(x-2))").unwrap());
        let expected = simplify(&parse_str("-1/(x-1) + 1/(x-2)").unwrap());
        assert_eq!(result, expected);
    }
}
