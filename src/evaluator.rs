//! AST → numeric value, over real / complex / unit-tagged results.

use std::collections::HashMap;

use crate::ast::{BinaryOp, Node, UnaryOp};
use crate::error::EvaluationError;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Real(f64),
    Complex { re: f64, im: f64 },
    Unit { magnitude: f64, unit: String },
}

impl Value {
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    fn node_position_hint() -> usize {
        // The evaluator is position-agnostic (the parser already validated
        // structure); failures report position 0 and the façade falls back
        // to `input.length` when a more precise offset isn't available.
        0
    }
}

/// Free-variable bindings supplied by a caller (e.g. a `limit` sampler
/// substituting a numeric value for the bound variable).
pub type Env = HashMap<String, f64>;

pub fn evaluate(node: &Node, env: &Env) -> Result<Value, EvaluationError> {
    match node {
        Node::Number { value } => {
            let v: f64 = value.parse().map_err(|_| {
                EvaluationError::new(format!("invalid numeric literal '{}'", value), Value::node_position_hint())
            })?;
            Ok(Value::Real(v))
        }
        Node::Symbol { name } => evaluate_symbol(name, env),
        Node::UnitQuantity { magnitude, unit } => {
            let mag = evaluate(magnitude, env)?;
            match mag {
                Value::Real(m) => Ok(Value::Unit { magnitude: m, unit: unit.clone() }),
                _ => Err(EvaluationError::new("unit magnitude must be real", 0)),
            }
        }
        Node::Unary { op, operand } => {
            let v = evaluate(operand, env)?;
            match op {
                UnaryOp::Plus => Ok(v),
                UnaryOp::Minus => negate(v),
            }
        }
        Node::Binary { op, left, right } => {
            let l = evaluate(left, env)?;
            let r = evaluate(right, env)?;
            evaluate_binary(*op, l, r)
        }
        Node::Call { name, args } => evaluate_call(name, args, env),
        Node::Arrow { .. } => Err(EvaluationError::new("'->' cannot be evaluated outside limit(...)", 0)),
        Node::List { .. } => Err(EvaluationError::new("lists cannot be evaluated as a scalar", 0)),
    }
}

fn evaluate_symbol(name: &str, env: &Env) -> Result<Value, EvaluationError> {
    if let Some(v) = env.get(name) {
        return Ok(Value::Real(*v));
    }
    match name {
        "pi" => Ok(Value::Real(std::f64::consts::PI)),
        "e" => Ok(Value::Real(std::f64::consts::E)),
        "i" => Ok(Value::Complex { re: 0.0, im: 1.0 }),
        _ => Err(EvaluationError::new(format!("unknown symbol '{}'", name), 0)),
    }
}

fn negate(v: Value) -> Result<Value, EvaluationError> {
    Ok(match v {
        Value::Real(r) => Value::Real(-r),
        Value::Complex { re, im } => Value::Complex { re: -re, im: -im },
        Value::Unit { magnitude, unit } => Value::Unit { magnitude: -magnitude, unit },
    })
}

fn evaluate_binary(op: BinaryOp, l: Value, r: Value) -> Result<Value, EvaluationError> {
    match op {
        BinaryOp::Add => add_sub(l, r, true),
        BinaryOp::Sub => add_sub(l, r, false),
        BinaryOp::Mul => mul(l, r),
        BinaryOp::Div => div(l, r),
        BinaryOp::Pow => pow(l, r),
        BinaryOp::Eq => Err(EvaluationError::new("'=' is not a numeric expression", 0)),
    }
}

fn add_sub(l: Value, r: Value, is_add: bool) -> Result<Value, EvaluationError> {
    let sign = if is_add { 1.0 } else { -1.0 };
    match (l, r) {
        (Value::Real(a), Value::Real(b)) => Ok(Value::Real(a + sign * b)),
        (Value::Complex { re: ar, im: ai }, Value::Complex { re: br, im: bi }) => {
            Ok(Value::Complex { re: ar + sign * br, im: ai + sign * bi })
        }
        (Value::Real(a), Value::Complex { re, im }) => {
            Ok(Value::Complex { re: a + sign * re, im: sign * im })
        }
        (Value::Complex { re, im }, Value::Real(b)) => {
            Ok(Value::Complex { re: re + sign * b, im })
        }
        (Value::Unit { magnitude: am, unit: au }, Value::Unit { magnitude: bm, unit: bu }) => {
            if au != bu {
                return Err(EvaluationError::new("incompatible units", 0));
            }
            Ok(Value::Unit { magnitude: am + sign * bm, unit: au })
        }
        _ => Err(EvaluationError::new("incompatible units", 0)),
    }
}

fn mul(l: Value, r: Value) -> Result<Value, EvaluationError> {
    match (l, r) {
        (Value::Real(a), Value::Real(b)) => Ok(Value::Real(a * b)),
        (Value::Complex { re: ar, im: ai }, Value::Complex { re: br, im: bi }) => Ok(Value::Complex {
            re: ar * br - ai * bi,
            im: ar * bi + ai * br,
        }),
        (Value::Real(a), Value::Complex { re, im }) | (Value::Complex { re, im }, Value::Real(a)) => {
            Ok(Value::Complex { re: a * re, im: a * im })
        }
        (Value::Unit { magnitude, unit }, Value::Real(r)) | (Value::Real(r), Value::Unit { magnitude, unit }) => {
            Ok(Value::Unit { magnitude: magnitude * r, unit })
        }
        // Non-goal / open question (b): unit composition (m*m -> m^2) is not
        // implemented; the left operand's unit label is kept as-is.
        (Value::Unit { magnitude: am, unit }, Value::Unit { magnitude: bm, .. }) => {
            Ok(Value::Unit { magnitude: am * bm, unit })
        }
        _ => Err(EvaluationError::new("incompatible units", 0)),
    }
}

fn div(l: Value, r: Value) -> Result<Value, EvaluationError> {
    match (l, r) {
        (Value::Real(a), Value::Real(b)) => Ok(Value::Real(a / b)),
        (Value::Complex { re: ar, im: ai }, Value::Complex { re: br, im: bi }) => {
            let denom = br * br + bi * bi;
            Ok(Value::Complex { re: (ar * br + ai * bi) / denom, im: (ai * br - ar * bi) / denom })
        }
        (Value::Real(a), Value::Complex { re, im }) => div(
            Value::Complex { re: a, im: 0.0 },
            Value::Complex { re, im },
        ),
        (Value::Complex { re, im }, Value::Real(b)) => Ok(Value::Complex { re: re / b, im: im / b }),
        (Value::Unit { magnitude: am, unit: au }, Value::Unit { magnitude: bm, unit: bu }) => {
            if au != bu {
                return Err(EvaluationError::new("incompatible units", 0));
            }
            Ok(Value::Real(am / bm)) // unit cancels
        }
        (Value::Unit { magnitude, unit }, Value::Real(r)) => Ok(Value::Unit { magnitude: magnitude / r, unit }),
        (Value::Real(r), Value::Unit { magnitude, unit }) => Ok(Value::Unit { magnitude: r / magnitude, unit }),
        _ => Err(EvaluationError::new("incompatible units", 0)),
    }
}

fn pow(l: Value, r: Value) -> Result<Value, EvaluationError> {
    match (l, r) {
        (Value::Real(base), Value::Real(exp)) => {
            if base >= 0.0 || exp.fract() == 0.0 {
                Ok(Value::Real(base.powf(exp)))
            } else {
                complex_pow(Value::Complex { re: base, im: 0.0 }, Value::Complex { re: exp, im: 0.0 })
            }
        }
        (Value::Unit { magnitude, unit }, Value::Real(exp)) if exp.fract() == 0.0 => {
            Ok(Value::Unit { magnitude: magnitude.powf(exp), unit })
        }
        (l, r) => {
            let lc = to_complex(l)?;
            let rc = to_complex(r)?;
            complex_pow(lc, rc)
        }
    }
}

fn to_complex(v: Value) -> Result<Value, EvaluationError> {
    match v {
        Value::Real(r) => Ok(Value::Complex { re: r, im: 0.0 }),
        c @ Value::Complex { .. } => Ok(c),
        Value::Unit { .. } => Err(EvaluationError::new("units cannot be promoted to complex", 0)),
    }
}

/// `b^e = exp(e * ln(b))` for complex base/exponent.
fn complex_pow(base: Value, exp: Value) -> Result<Value, EvaluationError> {
    let (br, bi) = as_complex_pair(base);
    let (er, ei) = as_complex_pair(exp);
    if br == 0.0 && bi == 0.0 {
        return Ok(Value::Complex { re: 0.0, im: 0.0 });
    }
    let ln_r = (br * br + bi * bi).sqrt().ln();
    let ln_theta = bi.atan2(br);
    // ln(b) = ln_r + i*ln_theta
    let ln_re = ln_r;
    let ln_im = ln_theta;
    // e * ln(b)
    let prod_re = er * ln_re - ei * ln_im;
    let prod_im = er * ln_im + ei * ln_re;
    let mag = prod_re.exp();
    Ok(Value::Complex { re: mag * prod_im.cos(), im: mag * prod_im.sin() })
}

fn as_complex_pair(v: Value) -> (f64, f64) {
    match v {
        Value::Real(r) => (r, 0.0),
        Value::Complex { re, im } => (re, im),
        Value::Unit { magnitude, .. } => (magnitude, 0.0),
    }
}

fn evaluate_call(name: &str, args: &[Node], env: &Env) -> Result<Value, EvaluationError> {
    let values: Result<Vec<Value>, EvaluationError> = args.iter().map(|a| evaluate(a, env)).collect();
    let values = values?;

    let real_arg = |v: &Value, idx: usize| -> Result<f64, EvaluationError> {
        v.as_real().ok_or_else(|| {
            EvaluationError::new(format!("argument {} of '{}' must be real", idx, name), 0)
        })
    };

    match name {
        "sqrt" if values.len() == 1 => match &values[0] {
            Value::Real(r) if *r < 0.0 => Ok(Value::Complex { re: 0.0, im: (-r).sqrt() }),
            Value::Real(r) => Ok(Value::Real(r.sqrt())),
            Value::Complex { .. } => complex_pow(values[0].clone(), Value::Real(0.5)),
            Value::Unit { magnitude, unit } if *magnitude >= 0.0 => {
                Ok(Value::Unit { magnitude: magnitude.sqrt(), unit: unit.clone() })
            }
            _ => Err(EvaluationError::new("sqrt of a negative unit value is unsupported", 0)),
        },
        "sin" if values.len() == 1 => Ok(Value::Real(real_arg(&values[0], 0)?.sin())),
        "cos" if values.len() == 1 => Ok(Value::Real(real_arg(&values[0], 0)?.cos())),
        "tan" if values.len() == 1 => Ok(Value::Real(real_arg(&values[0], 0)?.tan())),
        "asin" if values.len() == 1 => Ok(Value::Real(real_arg(&values[0], 0)?.asin())),
        "acos" if values.len() == 1 => Ok(Value::Real(real_arg(&values[0], 0)?.acos())),
        "atan" if values.len() == 1 => Ok(Value::Real(real_arg(&values[0], 0)?.atan())),
        "exp" if values.len() == 1 => Ok(Value::Real(real_arg(&values[0], 0)?.exp())),
        "ln" if values.len() == 1 => {
            let x = real_arg(&values[0], 0)?;
            if x < 0.0 {
                Err(EvaluationError::new("ln of a negative number is undefined here", 0))
            } else {
                Ok(Value::Real(x.ln()))
            }
        }
        "log" if values.len() == 2 => {
            let x = real_arg(&values[0], 0)?;
            let base = real_arg(&values[1], 1)?;
            Ok(Value::Real(x.ln() / base.ln()))
        }
        "abs" if values.len() == 1 => match &values[0] {
            Value::Real(r) => Ok(Value::Real(r.abs())),
            Value::Complex { re, im } => Ok(Value::Real((re * re + im * im).sqrt())),
            Value::Unit { magnitude, unit } => Ok(Value::Unit { magnitude: magnitude.abs(), unit: unit.clone() }),
        },
        "fact" if values.len() == 1 => {
            let n = real_arg(&values[0], 0)?;
            if n.fract() != 0.0 || n < 0.0 || n > 170.0 {
                return Err(EvaluationError::new(
                    "fact(n) requires an integer n in [0, 170]",
                    0,
                ));
            }
            let mut acc = 1.0f64;
            let mut k = 1.0f64;
            while k <= n {
                acc *= k;
                k += 1.0;
            }
            Ok(Value::Real(acc))
        }
        _ => Err(EvaluationError::new(format!("unknown or arity-mismatched function '{}'", name), 0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    fn eval(src: &str) -> Value {
        evaluate(&parse_str(src).unwrap(), &Env::new()).unwrap()
    }

    #[test]
    fn simple_arithmetic() {
        assert_eq!(eval("1+2"), Value::Real(3.0));
    }

    #[test]
    fn sqrt_of_negative_promotes_to_complex() {
        assert_eq!(eval("sqrt(-1)"), Value::Complex { re: 0.0, im: 1.0 });
    }

    #[test]
    fn fact_of_five() {
        assert_eq!(eval("fact(5)"), Value::Real(120.0));
    }

    #[test]
    fn fact_rejects_non_integer() {
        let err = evaluate(&parse_str("fact(2.5)").unwrap(), &Env::new()).unwrap_err();
        assert!(err.message.contains("integer"));
    }

    #[test]
    fn unknown_symbol_errors() {
        let err = evaluate(&parse_str("q").unwrap(), &Env::new()).unwrap_err();
        assert!(err.message.contains("unknown symbol"));
    }

    #[test]
    fn incompatible_units_error() {
        let err = evaluate(&parse_str("2m+3s").unwrap(), &Env::new()).unwrap_err();
        assert!(err.message.contains("incompatible units"));
    }

    #[test]
    fn log_base_ten() {
        match eval("log(100, 10)") {
            Value::Real(r) => assert!((r - 2.0).abs() < 1e-9),
            other => panic!("expected Real, got {other:?}"),
        }
    }

    #[test]
    fn power_of_negative_base_with_fractional_exponent_promotes_to_complex() {
        assert!(matches!(eval("(-8)^(1/3)"), Value::Complex { .. }));
    }
}
