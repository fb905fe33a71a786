//! AST → TeX. A total, deterministic function: every node shape maps to
//! exactly one string, never fails.
//!
//! Parenthesization is written out per-operator (explicit match arms, no
//! generic precedence table), one rule per operator kind rather than
//! deriving spacing from a numeric precedence.

use crate::ast::{BinaryOp, Node, UnaryOp};

pub fn to_katex(node: &Node) -> String {
    match node {
        Node::Number { value } => value.clone(),
        Node::Symbol { name } => symbol_tex(name),
        Node::UnitQuantity { magnitude, unit } => {
            format!("{}\\ \\mathrm{{{}}}", to_katex(magnitude), unit)
        }
        Node::Unary { op, operand } => {
            let sign = match op {
                UnaryOp::Plus => "+",
                UnaryOp::Minus => "-",
            };
            format!("{}{}", sign, wrap(operand, is_sum_like(operand)))
        }
        Node::Binary { op, left, right } => format_binary(*op, left, right),
        Node::Call { name, args } => format_call(name, args),
        Node::Arrow { from, to } => format!("{} \\to {}", to_katex(from), to_katex(to)),
        Node::List { items } => {
            let rendered: Vec<String> = items.iter().map(to_katex).collect();
            format!("\\left[{}\\right]", rendered.join(", "))
        }
    }
}

fn format_binary(op: BinaryOp, left: &Node, right: &Node) -> String {
    match op {
        BinaryOp::Add => format!("{} + {}", to_katex(left), to_katex(right)),
        BinaryOp::Sub => {
            let wrap_right = is_sum_like(right);
            format!("{} - {}", to_katex(left), wrap(right, wrap_right))
        }
        BinaryOp::Mul => {
            format!("{} {}", wrap(left, is_sum_like(left)), wrap(right, is_sum_like(right)))
        }
        BinaryOp::Div => format!("\\frac{{{}}}{{{}}}", to_katex(left), to_katex(right)),
        BinaryOp::Pow => {
            format!("{}^{{{}}}", wrap(left, is_compound_base(left)), to_katex(right))
        }
        BinaryOp::Eq => format!("{} = {}", to_katex(left), to_katex(right)),
    }
}

fn format_call(name: &str, args: &[Node]) -> String {
    match name {
        "sqrt" if args.len() == 1 => format!("\\sqrt{{{}}}", to_katex(&args[0])),
        "log" if args.len() == 2 => {
            format!("\\log_{{{}}}\\left({}\\right)", to_katex(&args[1]), to_katex(&args[0]))
        }
        "log" if args.len() == 1 => format!("\\log\\left({}\\right)", to_katex(&args[0])),
        "sin" | "cos" | "tan" if args.len() == 1 => {
            format!("\\{}\\left({}\\right)", name, to_katex(&args[0]))
        }
        "asin" if args.len() == 1 => format!("\\arcsin\\left({}\\right)", to_katex(&args[0])),
        "acos" if args.len() == 1 => format!("\\arccos\\left({}\\right)", to_katex(&args[0])),
        "atan" if args.len() == 1 => format!("\\arctan\\left({}\\right)", to_katex(&args[0])),
        "exp" if args.len() == 1 => format!("\\exp\\left({}\\right)", to_katex(&args[0])),
        "ln" if args.len() == 1 => format!("\\ln\\left({}\\right)", to_katex(&args[0])),
        "abs" if args.len() == 1 => format!("\\left|{}\\right|", to_katex(&args[0])),
        "fact" if args.len() == 1 => {
            let atomic = matches!(args[0], Node::Number { .. } | Node::Symbol { .. } | Node::Call { .. });
            format!("{}!", wrap(&args[0], !atomic))
        }
        _ => {
            let rendered: Vec<String> = args.iter().map(to_katex).collect();
            format!("\\mathrm{{{}}}({})", name, rendered.join(", "))
        }
    }
}

fn symbol_tex(name: &str) -> String {
    match name {
        "pi" => "\\pi".to_string(),
        "e" => "e".to_string(),
        "i" => "i".to_string(),
        _ => format!("\\mathrm{{{}}}", name),
    }
}

fn is_sum_like(node: &Node) -> bool {
    matches!(
        node,
        Node::Binary { op: BinaryOp::Add, .. }
            | Node::Binary { op: BinaryOp::Sub, .. }
            | Node::Binary { op: BinaryOp::Eq, .. }
    )
}

fn is_compound_base(node: &Node) -> bool {
    !matches!(
        node,
        Node::Number { .. } | Node::Symbol { .. } | Node::UnitQuantity { .. } | Node::Call { .. } | Node::List { .. }
    )
}

fn wrap(node: &Node, should_wrap: bool) -> String {
    let rendered = to_katex(node);
    if should_wrap {
        format!("\\left({}\\right)", rendered)
    } else {
        rendered
    }
}

/// Fixed-precision rendering with trailing fractional zeros and a trailing
/// decimal point trimmed off. Negative zero renders as `"0"` — `value ==
/// 0.0` is true for `-0.0` under IEEE 754, so no special case is needed.
pub fn format_approx(value: f64, precision: u8) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let fixed = format!("{:.*}", precision as usize, value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() { "0".to_string() } else { trimmed.to_string() }
}
