//! Token types produced by the tokenizer (`lexer.rs`).
//!
//! Tokens are immutable and carry a byte `position` into the original
//! source, so later stages can report errors at the right offset.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Number,
    Identifier,
    String,
    Operator,
    Comma,
    Semicolon,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenType,
    pub value: String,
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenType, value: impl Into<String>, position: usize) -> Self {
        Self { kind, value: value.into(), position }
    }
}

/// Unit symbols recognized as a suffix directly after a `Number` with no
/// intervening whitespace or operator (e.g. `5kg`, `3.2m`).
pub const UNIT_SYMBOLS: &[&str] = &[
    "m", "s", "kg", "g", "cm", "mm", "km", "ms", "us", "ns", "Hz", "N", "J",
    "W", "Pa", "A", "V", "Ω", "mol", "K",
];

pub fn is_unit_symbol(name: &str) -> bool {
    UNIT_SYMBOLS.contains(&name)
}
