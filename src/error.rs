//! Error types for every stage of the pipeline.
//!
//! Hand-rolled, not built on `thiserror`/`anyhow`: each variant carries a
//! byte offset into the original source plus a short message, and `Display`
//! is written by hand so a caller can render a caret under the offending
//! byte without pulling in a formatting crate.

use std::fmt;

/// A byte-offset span into the original input, same shape as `Token::position`.
pub type Position = usize;

/// Failure raised by the tokenizer or the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub message: String,
    pub position: Position,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self { message: message.into(), position }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.position)
    }
}

impl std::error::Error for SyntaxError {}

/// Failure raised while evaluating, simplifying, or solving an already-parsed AST.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationError {
    pub message: String,
    pub position: Position,
}

impl EvaluationError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self { message: message.into(), position }
    }
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.position)
    }
}

impl std::error::Error for EvaluationError {}

/// The engine façade's single error type: every stage's failure collapses to
/// this shape before leaving `Engine::analyze`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EvaluationFailure {
    pub message: String,
    pub position: Position,
}

impl fmt::Display for EvaluationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.position)
    }
}

impl std::error::Error for EvaluationFailure {}

impl From<SyntaxError> for EvaluationFailure {
    fn from(e: SyntaxError) -> Self {
        Self { message: e.message, position: e.position }
    }
}

impl From<EvaluationError> for EvaluationFailure {
    fn from(e: EvaluationError) -> Self {
        Self { message: e.message, position: e.position }
    }
}

/// Renders a caret under `position` in `source`, annotating the offending
/// line. Used only by the CLI.
pub fn display_with_source(message: &str, position: Position, source: &str) -> String {
    let mut line_num = 1usize;
    let mut line_start = 0usize;
    for (i, c) in source.char_indices() {
        if i >= position {
            break;
        }
        if c == '\n' {
            line_num += 1;
            line_start = i + 1;
        }
    }
    let line_end = source[line_start..]
        .find('\n')
        .map(|off| line_start + off)
        .unwrap_or(source.len());
    let line_content = &source[line_start..line_end];
    let col = position.saturating_sub(line_start);
    let underline = format!("{}^", " ".repeat(col));
    format!(
        "error: {}\n\n{:4} | {}\n     | {}",
        message, line_num, line_content, underline
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_display_includes_position() {
        let e = SyntaxError::new("unexpected end of input", 7);
        assert_eq!(e.to_string(), "unexpected end of input (at byte 7)");
    }

    #[test]
    fn display_with_source_points_at_offset() {
        let rendered = display_with_source("bad token", 2, "1+x");
        assert!(rendered.contains("1+x"));
        assert!(rendered.contains("^"));
    }
}
