//! Stage 1: string → token sequence.
//!
//! A single-pass scanner over the byte representation of the input: a
//! `position` cursor over `&[u8]`, one `next_token` call per outer-loop
//! iteration.

use crate::error::SyntaxError;
use crate::token::{Token, TokenType};

pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, bytes: source.as_bytes(), position: 0 }
    }

    /// Tokenizes the whole source. Whitespace is skipped; any other
    /// unrecognized byte fails at its offset.
    pub fn tokenize(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            if self.position >= self.bytes.len() {
                break;
            }
            tokens.push(self.next_token()?);
        }
        Ok(tokens)
    }

    fn skip_whitespace(&mut self) {
        while self.position < self.bytes.len() && self.bytes[self.position].is_ascii_whitespace() {
            self.position += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.position + offset).copied()
    }

    fn next_token(&mut self) -> Result<Token, SyntaxError> {
        let start = self.position;
        let b = self.bytes[start];

        if b.is_ascii_digit() {
            return Ok(self.scan_number(start));
        }
        if b.is_ascii_alphabetic() || b == b'_' {
            return Ok(self.scan_identifier(start));
        }
        if b == b'"' {
            return self.scan_string(start);
        }
        if b == b'-' && self.peek_at(1) == Some(b'>') {
            self.position += 2;
            return Ok(Token::new(TokenType::Operator, "->", start));
        }
        if matches!(b, b'+' | b'-' | b'*' | b'/' | b'^' | b'=') {
            self.position += 1;
            return Ok(Token::new(TokenType::Operator, (b as char).to_string(), start));
        }
        let punct = match b {
            b'(' => Some(TokenType::LeftParen),
            b')' => Some(TokenType::RightParen),
            b'[' => Some(TokenType::LeftBracket),
            b']' => Some(TokenType::RightBracket),
            b',' => Some(TokenType::Comma),
            b';' => Some(TokenType::Semicolon),
            _ => None,
        };
        if let Some(kind) = punct {
            self.position += 1;
            return Ok(Token::new(kind, (b as char).to_string(), start));
        }

        Err(SyntaxError::new(format!("unexpected character '{}'", b as char), start))
    }

    /// `[0-9]+ ('.' [0-9]+)? ([eE] [+-]? [0-9]+)?` — no leading decimal point.
    fn scan_number(&mut self, start: usize) -> Token {
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.position += 1;
        }
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b) if b.is_ascii_digit()) {
            self.position += 1;
            while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
                self.position += 1;
            }
        }
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            let mut lookahead = 1;
            if matches!(self.peek_at(lookahead), Some(b'+') | Some(b'-')) {
                lookahead += 1;
            }
            if matches!(self.peek_at(lookahead), Some(b) if b.is_ascii_digit()) {
                self.position += lookahead;
                while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
                    self.position += 1;
                }
            }
        }
        Token::new(TokenType::Number, &self.source[start..self.position], start)
    }

    /// `[A-Za-z_] [A-Za-z_0-9]*`, matched greedily.
    fn scan_identifier(&mut self, start: usize) -> Token {
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.position += 1;
        }
        Token::new(TokenType::Identifier, &self.source[start..self.position], start)
    }

    /// No escape sequences; newlines are rejected.
    fn scan_string(&mut self, start: usize) -> Result<Token, SyntaxError> {
        self.position += 1; // opening quote
        let content_start = self.position;
        loop {
            match self.peek() {
                None => return Err(SyntaxError::new("unterminated string literal", start)),
                Some(b'\n') => return Err(SyntaxError::new("newline in string literal", self.position)),
                Some(b'"') => break,
                Some(_) => self.position += 1,
            }
        }
        let content = &self.source[content_start..self.position];
        self.position += 1; // closing quote
        Ok(Token::new(TokenType::String, content, start))
    }
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_simple_sum() {
        let tokens = tokenize("1+2").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].value, "1");
        assert_eq!(tokens[1].value, "+");
        assert_eq!(tokens[2].value, "2");
    }

    #[test]
    fn tokenizes_scientific_notation() {
        let tokens = tokenize("1.5e-3").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].value, "1.5e-3");
    }

    #[test]
    fn tokenizes_arrow_before_minus() {
        let tokens = tokenize("x->0").unwrap();
        assert_eq!(tokens[1].value, "->");
    }

    #[test]
    fn rejects_unknown_byte() {
        let err = tokenize("1 $ 2").unwrap_err();
        assert_eq!(err.position, 2);
    }

    #[test]
    fn rejects_newline_in_string() {
        let err = tokenize("\"a\nb\"").unwrap_err();
        assert!(err.message.contains("newline"));
    }

    #[test]
    fn preserves_lexeme_and_does_not_lowercase() {
        let tokens = tokenize("PI").unwrap();
        assert_eq!(tokens[0].value, "PI");
    }
}
