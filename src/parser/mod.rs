//! Token sequence → AST via recursive-descent precedence climbing.
//!
//! The grammar is expressed as one function per precedence tier (a family
//! of `parse_*` functions rather than a single generic Pratt loop), which
//! makes the binding-power order explicit in the call graph instead of
//! buried in a numeric table:
//!
//! ```text
//! parse_equality        "="            (lowest)
//!   parse_additive       "+ -"
//!     parse_multiplicative "* /"
//!       parse_signed_term  unary "+ -"
//!         parse_power        "^"        (right-assoc)
//!           parse_implicit_chain  implicit "*" and unit suffix
//!             parse_call_or_primary   calls, postfix    (highest)
//! ```

use crate::ast::{BinaryOp, Node, UnaryOp};
use crate::error::SyntaxError;
use crate::token::{is_unit_symbol, Token, TokenType};

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    eof_position: usize,
    _source: &'a str,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, source: &'a str) -> Self {
        Self { tokens, pos: 0, eof_position: source.len(), _source: source }
    }

    pub fn parse(mut self) -> Result<Node, SyntaxError> {
        let node = self.parse_equality()?;
        if let Some(tok) = self.peek() {
            return Err(SyntaxError::new(
                format!("unexpected token '{}'", tok.value),
                tok.position,
            ));
        }
        Ok(node)
    }

    // -- token-stream helpers -------------------------------------------------

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_position(&self) -> usize {
        self.peek().map(|t| t.position).unwrap_or(self.eof_position)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn check_operator(&self, op: &str) -> bool {
        matches!(self.peek(), Some(t) if t.kind == TokenType::Operator && t.value == op)
    }

    fn expect_punct(&mut self, kind: TokenType, what: &str) -> Result<Token, SyntaxError> {
        match self.peek() {
            Some(t) if t.kind == kind => Ok(self.advance().unwrap()),
            Some(t) => Err(SyntaxError::new(format!("expected {}, found '{}'", what, t.value), t.position)),
            None => Err(SyntaxError::new(format!("expected {}, found end of input", what), self.eof_position)),
        }
    }

    /// Whether the next token can begin a primary with no explicit operator
    /// between it and whatever was already parsed (implicit multiplication,
    /// e.g. `2x` or `(x+1)(x-1)`).
    fn at_implicit_factor_start(&self) -> bool {
        matches!(
            self.peek().map(|t| t.kind),
            Some(TokenType::Number) | Some(TokenType::Identifier) | Some(TokenType::LeftParen)
        )
    }

    // -- precedence tiers, loosest first --------------------------------------

    fn parse_equality(&mut self) -> Result<Node, SyntaxError> {
        let lhs = self.parse_additive()?;
        if self.check_operator("=") {
            self.advance();
            let rhs = self.parse_additive()?;
            return Ok(Node::binary(BinaryOp::Eq, lhs, rhs));
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Node, SyntaxError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = if self.check_operator("+") {
                BinaryOp::Add
            } else if self.check_operator("-") {
                BinaryOp::Sub
            } else {
                break;
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = Node::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Node, SyntaxError> {
        let mut lhs = self.parse_signed_term()?;
        loop {
            let op = if self.check_operator("*") {
                BinaryOp::Mul
            } else if self.check_operator("/") {
                BinaryOp::Div
            } else {
                break;
            };
            self.advance();
            let rhs = self.parse_signed_term()?;
            lhs = Node::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    /// Prefix `+`/`-`; binds tighter than `* /` but looser than `^`, so the
    /// operand is parsed at the power tier (`-x^2 = -(x^2)`).
    fn parse_signed_term(&mut self) -> Result<Node, SyntaxError> {
        if self.check_operator("+") {
            self.advance();
            let operand = self.parse_signed_term()?;
            return Ok(Node::unary(UnaryOp::Plus, operand));
        }
        if self.check_operator("-") {
            self.advance();
            let operand = self.parse_signed_term()?;
            return Ok(Node::unary(UnaryOp::Minus, operand));
        }
        self.parse_power()
    }

    /// Right-associative `^`. The exponent is parsed via `parse_signed_term`
    /// so `x^-2` and right-nested `x^y^z` both fall out naturally.
    fn parse_power(&mut self) -> Result<Node, SyntaxError> {
        let base = self.parse_implicit_chain()?;
        if self.check_operator("^") {
            self.advance();
            let exponent = self.parse_signed_term()?;
            return Ok(Node::binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    /// Implicit multiplication: adjacent primaries with no operator between
    /// them combine left-associatively. Binds tighter than `^`, so `2x^2`
    /// parses as `(2*x)^2`.
    fn parse_implicit_chain(&mut self) -> Result<Node, SyntaxError> {
        let mut lhs = self.parse_call_or_primary()?;
        while self.at_implicit_factor_start() {
            let rhs = self.parse_call_or_primary()?;
            lhs = Node::binary(BinaryOp::Mul, lhs, rhs);
        }
        Ok(lhs)
    }

    /// The tightest tier: numbers (with optional adjacent unit suffix),
    /// symbols, calls, and parenthesized groups.
    fn parse_call_or_primary(&mut self) -> Result<Node, SyntaxError> {
        let tok = match self.peek() {
            Some(t) => t.clone(),
            None => return Err(SyntaxError::new("unexpected end of input", self.eof_position)),
        };

        match tok.kind {
            TokenType::Number => {
                self.advance();
                self.parse_optional_unit_suffix(tok)
            }
            TokenType::Identifier => {
                self.advance();
                self.parse_identifier_tail(tok)
            }
            TokenType::LeftParen => {
                self.advance();
                let inner = self.parse_equality()?;
                self.expect_punct(TokenType::RightParen, "')'")?;
                Ok(inner)
            }
            TokenType::String => Err(SyntaxError::new("unexpected string literal", tok.position)),
            _ => Err(SyntaxError::new(format!("unexpected token '{}'", tok.value), tok.position)),
        }
    }

    /// After a `Number`, an immediately-adjacent (no whitespace, no operator)
    /// identifier drawn from the closed unit-symbol set becomes a
    /// `UnitQuantity` instead of triggering implicit multiplication.
    fn parse_optional_unit_suffix(&mut self, number_tok: Token) -> Result<Node, SyntaxError> {
        let number = Node::number(number_tok.value.clone());
        let adjacent_end = number_tok.position + number_tok.value.len();
        if let Some(next) = self.peek() {
            if next.kind == TokenType::Identifier
                && next.position == adjacent_end
                && is_unit_symbol(&next.value)
            {
                let unit_tok = self.advance().unwrap();
                return Ok(Node::UnitQuantity {
                    magnitude: Box::new(number),
                    unit: unit_tok.value,
                });
            }
        }
        Ok(number)
    }

    /// An identifier followed by `(` is a call; `row`/`vector` produce
    /// `List` nodes rather than generic `Call` nodes.
    fn parse_identifier_tail(&mut self, ident_tok: Token) -> Result<Node, SyntaxError> {
        if matches!(self.peek(), Some(t) if t.kind == TokenType::LeftParen) {
            self.advance();
            let args = self.parse_call_args(&ident_tok.value)?;
            self.expect_punct(TokenType::RightParen, "')'")?;
            if ident_tok.value == "row" || ident_tok.value == "vector" {
                return Ok(Node::List { items: args });
            }
            return Ok(Node::call(ident_tok.value, args));
        }
        Ok(Node::symbol(ident_tok.value))
    }

    /// Comma-separated arguments, optionally trailing-comma terminated.
    /// `limit(`'s second argument is parsed with `parse_arrow_expr` so `->`
    /// is only ever recognized there.
    fn parse_call_args(&mut self, call_name: &str) -> Result<Vec<Node>, SyntaxError> {
        let mut args = Vec::new();
        if matches!(self.peek(), Some(t) if t.kind == TokenType::RightParen) {
            return Ok(args);
        }
        loop {
            let index = args.len();
            let arg = if call_name == "limit" && index == 1 {
                self.parse_arrow_expr()?
            } else {
                self.parse_equality()?
            };
            args.push(arg);
            if matches!(self.peek(), Some(t) if t.kind == TokenType::Comma) {
                self.advance();
                if matches!(self.peek(), Some(t) if t.kind == TokenType::RightParen) {
                    break; // trailing comma
                }
                continue;
            }
            break;
        }
        Ok(args)
    }

    /// `x -> a`, used by `limit(...)`'s target argument. Binds looser than `+`.
    fn parse_arrow_expr(&mut self) -> Result<Node, SyntaxError> {
        let from = self.parse_additive()?;
        if self.check_operator("->") {
            self.advance();
            let to = self.parse_additive()?;
            return Ok(Node::Arrow { from: Box::new(from), to: Box::new(to) });
        }
        Ok(from)
    }
}

pub fn parse(tokens: Vec<Token>, source: &str) -> Result<Node, SyntaxError> {
    Parser::new(tokens, source).parse()
}

pub fn parse_str(source: &str) -> Result<Node, SyntaxError> {
    let tokens = crate::lexer::tokenize(source)?;
    parse(tokens, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, Node};

    fn p(src: &str) -> Node {
        parse_str(src).unwrap_or_else(|e| panic!("parse failed for {src:?}: {e}"))
    }

    #[test]
    fn parses_simple_sum() {
        assert_eq!(p("1+2"), Node::binary(BinaryOp::Add, Node::int(1), Node::int(2)));
    }

    #[test]
    fn implicit_multiplication_number_and_symbol() {
        assert_eq!(p("2x"), Node::binary(BinaryOp::Mul, Node::int(2), Node::symbol("x")));
    }

    #[test]
    fn implicit_multiplication_parens() {
        let node = p("(x+1)(x-1)");
        match node {
            Node::Binary { op: BinaryOp::Mul, .. } => {}
            other => panic!("expected Mul, got {other:?}"),
        }
    }

    #[test]
    fn unary_minus_binds_looser_than_power() {
        // -x^2 == -(x^2)
        let node = p("-x^2");
        match node {
            Node::Unary { operand, .. } => {
                assert_eq!(*operand, Node::binary(BinaryOp::Pow, Node::symbol("x"), Node::int(2)));
            }
            other => panic!("expected Unary, got {other:?}"),
        }
    }

    #[test]
    fn unary_binds_tighter_than_multiplication() {
        // -x*2 == (-x)*2
        let node = p("-x*2");
        match node {
            Node::Binary { op: BinaryOp::Mul, left, .. } => {
                assert!(matches!(*left, Node::Unary { .. }));
            }
            other => panic!("expected Mul, got {other:?}"),
        }
    }

    #[test]
    fn power_is_right_associative() {
        let node = p("2^3^2");
        match node {
            Node::Binary { op: BinaryOp::Pow, left, right } => {
                assert_eq!(*left, Node::int(2));
                assert_eq!(*right, Node::binary(BinaryOp::Pow, Node::int(3), Node::int(2)));
            }
            other => panic!("expected Pow, got {other:?}"),
        }
    }

    #[test]
    fn unit_suffix_binds_before_implicit_multiplication() {
        let node = p("2m");
        match node {
            Node::UnitQuantity { magnitude, unit } => {
                assert_eq!(*magnitude, Node::int(2));
                assert_eq!(unit, "m");
            }
            other => panic!("expected UnitQuantity, got {other:?}"),
        }
    }

    #[test]
    fn call_parses_arguments() {
        let node = p("sin(x)");
        match node {
            Node::Call { name, args } => {
                assert_eq!(name, "sin");
                assert_eq!(args, vec![Node::symbol("x")]);
            }
            other => panic!("expected Call, got {other:?}"),
        }
    }

    #[test]
    fn row_and_vector_produce_list_nodes() {
        let node = p("matrix(row(1,2),row(3,4))");
        match node {
            Node::Call { name, args } => {
                assert_eq!(name, "matrix");
                assert!(matches!(args[0], Node::List { .. }));
            }
            other => panic!("expected Call, got {other:?}"),
        }
    }

    #[test]
    fn limit_second_argument_parses_arrow() {
        let node = p("limit(sin(x)/x, x->0)");
        match node {
            Node::Call { name, args } => {
                assert_eq!(name, "limit");
                assert!(matches!(args[1], Node::Arrow { .. }));
            }
            other => panic!("expected Call, got {other:?}"),
        }
    }

    #[test]
    fn empty_argument_is_a_syntax_error() {
        let err = parse_str("log(,10)").unwrap_err();
        assert_eq!(err.position, 4);
    }

    #[test]
    fn trailing_comma_in_call_is_accepted() {
        assert!(parse_str("sin(x,)").is_ok());
    }

    #[test]
    fn unexpected_end_of_input_positions_at_length() {
        let err = parse_str("1+").unwrap_err();
        assert_eq!(err.position, 2);
    }
}
