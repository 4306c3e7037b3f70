//! Tag expression tree and infix parser.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boolean expression over tag literals.
///
/// An absent expression (hooks store `Option<TagExpression>`) means the hook
/// applies unconditionally; that case is handled by the matcher, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum TagExpression {
    Literal { tag: String },
    And { left: Box<TagExpression>, right: Box<TagExpression> },
    Or { left: Box<TagExpression>, right: Box<TagExpression> },
    Not { inner: Box<TagExpression> },
}

impl TagExpression {
    pub fn literal(tag: impl Into<String>) -> Self {
        TagExpression::Literal { tag: tag.into() }
    }

    pub fn and(left: TagExpression, right: TagExpression) -> Self {
        TagExpression::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: TagExpression, right: TagExpression) -> Self {
        TagExpression::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn not(inner: TagExpression) -> Self {
        TagExpression::Not {
            inner: Box::new(inner),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagParseError {
    #[error("empty tag expression")]
    Empty,
    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unbalanced parenthesis at position {0}")]
    UnbalancedParen(usize),
}

/// Parse an infix tag expression.
///
/// Grammar (lowest precedence first): `or := and ('|' and)*`,
/// `and := unary ('&' unary)*`, `unary := '!' unary | '(' or ')' | literal`.
/// `&&` and `||` are accepted as aliases. Literals run until an operator,
/// parenthesis, or whitespace.
pub fn parse_tag_expression(input: &str) -> Result<TagExpression, TagParseError> {
    let mut parser = Parser {
        chars: input.char_indices().collect(),
        pos: 0,
    };
    parser.skip_ws();
    if parser.at_end() {
        return Err(TagParseError::Empty);
    }
    let expr = parser.parse_or()?;
    parser.skip_ws();
    if let Some((i, c)) = parser.peek() {
        return Err(TagParseError::UnexpectedChar(c, i));
    }
    Ok(expr)
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<(usize, char)> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some((_, c)) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    // Consumes c, folding doubled operators (&& / ||) into one.
    fn eat_operator(&mut self, op: char) {
        self.bump();
        if matches!(self.peek(), Some((_, c)) if c == op) {
            self.bump();
        }
    }

    fn parse_or(&mut self) -> Result<TagExpression, TagParseError> {
        let mut left = self.parse_and()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some((_, '|')) => {
                    self.eat_operator('|');
                    let right = self.parse_and()?;
                    left = TagExpression::or(left, right);
                }
                _ => return Ok(left),
            }
        }
    }

    fn parse_and(&mut self) -> Result<TagExpression, TagParseError> {
        let mut left = self.parse_unary()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some((_, '&')) => {
                    self.eat_operator('&');
                    let right = self.parse_unary()?;
                    left = TagExpression::and(left, right);
                }
                _ => return Ok(left),
            }
        }
    }

    fn parse_unary(&mut self) -> Result<TagExpression, TagParseError> {
        self.skip_ws();
        match self.peek() {
            Some((_, '!')) => {
                self.bump();
                Ok(TagExpression::not(self.parse_unary()?))
            }
            Some((open, '(')) => {
                self.bump();
                let inner = self.parse_or()?;
                self.skip_ws();
                match self.bump() {
                    Some((_, ')')) => Ok(inner),
                    _ => Err(TagParseError::UnbalancedParen(open)),
                }
            }
            Some(_) => self.parse_literal(),
            None => Err(TagParseError::UnexpectedEnd),
        }
    }

    fn parse_literal(&mut self) -> Result<TagExpression, TagParseError> {
        let mut tag = String::new();
        while let Some((i, c)) = self.peek() {
            if c.is_whitespace() || matches!(c, '&' | '|' | '!' | '(' | ')') {
                break;
            }
            if !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.')) {
                return Err(TagParseError::UnexpectedChar(c, i));
            }
            tag.push(c);
            self.bump();
        }
        if tag.is_empty() {
            match self.peek() {
                Some((i, c)) => Err(TagParseError::UnexpectedChar(c, i)),
                None => Err(TagParseError::UnexpectedEnd),
            }
        } else {
            Ok(TagExpression::literal(tag))
        }
    }
}
