//! Regex front-end: validation, character classes, explicit concatenation and
//! infix-to-postfix conversion.
//!
//! The accepted syntax is deliberately small: literal characters, `[...]`
//! classes with `x-y` ranges, `(` `)` grouping, `|` alternation, implicit
//! concatenation and the postfix operators `*` and `+`. There is no escape
//! syntax.

mod charset;
mod postfix;
mod validate;

use crate::automaton::Symbol;
use crate::error::InvalidRegex;
use log::debug;
use std::fmt;

pub use charset::{insert_concatenation, resolve_classes};
pub use postfix::{Postfix, to_postfix};
pub use validate::validate;

/// A lexical unit of a regex after character classes have been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Symbol(Symbol),
    /// Zero or more, `*`.
    Star,
    /// One or more, `+`.
    Plus,
    /// Explicit concatenation, inserted between juxtaposed operands.
    Concat,
    Alternate,
    Open,
    Close,
}

impl Token {
    /// Whether an operand can end right before this token's successor.
    fn ends_operand(self) -> bool {
        matches!(
            self,
            Token::Symbol(_) | Token::Close | Token::Star | Token::Plus
        )
    }

    fn starts_operand(self) -> bool {
        matches!(self, Token::Symbol(_) | Token::Open)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Symbol(symbol) => symbol.fmt(f),
            Token::Star => f.write_str("*"),
            Token::Plus => f.write_str("+"),
            Token::Concat => f.write_str("#"),
            Token::Alternate => f.write_str("|"),
            Token::Open => f.write_str("("),
            Token::Close => f.write_str(")"),
        }
    }
}

pub(crate) fn is_unary(c: char) -> bool {
    matches!(c, '*' | '+')
}

pub(crate) fn is_binary(c: char) -> bool {
    c == '|'
}

pub(crate) fn is_operator(c: char) -> bool {
    is_unary(c) || is_binary(c)
}

/// Run the whole front-end over `regex`, producing its postfix token stream.
pub fn parse(regex: &str) -> Result<Postfix, InvalidRegex> {
    validate(regex)?;
    let tokens = insert_concatenation(resolve_classes(regex)?);
    let postfix = to_postfix(&tokens)?;
    debug!("parsed {regex:?} into postfix {postfix} ({} tokens)", postfix.len());
    Ok(postfix)
}
