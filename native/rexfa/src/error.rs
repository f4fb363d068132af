//! Error types.

use thiserror::Error;

/// Reasons a regex is rejected before any automaton is built.
///
/// Positions are character indices into the regex as given by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRegex {
    #[error("invalid regex: empty regex")]
    Empty,

    #[error("invalid regex: whitespace at position {position}")]
    Whitespace { position: usize },

    #[error("invalid regex: operator `{operator}` at the beginning")]
    LeadingOperator { operator: char },

    #[error("invalid regex: operator `{operator}` at the end")]
    TrailingOperator { operator: char },

    #[error("invalid regex: operator `{operator}` at position {position} has an invalid operand")]
    UnaryOperand { operator: char, position: usize },

    #[error("invalid regex: operator `{operator}` at position {position} has invalid operands")]
    BinaryOperands { operator: char, position: usize },

    #[error("invalid regex: range at position {position} needs a literal on both sides")]
    InvalidRange { position: usize },

    #[error("invalid regex: range `{lo}-{hi}` is reversed")]
    ReversedRange { lo: char, hi: char },

    #[error("invalid regex: empty character class at position {position}")]
    EmptyClass { position: usize },

    #[error("invalid regex: brackets are not balanced")]
    UnbalancedBrackets,

    #[error("invalid regex: parentheses are not balanced")]
    UnbalancedParentheses,

    #[error("invalid regex: invalid character `{character}` at position {position}")]
    UnrecognizedCharacter { character: char, position: usize },

    #[error("invalid regex: an operator or group is missing its operand")]
    MissingOperand,
}

/// Errors raised by the crate outside the regex front-end.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    InvalidRegex(#[from] InvalidRegex),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("automaton file has no start state `{0}`")]
    MissingStart(String),

    #[error("automaton file references unknown state `{0}`")]
    UnknownState(String),

    #[error("automaton file has an invalid transition label `{0}`")]
    BadSymbol(String),

    #[error("state `{state}` is missing a transition on `{symbol}`")]
    MissingTransition { state: String, symbol: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
