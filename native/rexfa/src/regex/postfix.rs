use super::Token;
use crate::error::InvalidRegex;
use std::fmt;

/// A regex in postfix (reverse Polish) order.
///
/// Only [`to_postfix`] builds one, and it checks that the stream reduces to
/// exactly one operand, so consumers can pop operands without failing.
/// `thompson_construction` relies on this to build without errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Postfix {
    tokens: Vec<Token>,
}

impl Postfix {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Display for Postfix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.tokens.iter().try_for_each(|token| token.fmt(f))
    }
}

/// `(` sits at the bottom so no operator ever pops past it.
fn precedence(token: Token) -> u8 {
    match token {
        Token::Star | Token::Plus => 3,
        Token::Concat => 2,
        Token::Alternate => 1,
        Token::Open | Token::Close | Token::Symbol(_) => 0,
    }
}

/// Convert an infix token stream (with explicit concatenation) to postfix
/// using the two-stack operator-precedence algorithm.
pub fn to_postfix(tokens: &[Token]) -> Result<Postfix, InvalidRegex> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut operators: Vec<Token> = Vec::new();

    for &token in tokens {
        match token {
            Token::Symbol(_) => output.push(token),
            Token::Open => operators.push(token),
            Token::Close => loop {
                match operators.pop() {
                    Some(Token::Open) => break,
                    Some(operator) => output.push(operator),
                    None => return Err(InvalidRegex::UnbalancedParentheses),
                }
            },
            operator => {
                while let Some(&top) = operators.last() {
                    if precedence(operator) > precedence(top) {
                        break;
                    }
                    output.push(top);
                    operators.pop();
                }
                operators.push(operator);
            }
        }
    }

    while let Some(operator) = operators.pop() {
        if operator == Token::Open {
            return Err(InvalidRegex::UnbalancedParentheses);
        }
        output.push(operator);
    }

    check_arity(&output)?;
    Ok(Postfix { tokens: output })
}

/// Simulate the operand stack: every operator needs its operands, and one
/// operand must remain at the end.
fn check_arity(tokens: &[Token]) -> Result<(), InvalidRegex> {
    let mut depth = 0usize;
    for token in tokens {
        depth = match token {
            Token::Symbol(_) => depth + 1,
            Token::Star | Token::Plus if depth >= 1 => depth,
            Token::Concat | Token::Alternate if depth >= 2 => depth - 1,
            _ => return Err(InvalidRegex::MissingOperand),
        };
    }
    if depth == 1 {
        Ok(())
    } else {
        Err(InvalidRegex::MissingOperand)
    }
}
