use super::{is_binary, is_operator, is_unary};
use crate::error::InvalidRegex;

/// Single left-to-right scan rejecting misplaced operators and whitespace.
///
/// This runs on the literal input, before classes are resolved, so `[` and
/// `]` count as grouping characters here.
pub fn validate(regex: &str) -> Result<(), InvalidRegex> {
    let chars: Vec<char> = regex.chars().collect();
    let Some(last) = chars.len().checked_sub(1) else {
        return Err(InvalidRegex::Empty);
    };

    for (position, &c) in chars.iter().enumerate() {
        if c.is_whitespace() {
            return Err(InvalidRegex::Whitespace { position });
        }
        if !is_operator(c) {
            continue;
        }
        if position == 0 {
            return Err(InvalidRegex::LeadingOperator { operator: c });
        }
        if is_binary(c) && position == last {
            return Err(InvalidRegex::TrailingOperator { operator: c });
        }

        let prev = chars[position - 1];
        let opens = |c: char| matches!(c, '(' | '[');

        if is_unary(c) && (is_operator(prev) || opens(prev)) {
            return Err(InvalidRegex::UnaryOperand {
                operator: c,
                position,
            });
        }
        if is_binary(c) {
            let next = chars[position + 1];
            if is_binary(prev) || opens(prev) || is_operator(next) || matches!(next, ')' | ']') {
                return Err(InvalidRegex::BinaryOperands {
                    operator: c,
                    position,
                });
            }
        }
    }

    Ok(())
}
