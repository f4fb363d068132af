use super::Token;
use crate::automaton::{Symbol, is_literal};
use crate::error::InvalidRegex;

/// Tokenize `regex`, rewriting every `[...]` class into a parenthesized
/// alternation of its members.
///
/// `x-y` inside a class becomes a single [`Symbol::Range`]; any other member
/// becomes a literal alternative. A member adjacent to `-` belongs to the range
/// only.
pub fn resolve_classes(regex: &str) -> Result<Vec<Token>, InvalidRegex> {
    let mut tokens = Vec::with_capacity(regex.len());
    let mut chars = regex.chars().enumerate();

    while let Some((position, c)) = chars.next() {
        let token = match c {
            '[' => {
                let mut members = Vec::new();
                loop {
                    match chars.next() {
                        Some((_, ']')) => break,
                        Some((_, '[')) | None => return Err(InvalidRegex::UnbalancedBrackets),
                        Some(member) => members.push(member),
                    }
                }
                resolve_class(position, &members, &mut tokens)?;
                continue;
            }
            ']' => return Err(InvalidRegex::UnbalancedBrackets),
            '(' => Token::Open,
            ')' => Token::Close,
            '*' => Token::Star,
            '+' => Token::Plus,
            '|' => Token::Alternate,
            c if is_literal(c) => Token::Symbol(Symbol::Literal(c)),
            character => {
                return Err(InvalidRegex::UnrecognizedCharacter {
                    character,
                    position,
                });
            }
        };
        tokens.push(token);
    }

    Ok(tokens)
}

fn resolve_class(
    open: usize,
    members: &[(usize, char)],
    tokens: &mut Vec<Token>,
) -> Result<(), InvalidRegex> {
    let mut alternatives = Vec::new();
    let is_dash = |j: Option<usize>| j.and_then(|j| members.get(j)).is_some_and(|&(_, c)| c == '-');

    for (j, &(position, c)) in members.iter().enumerate() {
        if c == '-' {
            let lo = j.checked_sub(1).map(|j| members[j].1).filter(|&c| is_literal(c));
            let hi = members.get(j + 1).map(|m| m.1).filter(|&c| is_literal(c));
            let (Some(lo), Some(hi)) = (lo, hi) else {
                return Err(InvalidRegex::InvalidRange { position });
            };
            if lo > hi {
                return Err(InvalidRegex::ReversedRange { lo, hi });
            }
            alternatives.push(Symbol::Range(lo, hi));
        } else if !is_literal(c) {
            return Err(InvalidRegex::UnrecognizedCharacter {
                character: c,
                position,
            });
        } else if !is_dash(j.checked_sub(1)) && !is_dash(Some(j + 1)) {
            alternatives.push(Symbol::Literal(c));
        }
    }

    if alternatives.is_empty() {
        return Err(InvalidRegex::EmptyClass { position: open });
    }

    tokens.push(Token::Open);
    for (i, symbol) in alternatives.into_iter().enumerate() {
        if i > 0 {
            tokens.push(Token::Alternate);
        }
        tokens.push(Token::Symbol(symbol));
    }
    tokens.push(Token::Close);
    Ok(())
}

/// Make concatenation explicit by inserting [`Token::Concat`] between every
/// pair of juxtaposed operands.
pub fn insert_concatenation(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len() * 2);
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        out.push(token);
        if let Some(&next) = iter.peek() {
            if token.ends_operand() && next.starts_operand() {
                out.push(Token::Concat);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(tokens: &[Token]) -> String {
        tokens.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_resolve_ranges_and_members() {
        let tokens = resolve_classes("[a-cx]").unwrap();
        assert_eq!(render(&tokens), "([a-c]|x)");

        let tokens = resolve_classes("[a-c-e]").unwrap();
        assert_eq!(render(&tokens), "([a-c]|[c-e])");

        let tokens = resolve_classes("q[0-9][ab]").unwrap();
        assert_eq!(render(&tokens), "q([0-9])(a|b)");
    }

    #[test]
    fn test_resolve_rejects() {
        assert_eq!(
            resolve_classes("[c-a]"),
            Err(InvalidRegex::ReversedRange { lo: 'c', hi: 'a' })
        );
        assert_eq!(
            resolve_classes("[-a]"),
            Err(InvalidRegex::InvalidRange { position: 1 })
        );
        assert_eq!(
            resolve_classes("[a-]"),
            Err(InvalidRegex::InvalidRange { position: 2 })
        );
        assert_eq!(
            resolve_classes("[]"),
            Err(InvalidRegex::EmptyClass { position: 0 })
        );
        assert_eq!(resolve_classes("[ab"), Err(InvalidRegex::UnbalancedBrackets));
        assert_eq!(resolve_classes("ab]"), Err(InvalidRegex::UnbalancedBrackets));
        assert_eq!(resolve_classes("[a[b]"), Err(InvalidRegex::UnbalancedBrackets));
        assert_eq!(
            resolve_classes("a.b"),
            Err(InvalidRegex::UnrecognizedCharacter {
                character: '.',
                position: 1
            })
        );
        assert_eq!(
            resolve_classes("[a(]"),
            Err(InvalidRegex::UnrecognizedCharacter {
                character: '(',
                position: 2
            })
        );
    }

    #[test]
    fn test_insert_concatenation() {
        let concat = |regex: &str| render(&insert_concatenation(resolve_classes(regex).unwrap()));

        assert_eq!(concat("abc"), "a#b#c");
        assert_eq!(concat("a(b)c"), "a#(b)#c");
        assert_eq!(concat("(a)(b)"), "(a)#(b)");
        assert_eq!(concat("a*b+(c)"), "a*#b+#(c)");
        assert_eq!(concat("a|b"), "a|b");
        assert_eq!(concat("[ab]c"), "(a|b)#c");
    }
}
