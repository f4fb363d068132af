//! Thompson's construction: postfix regex to ε-NFA.

use crate::automaton::epsilon_nfa::EpsilonNFA;
use crate::automaton::state::StateId;
use crate::regex::{Postfix, Token};
use log::debug;

/// Entry and exit state of a sub-automaton.
type Fragment = (StateId, StateId);

fn pop(fragments: &mut Vec<Fragment>) -> Fragment {
    fragments
        .pop()
        .expect("postfix operand counts are checked by the parser")
}

/// Build an ε-NFA with a single start and a single accepting state.
///
/// Every fragment has exactly one entry and one exit; operators only add
/// states and epsilon edges, so the last fragment left on the stack is the
/// whole automaton.
pub fn thompson_construction(postfix: &Postfix) -> EpsilonNFA {
    let mut nfa = EpsilonNFA::new();
    let mut fragments: Vec<Fragment> = Vec::new();

    for &token in postfix.tokens() {
        let fragment = match token {
            Token::Symbol(symbol) => {
                let entry = nfa.add_state();
                let exit = nfa.add_state();
                nfa.add_transition(entry, symbol, exit);
                (entry, exit)
            }
            Token::Star | Token::Plus => {
                let (inner_entry, inner_exit) = pop(&mut fragments);
                let entry = nfa.add_state();
                let exit = nfa.add_state();
                nfa.add_epsilon_transition(entry, inner_entry);
                if token == Token::Star {
                    nfa.add_epsilon_transition(entry, exit);
                }
                nfa.add_epsilon_transition(inner_exit, inner_entry);
                nfa.add_epsilon_transition(inner_exit, exit);
                (entry, exit)
            }
            Token::Concat => {
                let (second_entry, second_exit) = pop(&mut fragments);
                let (first_entry, first_exit) = pop(&mut fragments);
                nfa.add_epsilon_transition(first_exit, second_entry);
                (first_entry, second_exit)
            }
            Token::Alternate => {
                let (right_entry, right_exit) = pop(&mut fragments);
                let (left_entry, left_exit) = pop(&mut fragments);
                let entry = nfa.add_state();
                let exit = nfa.add_state();
                nfa.add_epsilon_transition(entry, left_entry);
                nfa.add_epsilon_transition(entry, right_entry);
                nfa.add_epsilon_transition(left_exit, exit);
                nfa.add_epsilon_transition(right_exit, exit);
                (entry, exit)
            }
            Token::Open | Token::Close => unreachable!("postfix streams carry no parentheses"),
        };
        fragments.push(fragment);
    }

    let (start, accept) = pop(&mut fragments);
    debug_assert!(fragments.is_empty());
    nfa.set_start_state(start);
    nfa.add_final_state(accept);

    debug!(
        "thompson construction: {} states, {} symbols",
        nfa.num_states(),
        nfa.alphabet().len()
    );
    nfa
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::symbol::EPSILON;
    use crate::regex::parse;

    fn build(regex: &str) -> EpsilonNFA {
        thompson_construction(&parse(regex).unwrap())
    }

    #[test]
    fn test_single_symbol() {
        let nfa = build("a");
        assert_eq!(nfa.num_states(), 2);
        assert_eq!(nfa.start_state(), Some(0));
        assert_eq!(nfa.final_states().to_vec(), vec![1]);
        assert_eq!(nfa.destinations(0, 0).map(|d| d.to_vec()), Some(vec![1]));
    }

    #[test]
    fn test_concatenation_threads_epsilon() {
        let nfa = build("ab");
        assert_eq!(nfa.num_states(), 4);
        assert_eq!(nfa.start_state(), Some(0));
        assert_eq!(nfa.final_states().to_vec(), vec![3]);
        assert_eq!(nfa.destinations(1, EPSILON).map(|d| d.to_vec()), Some(vec![2]));
    }

    #[test]
    fn test_star_and_plus_shapes() {
        let star = build("a*");
        assert_eq!(star.start_state(), Some(2));
        assert_eq!(star.final_states().to_vec(), vec![3]);
        assert_eq!(star.destinations(2, EPSILON).map(|d| d.to_vec()), Some(vec![0, 3]));
        assert_eq!(star.destinations(1, EPSILON).map(|d| d.to_vec()), Some(vec![0, 3]));
        assert!(star.accepts(""));

        let plus = build("a+");
        assert_eq!(plus.destinations(2, EPSILON).map(|d| d.to_vec()), Some(vec![0]));
        assert_eq!(plus.destinations(1, EPSILON).map(|d| d.to_vec()), Some(vec![0, 3]));
        assert!(!plus.accepts(""));
        assert!(plus.accepts("aaa"));
    }

    #[test]
    fn test_alternation_shape() {
        let nfa = build("a|b");
        assert_eq!(nfa.num_states(), 6);
        assert_eq!(nfa.start_state(), Some(4));
        assert_eq!(nfa.final_states().to_vec(), vec![5]);
        assert_eq!(nfa.destinations(4, EPSILON).map(|d| d.to_vec()), Some(vec![0, 2]));
        assert!(nfa.accepts("a"));
        assert!(nfa.accepts("b"));
        assert!(!nfa.accepts("ab"));
    }

    #[test]
    fn test_single_start_and_accept() {
        let nfa = build("(a|b)*c+[x-z]");
        assert_eq!(nfa.final_states().len(), 1);
        assert!(nfa.start_state().is_some());
        assert!(nfa.accepts("abcx"));
        assert!(nfa.accepts("ccz"));
        assert!(!nfa.accepts("ab"));
    }
}
