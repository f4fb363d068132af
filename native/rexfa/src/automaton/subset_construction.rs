//! Subset construction algorithm for converting ε-NFA to DFA.

use crate::automaton::dfa::DFA;
use crate::automaton::epsilon_nfa::EpsilonNFA;
use crate::automaton::state::{StateId, StateSet};
use indexmap::IndexMap;
use log::{debug, trace};
use std::collections::VecDeque;

/// Convert an epsilon-NFA to a DFA using the powerset construction algorithm.
///
/// DFA states are numbered in discovery order, the start state being 0. The
/// result is total over the NFA's alphabet: a move that reaches no NFA state
/// goes to the dead state, which is never expanded.
pub fn subset_construction(nfa: &EpsilonNFA) -> DFA {
    // Each DFA state corresponds to a set of NFA states. The registry lives
    // for this call only.
    let mut registry: IndexMap<StateSet, StateId> = IndexMap::new();
    let mut dfa = DFA::with_alphabet(nfa.alphabet().clone());

    let Some(start) = nfa.start_state() else {
        // No start state - return empty DFA
        return dfa;
    };

    // Initial DFA state is the epsilon closure of the NFA start state
    let initial_set = nfa.epsilon_closure(&StateSet::singleton(start, nfa.num_states() as usize));
    let initial_dfa_state = dfa.add_state();
    dfa.set_start_state(initial_dfa_state);
    if initial_set.intersects(nfa.final_states()) {
        dfa.add_final_state(initial_dfa_state);
    }
    registry.insert(initial_set.clone(), initial_dfa_state);

    // Queue of DFA states to process, with the NFA states behind them
    let mut worklist: VecDeque<(StateId, StateSet)> = VecDeque::new();
    worklist.push_back((initial_dfa_state, initial_set));

    while let Some((current_dfa_state, current_nfa_set)) = worklist.pop_front() {
        // For each symbol in the alphabet
        for symbol in nfa.alphabet().ids() {
            // Compute the set of NFA states reachable on this symbol
            let next_nfa_set = nfa.move_on_symbol(&current_nfa_set, symbol);

            let next_dfa_state = if next_nfa_set.is_empty() {
                dfa.dead_state()
            } else if let Some(&existing) = registry.get(&next_nfa_set) {
                existing
            } else {
                let new_state = dfa.add_state();
                if next_nfa_set.intersects(nfa.final_states()) {
                    dfa.add_final_state(new_state);
                }
                trace!("discovered DFA state {new_state} = {next_nfa_set:?}");
                registry.insert(next_nfa_set.clone(), new_state);
                worklist.push_back((new_state, next_nfa_set));
                new_state
            };

            dfa.add_transition(current_dfa_state, symbol, next_dfa_state);
        }
    }

    // Store the DFA-to-NFA state mapping for later use; the dead state maps
    // to the empty set.
    let mut mapping = vec![StateSet::default(); dfa.num_states() as usize];
    for (nfa_states, dfa_state) in registry {
        mapping[dfa_state as usize] = nfa_states;
    }
    dfa.set_state_mapping(mapping);

    debug!(
        "subset construction: {} NFA states -> {} DFA states",
        nfa.num_states(),
        dfa.num_states()
    );
    dfa
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::symbol::Symbol;

    const A: Symbol = Symbol::Literal('a');
    const B: Symbol = Symbol::Literal('b');

    #[test]
    fn test_subset_construction_basic() {
        // NFA: 0 -a-> 1, 0 -a-> 2, 1 -b-> 3(final), 2 -b-> 3(final)
        let mut nfa = EpsilonNFA::new();
        nfa.add_transition(0, A, 1);
        nfa.add_transition(0, A, 2);
        nfa.add_transition(1, B, 3);
        nfa.add_transition(2, B, 3);
        nfa.set_start_state(0);
        nfa.add_final_state(3);

        let dfa = subset_construction(&nfa);

        // {0}, {1,2}, PHI, {3}
        assert_eq!(dfa.num_states(), 4);
        assert_eq!(dfa.start_state(), Some(0));
        assert!(dfa.is_total());
        assert_eq!(dfa.state_mapping().unwrap()[1].to_vec(), vec![1, 2]);
        assert_eq!(dfa.dead(), Some(2));
        assert_eq!(dfa.final_states().to_vec(), vec![3]);
        assert!(dfa.accepts("ab"));
        assert!(!dfa.accepts("abb"));
    }

    #[test]
    fn test_subset_construction_with_epsilon() {
        // NFA: 0 -ε-> 1 -a-> 2(final)
        let mut nfa = EpsilonNFA::new();
        nfa.add_epsilon_transition(0, 1);
        nfa.add_transition(1, A, 2);
        nfa.set_start_state(0);
        nfa.add_final_state(2);

        let dfa = subset_construction(&nfa);

        // Initial DFA state should be {0, 1} (epsilon closure of {0})
        assert_eq!(dfa.state_mapping().unwrap()[0].to_vec(), vec![0, 1]);
        // Should have transition on 'a' to a final state
        let next = dfa.transition(0, 0).unwrap();
        assert!(dfa.is_accepting(next));
        assert_eq!(dfa.transition(next, 0), dfa.dead());
    }

    #[test]
    fn test_duplicate_closures_are_reused() {
        // 0 -a-> 1, 1 -a-> 2, 2 -ε-> 1: {1} and {2, 1} differ, but {1, 2}
        // comes back on every further 'a'.
        let mut nfa = EpsilonNFA::new();
        nfa.add_transition(0, A, 1);
        nfa.add_transition(1, A, 2);
        nfa.add_epsilon_transition(2, 1);
        nfa.set_start_state(0);
        nfa.add_final_state(2);

        let dfa = subset_construction(&nfa);
        assert_eq!(dfa.num_states(), 3);
        assert_eq!(dfa.transition(2, 0), Some(2));
        assert_eq!(dfa.dead(), None);
    }

    #[test]
    fn test_empty_nfa() {
        let nfa = EpsilonNFA::new();
        let dfa = subset_construction(&nfa);
        assert!(dfa.start_state().is_none());
        assert!(dfa.is_empty());
    }
}
