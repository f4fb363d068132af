//! Epsilon Non-deterministic Finite Automaton (ε-NFA) implementation.

use crate::automaton::state::{StateId, StateSet};
use crate::automaton::symbol::{Alphabet, EPSILON, Symbol, SymbolId, is_epsilon};
use indexmap::IndexMap;
use std::collections::{HashMap, VecDeque};
use std::iter;

/// A labeled edge in the graph representation: (source, destination, label).
pub type GraphEdge = (StateId, StateId, String);

/// An Epsilon Non-deterministic Finite Automaton.
#[derive(Debug, Clone)]
pub struct EpsilonNFA {
    /// Number of states (states are numbered 0..num_states)
    num_states: StateId,
    /// Start state (None if empty)
    start_state: Option<StateId>,
    /// Final (accepting) states
    final_states: StateSet,
    /// Transitions: (source, symbol) -> set of destination states
    /// For epsilon transitions, symbol == EPSILON
    transitions: HashMap<(StateId, SymbolId), StateSet>,
    /// All symbols used (excluding epsilon), in first-appearance order
    alphabet: Alphabet,
    /// Cached epsilon closures for each state
    epsilon_closures: Option<Vec<StateSet>>,
}

impl EpsilonNFA {
    /// Create a new empty epsilon-NFA.
    pub fn new() -> Self {
        Self {
            num_states: 0,
            start_state: None,
            final_states: StateSet::with_capacity(16),
            transitions: HashMap::new(),
            alphabet: Alphabet::new(),
            epsilon_closures: None,
        }
    }

    /// Add a new state and return its ID.
    pub fn add_state(&mut self) -> StateId {
        let id = self.num_states;
        self.num_states += 1;
        self.epsilon_closures = None;
        id
    }

    /// Ensure a state exists, expanding num_states if needed.
    fn ensure_state(&mut self, state: StateId) {
        if state >= self.num_states {
            self.num_states = state + 1;
            // Invalidate cached epsilon closures
            self.epsilon_closures = None;
        }
    }

    fn insert_transition(&mut self, source: StateId, symbol: SymbolId, destination: StateId) {
        self.ensure_state(source);
        self.ensure_state(destination);

        self.transitions
            .entry((source, symbol))
            .or_default()
            .insert(destination);

        // Invalidate cached epsilon closures
        self.epsilon_closures = None;
    }

    /// Add a transition from source to destination on the given symbol.
    pub fn add_transition(&mut self, source: StateId, symbol: Symbol, destination: StateId) {
        let symbol = self.alphabet.intern(symbol);
        self.insert_transition(source, symbol, destination);
    }

    /// Add an epsilon transition from source to destination.
    pub fn add_epsilon_transition(&mut self, source: StateId, destination: StateId) {
        self.insert_transition(source, EPSILON, destination);
    }

    /// Set the start state.
    pub fn set_start_state(&mut self, state: StateId) {
        self.ensure_state(state);
        self.start_state = Some(state);
    }

    /// Add a final (accepting) state.
    pub fn add_final_state(&mut self, state: StateId) {
        self.ensure_state(state);
        self.final_states.insert(state);
    }

    /// Get the number of states.
    pub fn num_states(&self) -> StateId {
        self.num_states
    }

    /// Get the start state.
    pub fn start_state(&self) -> Option<StateId> {
        self.start_state
    }

    /// Get the final states.
    pub fn final_states(&self) -> &StateSet {
        &self.final_states
    }

    /// Get the alphabet (all symbols except epsilon).
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Destinations of `state` on `symbol`, epsilon included.
    pub fn destinations(&self, state: StateId, symbol: SymbolId) -> Option<&StateSet> {
        self.transitions.get(&(state, symbol))
    }

    /// Follow epsilon edges from every state in `seeds` with an explicit stack,
    /// never expanding a state twice.
    fn closure_from(&self, seeds: impl IntoIterator<Item = StateId>) -> StateSet {
        let mut closure = StateSet::with_capacity(self.num_states as usize);
        let mut stack: Vec<StateId> = seeds.into_iter().collect();

        while let Some(s) = stack.pop() {
            if !closure.insert(s) {
                continue;
            }

            // Follow epsilon transitions
            if let Some(destinations) = self.transitions.get(&(s, EPSILON)) {
                stack.extend(destinations.iter().filter(|&dest| !closure.contains(dest)));
            }
        }

        closure
    }

    /// Compute epsilon closures for all states (cached).
    pub fn compute_epsilon_closures(&mut self) {
        if self.epsilon_closures.is_some() {
            return;
        }

        let closures = (0..self.num_states)
            .map(|state| self.closure_from(iter::once(state)))
            .collect();
        self.epsilon_closures = Some(closures);
    }

    /// Get the epsilon closure of a set of states.
    pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        let Some(cached) = &self.epsilon_closures else {
            return self.closure_from(states.iter());
        };

        let mut closure = StateSet::with_capacity(self.num_states as usize);
        for state in states.iter() {
            match cached.get(state as usize) {
                Some(state_closure) => closure.union_with(state_closure),
                None => {
                    closure.insert(state);
                }
            }
        }
        closure
    }

    /// Get the states reachable from a set of states on a given symbol.
    /// Returns the epsilon closure of the reached states.
    pub fn move_on_symbol(&self, states: &StateSet, symbol: SymbolId) -> StateSet {
        debug_assert!(!is_epsilon(symbol), "Use epsilon_closure for epsilon moves");

        let mut reached = StateSet::with_capacity(self.num_states as usize);

        for state in states.iter() {
            if let Some(destinations) = self.transitions.get(&(state, symbol)) {
                reached.union_with(destinations);
            }
        }

        self.epsilon_closure(&reached)
    }

    /// Check whether the NFA accepts `input`, reading one character at a
    /// time through every alphabet symbol that matches it.
    pub fn accepts(&self, input: &str) -> bool {
        let Some(start) = self.start_state else {
            return false;
        };

        let start = StateSet::singleton(start, self.num_states as usize);
        let mut current = self.epsilon_closure(&start);
        for c in input.chars() {
            let mut next = StateSet::with_capacity(self.num_states as usize);
            for symbol in self.alphabet.matching(c) {
                next.union_with(&self.move_on_symbol(&current, symbol));
            }
            if next.is_empty() {
                return false;
            }
            current = next;
        }

        current.intersects(&self.final_states)
    }

    /// Check if the NFA accepts any string (i.e., if the language is non-empty).
    /// Uses BFS from the start state following all transitions.
    pub fn is_empty(&self) -> bool {
        let Some(start) = self.start_state else {
            return true;
        };

        let mut visited = StateSet::with_capacity(self.num_states as usize);
        let mut queue: VecDeque<StateId> = self
            .epsilon_closure(&StateSet::singleton(start, self.num_states as usize))
            .iter()
            .collect();

        while let Some(state) = queue.pop_front() {
            if !visited.insert(state) {
                continue;
            }

            // Check if we reached a final state
            if self.final_states.contains(state) {
                return false;
            }

            // Explore all transitions
            for symbol in self.alphabet.ids() {
                if let Some(destinations) = self.transitions.get(&(state, symbol)) {
                    let closure = self.epsilon_closure(destinations);
                    queue.extend(closure.iter().filter(|&dest| !visited.contains(dest)));
                }
            }
        }

        true
    }

    /// Get all transitions as an iterator, grouped by source state with
    /// symbols in alphabet order and epsilon last.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, SymbolId, StateId)> + '_ {
        self.to_transition_map()
            .into_iter()
            .flat_map(|(src, row)| {
                row.into_iter()
                    .flat_map(move |(sym, dests)| dests.into_iter().map(move |dst| (src, sym, dst)))
            })
    }

    /// Ordered map representation: every state, then its outgoing symbols.
    pub fn to_transition_map(&self) -> IndexMap<StateId, IndexMap<SymbolId, Vec<StateId>>> {
        let mut map: IndexMap<StateId, IndexMap<SymbolId, Vec<StateId>>> = IndexMap::new();

        for src in 0..self.num_states {
            let row = map.entry(src).or_default();
            for sym in self.alphabet.ids().chain(iter::once(EPSILON)) {
                if let Some(dests) = self.transitions.get(&(src, sym)) {
                    row.insert(sym, dests.to_vec());
                }
            }
        }

        map
    }

    /// Convert to a graph representation (edges with labels).
    /// Returns: (nodes, edges) where edges are (src, dst, label)
    pub fn to_graph(&self) -> (Vec<StateId>, Vec<GraphEdge>) {
        let nodes: Vec<StateId> = (0..self.num_states).collect();
        let edges = self
            .transitions()
            .map(|(src, sym, dst)| (src, dst, self.alphabet.label(sym)))
            .collect();
        (nodes, edges)
    }
}

impl Default for EpsilonNFA {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Symbol = Symbol::Literal('a');
    const B: Symbol = Symbol::Literal('b');

    #[test]
    fn test_epsilon_nfa_basic() {
        let mut nfa = EpsilonNFA::new();

        // Create a simple NFA: 0 -a-> 1 -ε-> 2 (final)
        nfa.add_transition(0, A, 1);
        nfa.add_epsilon_transition(1, 2);
        nfa.set_start_state(0);
        nfa.add_final_state(2);

        assert_eq!(nfa.num_states(), 3);
        assert_eq!(nfa.alphabet().len(), 1);
        assert!(!nfa.is_empty());
        assert!(nfa.accepts("a"));
        assert!(!nfa.accepts(""));
        assert!(!nfa.accepts("aa"));
    }

    #[test]
    fn test_epsilon_closure() {
        let mut nfa = EpsilonNFA::new();

        // 0 -ε-> 1 -ε-> 2
        nfa.add_epsilon_transition(0, 1);
        nfa.add_epsilon_transition(1, 2);
        nfa.set_start_state(0);

        let start = StateSet::singleton(0, 3);
        let closure = nfa.epsilon_closure(&start);
        assert_eq!(closure.to_vec(), vec![0, 1, 2]);

        nfa.compute_epsilon_closures();
        assert_eq!(nfa.epsilon_closure(&start), closure);
    }

    #[test]
    fn test_epsilon_closure_cycle() {
        let mut nfa = EpsilonNFA::new();

        // 0 -ε-> 1 -ε-> 2 -ε-> 0, 2 -ε-> 3
        nfa.add_epsilon_transition(0, 1);
        nfa.add_epsilon_transition(1, 2);
        nfa.add_epsilon_transition(2, 0);
        nfa.add_epsilon_transition(2, 3);

        let closure = nfa.epsilon_closure(&StateSet::singleton(1, 4));
        assert_eq!(closure.to_vec(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_epsilon_closure_long_chain() {
        let mut nfa = EpsilonNFA::new();
        for state in 0..100_000 {
            nfa.add_epsilon_transition(state, state + 1);
        }
        let closure = nfa.epsilon_closure(&StateSet::singleton(0, 1));
        assert_eq!(closure.len(), 100_001);
    }

    #[test]
    fn test_move_on_symbol() {
        let mut nfa = EpsilonNFA::new();

        // 0 -a-> 1, 0 -a-> 2, 1 -ε-> 3
        nfa.add_transition(0, A, 1);
        nfa.add_transition(0, A, 2);
        nfa.add_epsilon_transition(1, 3);

        let start = StateSet::singleton(0, 4);
        let reached = nfa.move_on_symbol(&start, 0);

        assert_eq!(reached.to_vec(), vec![1, 2, 3]); // 3 via epsilon from 1
        assert!(nfa.move_on_symbol(&reached, 0).is_empty());
    }

    #[test]
    fn test_empty_nfa() {
        let mut nfa = EpsilonNFA::new();
        nfa.set_start_state(0);
        nfa.add_final_state(1);
        // No transitions - NFA is empty (no path from 0 to 1)
        assert!(nfa.is_empty());

        // Add transition
        nfa.add_transition(0, A, 1);
        assert!(!nfa.is_empty());
    }

    #[test]
    fn test_transition_map_order() {
        let mut nfa = EpsilonNFA::new();
        nfa.add_epsilon_transition(0, 2);
        nfa.add_transition(0, B, 1);
        nfa.add_transition(0, A, 1);
        nfa.add_transition(2, A, 3);

        let map = nfa.to_transition_map();
        let row: Vec<_> = map[&0].keys().copied().collect();
        assert_eq!(row, vec![0, 1, EPSILON]);
        assert!(map[&1].is_empty());

        let (nodes, edges) = nfa.to_graph();
        assert_eq!(nodes.len(), 4);
        assert_eq!(edges[0], (0, 1, "b".to_string()));
        assert_eq!(edges[2], (0, 2, "EPSILON".to_string()));
    }
}
