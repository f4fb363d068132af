//! Deterministic Finite Automaton (DFA) implementation with partition
//! refinement minimization.

use crate::automaton::epsilon_nfa::GraphEdge;
use crate::automaton::state::{StateId, StateSet};
use crate::automaton::symbol::{Alphabet, Symbol, SymbolId};
use log::{debug, trace};
use std::collections::{HashMap, VecDeque};

/// Name of the dead state in automaton files.
pub const PHI: &str = "PHI";

/// A Deterministic Finite Automaton.
///
/// DFAs produced by [`subset_construction`](crate::automaton::subset_construction)
/// and [`DFA::minimize`] are total: every state has exactly one transition per
/// alphabet symbol, with missing moves routed to the dead state `PHI`.
#[derive(Debug, Clone)]
pub struct DFA {
    /// Number of states, the dead state included
    num_states: StateId,
    /// Start state (None if empty)
    start_state: Option<StateId>,
    /// Final (accepting) states
    final_states: StateSet,
    /// The dead state, allocated on first use
    dead_state: Option<StateId>,
    /// Transitions: (source, symbol) -> destination
    transitions: HashMap<(StateId, SymbolId), StateId>,
    /// All symbols, in the order of the automaton this one was built from
    alphabet: Alphabet,
    /// Mapping from DFA states to original NFA states (if created via subset construction)
    state_mapping: Option<Vec<StateSet>>,
    /// Number used when naming each state `S<n>`
    labels: Vec<StateId>,
}

impl DFA {
    /// Create a new empty DFA.
    pub fn new() -> Self {
        Self::with_alphabet(Alphabet::new())
    }

    /// Create a new empty DFA over `alphabet`.
    pub fn with_alphabet(alphabet: Alphabet) -> Self {
        Self {
            num_states: 0,
            start_state: None,
            final_states: StateSet::with_capacity(16),
            dead_state: None,
            transitions: HashMap::new(),
            alphabet,
            state_mapping: None,
            labels: Vec::new(),
        }
    }

    /// Add a new state and return its ID.
    pub fn add_state(&mut self) -> StateId {
        let id = self.num_states;
        self.num_states += 1;
        self.labels.push(id);
        id
    }

    /// Return the dead state, creating it with a self-loop on every symbol if
    /// this DFA has none yet.
    pub fn dead_state(&mut self) -> StateId {
        if let Some(dead) = self.dead_state {
            return dead;
        }
        let dead = self.add_state();
        self.dead_state = Some(dead);
        for symbol in self.alphabet.ids() {
            self.add_transition(dead, symbol, dead);
        }
        dead
    }

    /// The dead state, if one has been created.
    pub fn dead(&self) -> Option<StateId> {
        self.dead_state
    }

    /// Intern `symbol` into the alphabet. The dead state, if any, loops on it.
    pub fn add_symbol(&mut self, symbol: Symbol) -> SymbolId {
        let id = self.alphabet.intern(symbol);
        if let Some(dead) = self.dead_state {
            self.add_transition(dead, id, dead);
        }
        id
    }

    /// Set the start state.
    pub fn set_start_state(&mut self, state: StateId) {
        self.start_state = Some(state);
    }

    /// Add a final (accepting) state.
    pub fn add_final_state(&mut self, state: StateId) {
        self.final_states.insert(state);
    }

    /// Add a transition, replacing any previous one for `(source, symbol)`.
    pub fn add_transition(&mut self, source: StateId, symbol: SymbolId, destination: StateId) {
        self.transitions.insert((source, symbol), destination);
    }

    /// Get the transition from a state on a symbol.
    pub fn transition(&self, source: StateId, symbol: SymbolId) -> Option<StateId> {
        self.transitions.get(&(source, symbol)).copied()
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

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.final_states.contains(state)
    }

    /// Get the alphabet.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Set the state mapping from original NFA states.
    pub fn set_state_mapping(&mut self, mapping: Vec<StateSet>) {
        self.state_mapping = Some(mapping);
    }

    /// Get the NFA states behind each DFA state, indexed by DFA state.
    pub fn state_mapping(&self) -> Option<&[StateSet]> {
        self.state_mapping.as_deref()
    }

    /// Name of `state` in automaton files: `PHI` for the dead state, else
    /// `S<n>`. Minimized states are named after the first member of their
    /// equivalence class.
    pub fn state_name(&self, state: StateId) -> String {
        if self.dead_state == Some(state) {
            return PHI.to_string();
        }
        let label = self.labels.get(state as usize).copied().unwrap_or(state);
        format!("S{label}")
    }

    pub(crate) fn set_label(&mut self, state: StateId, label: StateId) {
        if let Some(slot) = self.labels.get_mut(state as usize) {
            *slot = label;
        }
    }

    /// Whether every state has exactly one transition per alphabet symbol.
    pub fn is_total(&self) -> bool {
        (0..self.num_states).all(|state| {
            self.alphabet
                .ids()
                .all(|symbol| self.transition(state, symbol).is_some())
        })
    }

    /// Follow one transition. `None` only for partial, hand-built DFAs.
    pub fn step(&self, state: StateId, symbol: SymbolId) -> Option<StateId> {
        self.transition(state, symbol)
    }

    /// Run a sequence of symbol ids from the start state, returning the
    /// state reached.
    pub fn run(&self, symbols: impl IntoIterator<Item = SymbolId>) -> Option<StateId> {
        symbols
            .into_iter()
            .try_fold(self.start_state?, |state, symbol| self.step(state, symbol))
    }

    /// Check whether the DFA accepts `input`.
    ///
    /// The DFA is deterministic over its symbols, not over characters: when a
    /// character matches several symbols (a literal inside a range that is
    /// also in the alphabet), every matching transition is followed.
    pub fn accepts(&self, input: &str) -> bool {
        let Some(start) = self.start_state else {
            return false;
        };

        let mut current = StateSet::singleton(start, self.num_states as usize);
        for c in input.chars() {
            let mut next = StateSet::with_capacity(self.num_states as usize);
            for state in current.iter() {
                for symbol in self.alphabet.matching(c) {
                    if let Some(dest) = self.transition(state, symbol) {
                        next.insert(dest);
                    }
                }
            }
            if let Some(dead) = self.dead_state {
                next.remove(dead);
            }
            if next.is_empty() {
                return false;
            }
            current = next;
        }

        current.intersects(&self.final_states)
    }

    /// Check if the DFA is empty (accepts no strings).
    pub fn is_empty(&self) -> bool {
        !self.find_reachable_states().intersects(&self.final_states)
    }

    /// Get all transitions as an iterator, by state then alphabet order.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, SymbolId, StateId)> + '_ {
        (0..self.num_states).flat_map(move |src| {
            self.alphabet
                .ids()
                .filter_map(move |sym| self.transition(src, sym).map(|dst| (src, sym, dst)))
        })
    }

    /// Minimize the DFA by partition refinement.
    /// Returns a new minimized DFA.
    ///
    /// States unreachable from the start are dropped first. The dead state is
    /// kept out of the partition and maps to the dead state of the result.
    pub fn minimize(&self) -> DFA {
        if self.start_state.is_none() || self.num_states == 0 {
            return DFA::with_alphabet(self.alphabet.clone());
        }

        let mut live = self.find_reachable_states();
        if let Some(dead) = self.dead_state {
            live.remove(dead);
        }

        // Initial partition: non-final states and final states
        let mut partitions: Vec<StateSet> = [
            live.difference(&self.final_states),
            live.intersection(&self.final_states),
        ]
        .into_iter()
        .filter(|class| !class.is_empty())
        .collect();

        let mut rounds = 0usize;
        loop {
            let refined = self.refine(&partitions);
            rounds += 1;
            trace!("refinement round {rounds}: {} classes", refined.len());
            if same_partition(&partitions, &refined) {
                break;
            }
            partitions = refined;
        }

        let minimized = self.build_minimized_dfa(&partitions);
        debug!(
            "minimized {} states into {} after {rounds} rounds",
            self.num_states,
            minimized.num_states
        );
        minimized
    }

    /// For each state, the index of its class in `partitions`.
    fn class_index(&self, partitions: &[StateSet]) -> Vec<Option<usize>> {
        let mut index = vec![None; self.num_states as usize];
        for (class, members) in partitions.iter().enumerate() {
            for state in members.iter() {
                index[state as usize] = Some(class);
            }
        }
        index
    }

    /// One refinement step.
    ///
    /// Each class is rescanned in state order. A state joins the first group
    /// split from the same class whose representative agrees with it on the
    /// class of every destination, and otherwise opens a new group.
    fn refine(&self, partitions: &[StateSet]) -> Vec<StateSet> {
        let class_of = self.class_index(partitions);
        let destination_class = |state: StateId, symbol: SymbolId| {
            self.transition(state, symbol)
                .and_then(|dest| class_of.get(dest as usize).copied().flatten())
        };
        let equivalent = |a: StateId, b: StateId| {
            self.alphabet
                .ids()
                .all(|symbol| destination_class(a, symbol) == destination_class(b, symbol))
        };

        let mut refined = Vec::with_capacity(partitions.len());
        for class in partitions {
            if class.len() == 1 {
                refined.push(class.clone());
                continue;
            }

            let first_group = refined.len();
            for state in class.iter() {
                let group = refined[first_group..]
                    .iter_mut()
                    .find(|group: &&mut StateSet| {
                        group.first().is_some_and(|rep| equivalent(rep, state))
                    });
                match group {
                    Some(group) => {
                        group.insert(state);
                    }
                    None => refined.push(StateSet::singleton(state, self.num_states as usize)),
                }
            }
        }

        refined
    }

    /// Find all states reachable from the start state.
    fn find_reachable_states(&self) -> StateSet {
        let mut reachable = StateSet::with_capacity(self.num_states as usize);

        let Some(start) = self.start_state else {
            return reachable;
        };

        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(state) = queue.pop_front() {
            if !reachable.insert(state) {
                continue;
            }

            for symbol in self.alphabet.ids() {
                if let Some(next) = self.transition(state, symbol) {
                    if !reachable.contains(next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        reachable
    }

    /// Build a minimized DFA from partitions.
    ///
    /// Class `i` becomes state `i`. Every original state is mapped through its
    /// class; a class's row is emitted from its first member and later
    /// members only contribute their accepting flag.
    fn build_minimized_dfa(&self, partitions: &[StateSet]) -> DFA {
        let mut minimized = DFA::with_alphabet(self.alphabet.clone());
        let class_of = self.class_index(partitions);

        // Create states in minimized DFA
        for class in partitions {
            let state = minimized.add_state();
            if let Some(representative) = class.first() {
                minimized.set_label(state, self.labels[representative as usize]);
            }
        }

        // Set start state
        if let Some(start) = self.start_state {
            match class_of[start as usize] {
                Some(class) => minimized.set_start_state(class as StateId),
                None => {
                    let dead = minimized.dead_state();
                    minimized.set_start_state(dead);
                }
            }
        }

        let mut emitted = vec![false; partitions.len()];
        for state in 0..self.num_states {
            let Some(class) = class_of[state as usize] else {
                continue;
            };
            if self.final_states.contains(state) {
                minimized.add_final_state(class as StateId);
            }
            if std::mem::replace(&mut emitted[class], true) {
                continue;
            }
            for symbol in self.alphabet.ids() {
                let destination = match self
                    .transition(state, symbol)
                    .and_then(|dest| class_of[dest as usize])
                {
                    Some(dest_class) => dest_class as StateId,
                    None => minimized.dead_state(),
                };
                minimized.add_transition(class as StateId, symbol, destination);
            }
        }

        // Build state mapping from minimized states to original NFA states
        if let Some(orig_mapping) = &self.state_mapping {
            let mut new_mapping = vec![StateSet::default(); minimized.num_states as usize];
            for (class, partition) in partitions.iter().enumerate() {
                for old_dfa_state in partition.iter() {
                    if let Some(states) = orig_mapping.get(old_dfa_state as usize) {
                        new_mapping[class].union_with(states);
                    }
                }
            }
            minimized.state_mapping = Some(new_mapping);
        }

        minimized
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

impl Default for DFA {
    fn default() -> Self {
        Self::new()
    }
}

/// Partitions compared as sets of sets, ignoring class order.
fn same_partition(a: &[StateSet], b: &[StateSet]) -> bool {
    a.len() == b.len() && a.iter().all(|class| b.contains(class))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A DFA over {a, b} with a dead state, states 0..n, and the given rows.
    fn build(rows: &[(StateId, StateId)], finals: &[StateId]) -> DFA {
        let mut dfa = DFA::new();
        let a = dfa.add_symbol(Symbol::Literal('a'));
        let b = dfa.add_symbol(Symbol::Literal('b'));
        for _ in rows {
            dfa.add_state();
        }
        dfa.set_start_state(0);
        for (state, &(on_a, on_b)) in rows.iter().enumerate() {
            dfa.add_transition(state as StateId, a, on_a);
            dfa.add_transition(state as StateId, b, on_b);
        }
        for &state in finals {
            dfa.add_final_state(state);
        }
        dfa
    }

    #[test]
    fn test_dfa_basic() {
        let mut dfa = DFA::new();
        let a = dfa.add_symbol(Symbol::Literal('a'));
        let b = dfa.add_symbol(Symbol::Literal('b'));
        let s0 = dfa.add_state();
        let s1 = dfa.add_state();
        let s2 = dfa.add_state();

        dfa.set_start_state(s0);
        dfa.add_final_state(s2);
        dfa.add_transition(s0, a, s1);
        dfa.add_transition(s1, b, s2);

        assert_eq!(dfa.num_states(), 3);
        assert_eq!(dfa.start_state(), Some(0));
        assert!(!dfa.is_empty());
        assert!(!dfa.is_total());
        assert_eq!(dfa.run([a, b]), Some(s2));
        assert_eq!(dfa.run([b]), None);
        assert!(dfa.accepts("ab"));
        assert!(!dfa.accepts("a"));
    }

    #[test]
    fn test_dead_state() {
        let mut dfa = DFA::new();
        let a = dfa.add_symbol(Symbol::Literal('a'));
        let s0 = dfa.add_state();
        let dead = dfa.dead_state();
        assert_eq!(dfa.dead_state(), dead);
        assert_eq!(dfa.transition(dead, a), Some(dead));

        let b = dfa.add_symbol(Symbol::Literal('b'));
        assert_eq!(dfa.transition(dead, b), Some(dead));
        assert_eq!(dfa.state_name(dead), PHI);
        assert_eq!(dfa.state_name(s0), "S0");
    }

    #[test]
    fn test_dfa_minimization() {
        // 0 -a-> 1, 0 -b-> 2, 1 -a,b-> 3(final), 2 -a,b-> 4(final), 3,4 -a,b-> 3
        // 1 and 2 merge, as do 3 and 4.
        let dfa = build(&[(1, 2), (3, 3), (4, 4), (3, 3), (3, 3)], &[3, 4]);

        let minimized = dfa.minimize();

        assert_eq!(minimized.num_states(), 3);
        assert!(minimized.is_total());
        assert_eq!(minimized.final_states().len(), 1);
        for input in ["aa", "ab", "ba", "bbb", "abab"] {
            assert_eq!(minimized.accepts(input), dfa.accepts(input), "{input}");
        }
        assert!(!minimized.accepts("a"));
        assert_eq!(minimized.state_name(1), "S1");
        assert_eq!(minimized.state_name(2), "S3");
    }

    #[test]
    fn test_minimization_needs_several_rounds() {
        // Accepts strings ending in "ab"; 4 is a duplicate of 0.
        // 0 -a-> 1, 0 -b-> 4; 1 -a-> 1, 1 -b-> 2; 2 -a-> 1, 2 -b-> 0;
        // 4 -a-> 1, 4 -b-> 0; 3 is unreachable.
        let dfa = build(&[(1, 4), (1, 2), (1, 0), (3, 3), (1, 0)], &[2]);

        let minimized = dfa.minimize();
        assert_eq!(minimized.num_states(), 3);
        assert!(minimized.accepts("ab"));
        assert!(minimized.accepts("bbaab"));
        assert!(!minimized.accepts("aba"));
        assert_eq!(minimized.minimize().num_states(), 3);
    }

    #[test]
    fn test_minimization_keeps_dead_state_apart() {
        let mut dfa = DFA::new();
        let a = dfa.add_symbol(Symbol::Literal('a'));
        let s0 = dfa.add_state();
        let s1 = dfa.add_state();
        let dead = dfa.dead_state();
        dfa.set_start_state(s0);
        dfa.add_final_state(s1);
        dfa.add_transition(s0, a, s1);
        dfa.add_transition(s1, a, dead);

        let minimized = dfa.minimize();
        assert_eq!(minimized.num_states(), 3);
        let min_dead = minimized.dead().unwrap();
        assert_eq!(minimized.run([a, a]), Some(min_dead));
        assert_eq!(minimized.run([a, a, a, a]), Some(min_dead));
        assert!(!minimized.is_accepting(min_dead));
    }

    #[test]
    fn test_empty_dfa() {
        let dfa = DFA::new();
        assert!(dfa.is_empty());
        assert_eq!(dfa.minimize().num_states(), 0);

        let mut dfa2 = DFA::new();
        dfa2.add_state();
        dfa2.set_start_state(0);
        // No final states - should be empty
        assert!(dfa2.is_empty());
        assert!(dfa2.minimize().is_empty());
    }

    #[test]
    fn test_same_partition_ignores_order() {
        let x: StateSet = [0, 2].into_iter().collect();
        let y: StateSet = [1].into_iter().collect();
        assert!(same_partition(&[x.clone(), y.clone()], &[y.clone(), x.clone()]));
        assert!(!same_partition(&[x.clone(), y], &[x]));
    }
}
