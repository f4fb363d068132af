//! Finite automata built from regexes.
//!
//! This module provides epsilon-NFA and DFA implementations with:
//! - Thompson's construction (postfix regex to ε-NFA)
//! - Epsilon closure computation
//! - Subset construction (NFA to DFA conversion)
//! - Partition refinement DFA minimization
//! - PyO3 bindings for Python interoperability (feature `python`)

mod dfa;
mod epsilon_nfa;
#[cfg(feature = "python")]
mod python_bindings;
mod state;
mod subset_construction;
mod symbol;
mod thompson;

pub use dfa::{DFA, PHI};
pub use epsilon_nfa::{EpsilonNFA, GraphEdge};
#[cfg(feature = "python")]
pub use python_bindings::automaton;
pub use state::{StateId, StateSet};
pub use subset_construction::subset_construction;
pub use symbol::{Alphabet, EPSILON, EPSILON_LABEL, Symbol, SymbolId, is_epsilon, is_literal};
pub use thompson::thompson_construction;
