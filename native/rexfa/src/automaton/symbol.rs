//! Symbol types for automata transitions.

use indexmap::IndexSet;
use std::fmt;
use std::ops::Range;

/// A symbol identifier represented as a u32, indexing into an [`Alphabet`].
/// The special value `EPSILON` represents an epsilon (empty) transition.
pub type SymbolId = u32;

/// Special symbol ID representing epsilon (empty) transitions.
/// We use u32::MAX as the epsilon marker.
pub const EPSILON: SymbolId = u32::MAX;

/// Label written for epsilon transitions in automaton files.
pub const EPSILON_LABEL: &str = "EPSILON";

/// Check if a symbol is an epsilon transition.
#[inline]
pub fn is_epsilon(symbol: SymbolId) -> bool {
    symbol == EPSILON
}

/// Characters usable as literal symbols, both on their own and inside a class.
const LITERALS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789/=_&^%$!{}`,~<>?'\":";

/// Whether `c` may appear as a literal symbol in a regex.
#[inline]
pub fn is_literal(c: char) -> bool {
    LITERALS.contains(c)
}

/// An alphabet symbol: a single literal character or a resolved class range.
///
/// Ranges stay atomic: `[a-c]` is one symbol, distinct from `a`, `b` and `c`,
/// even though it matches the same characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Literal(char),
    Range(char, char),
}

impl Symbol {
    /// Whether reading `c` may take a transition labelled with this symbol.
    pub fn matches(self, c: char) -> bool {
        match self {
            Symbol::Literal(l) => l == c,
            Symbol::Range(lo, hi) => (lo..=hi).contains(&c),
        }
    }

    /// Parse a transition label as written by [`fmt::Display`].
    pub fn parse(label: &str) -> Option<Self> {
        let mut chars = label.chars();
        match (chars.next(), chars.next(), chars.next(), chars.next(), chars.next()) {
            (Some(c), None, ..) => Some(Symbol::Literal(c)),
            (Some('['), Some(lo), Some('-'), Some(hi), Some(']'))
                if chars.next().is_none() && lo <= hi =>
            {
                Some(Symbol::Range(lo, hi))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Literal(c) => write!(f, "{c}"),
            Symbol::Range(lo, hi) => write!(f, "[{lo}-{hi}]"),
        }
    }
}

/// Interns symbols in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alphabet {
    symbols: IndexSet<Symbol>,
}

impl Alphabet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id of `symbol`, interning it if unseen.
    pub fn intern(&mut self, symbol: Symbol) -> SymbolId {
        let (index, _) = self.symbols.insert_full(symbol);
        index as SymbolId
    }

    pub fn id(&self, symbol: &Symbol) -> Option<SymbolId> {
        self.symbols.get_index_of(symbol).map(|i| i as SymbolId)
    }

    pub fn symbol(&self, id: SymbolId) -> Option<Symbol> {
        if is_epsilon(id) {
            return None;
        }
        self.symbols.get_index(id as usize).copied()
    }

    /// Label of a transition symbol, `EPSILON` included.
    pub fn label(&self, id: SymbolId) -> String {
        match self.symbol(id) {
            Some(symbol) => symbol.to_string(),
            None if is_epsilon(id) => EPSILON_LABEL.to_string(),
            None => format!("#{id}"),
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol ids in interning order.
    pub fn ids(&self) -> Range<SymbolId> {
        0..self.symbols.len() as SymbolId
    }

    /// Ids of every symbol that matches `c`.
    pub fn matching(&self, c: char) -> impl Iterator<Item = SymbolId> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .filter(move |(_, symbol)| symbol.matches(c))
            .map(|(i, _)| i as SymbolId)
    }
}
