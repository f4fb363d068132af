//! Automaton files.
//!
//! An automaton is a JSON object with a `startingState` field naming the start
//! state and one record per state:
//!
//! ```json
//! {
//!   "startingState": "S0",
//!   "S0": { "isTerminatingState": false, "a": "S1", "b": "PHI" },
//!   "S1": { "isTerminatingState": true, "a": "PHI", "b": "PHI" }
//! }
//! ```
//!
//! NFA records map each symbol (or `EPSILON`) to a list of destinations; DFA
//! records map each symbol to exactly one destination. `PHI` names the DFA dead
//! state and is only ever written as a destination.

use crate::automaton::{DFA, EPSILON_LABEL, EpsilonNFA, PHI, StateId, Symbol};
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Top-level shape shared by NFA and DFA files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonFile<T> {
    #[serde(rename = "startingState")]
    pub starting_state: String,
    #[serde(flatten)]
    pub states: IndexMap<String, StateRecord<T>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateRecord<T> {
    #[serde(rename = "isTerminatingState")]
    pub is_terminating_state: bool,
    #[serde(flatten)]
    pub transitions: IndexMap<String, T>,
}

pub type NfaFile = AutomatonFile<Vec<String>>;
pub type DfaFile = AutomatonFile<String>;

fn nfa_state_name(state: StateId) -> String {
    format!("S{state}")
}

/// `n` for a name written exactly as `S<n>`; `S01` and `S+1` do not count.
fn canonical_label(name: &str) -> Option<StateId> {
    let label: StateId = name.strip_prefix('S')?.parse().ok()?;
    (nfa_state_name(label) == name).then_some(label)
}

fn parse_label(label: &str) -> Result<Option<Symbol>> {
    if label == EPSILON_LABEL {
        return Ok(None);
    }
    Symbol::parse(label)
        .map(Some)
        .ok_or_else(|| Error::BadSymbol(label.to_string()))
}

impl From<&EpsilonNFA> for NfaFile {
    fn from(nfa: &EpsilonNFA) -> Self {
        let states = nfa
            .to_transition_map()
            .into_iter()
            .map(|(state, row)| {
                let transitions = row
                    .into_iter()
                    .map(|(symbol, dests)| {
                        let dests = dests.into_iter().map(nfa_state_name).collect();
                        (nfa.alphabet().label(symbol), dests)
                    })
                    .collect();
                let record = StateRecord {
                    is_terminating_state: nfa.final_states().contains(state),
                    transitions,
                };
                (nfa_state_name(state), record)
            })
            .collect();

        Self {
            starting_state: nfa.start_state().map(nfa_state_name).unwrap_or_default(),
            states,
        }
    }
}

impl TryFrom<&NfaFile> for EpsilonNFA {
    type Error = Error;

    /// States are numbered in record order; names need not be `S<n>`.
    fn try_from(file: &NfaFile) -> Result<Self> {
        let ids: IndexMap<&str, StateId> = file
            .states
            .keys()
            .enumerate()
            .map(|(id, name)| (name.as_str(), id as StateId))
            .collect();
        let lookup = |name: &str| {
            ids.get(name)
                .copied()
                .ok_or_else(|| Error::UnknownState(name.to_string()))
        };

        let mut nfa = EpsilonNFA::new();
        for _ in 0..ids.len() {
            nfa.add_state();
        }

        for (name, record) in &file.states {
            let source = lookup(name)?;
            if record.is_terminating_state {
                nfa.add_final_state(source);
            }
            for (label, dests) in &record.transitions {
                let symbol = parse_label(label)?;
                for dest in dests {
                    let dest = lookup(dest)?;
                    match symbol {
                        Some(symbol) => nfa.add_transition(source, symbol, dest),
                        None => nfa.add_epsilon_transition(source, dest),
                    }
                }
            }
        }

        let start = ids
            .get(file.starting_state.as_str())
            .copied()
            .ok_or_else(|| Error::MissingStart(file.starting_state.clone()))?;
        nfa.set_start_state(start);
        Ok(nfa)
    }
}

impl From<&DFA> for DfaFile {
    fn from(dfa: &DFA) -> Self {
        let states = (0..dfa.num_states())
            .filter(|&state| dfa.dead() != Some(state))
            .map(|state| {
                let transitions = dfa
                    .alphabet()
                    .ids()
                    .filter_map(|symbol| {
                        let dest = dfa.transition(state, symbol)?;
                        Some((dfa.alphabet().label(symbol), dfa.state_name(dest)))
                    })
                    .collect();
                let record = StateRecord {
                    is_terminating_state: dfa.is_accepting(state),
                    transitions,
                };
                (dfa.state_name(state), record)
            })
            .collect();

        Self {
            starting_state: dfa
                .start_state()
                .map(|start| dfa.state_name(start))
                .unwrap_or_default(),
            states,
        }
    }
}

impl TryFrom<&DfaFile> for DFA {
    type Error = Error;

    /// Every record must have a transition for every symbol used anywhere in
    /// the file. A `PHI` record, if present, is ignored.
    fn try_from(file: &DfaFile) -> Result<Self> {
        let records: Vec<(&String, &StateRecord<String>)> =
            file.states.iter().filter(|(name, _)| *name != PHI).collect();

        let mut dfa = DFA::new();
        for (_, record) in &records {
            for label in record.transitions.keys() {
                let symbol = parse_label(label)?.ok_or_else(|| Error::BadSymbol(label.clone()))?;
                dfa.add_symbol(symbol);
            }
        }

        // Names already of the form `S<n>` keep `n`; every other state gets
        // the smallest label no record claims, so written names stay unique.
        let labels: Vec<Option<StateId>> = records
            .iter()
            .map(|(name, _)| canonical_label(name))
            .collect();
        let taken: HashSet<StateId> = labels.iter().flatten().copied().collect();
        let mut fresh = (0..).filter(|label| !taken.contains(label));

        let mut ids: IndexMap<&str, StateId> = IndexMap::new();
        for ((name, _), label) in records.iter().zip(labels) {
            let id = dfa.add_state();
            let label = match label {
                Some(label) => label,
                None => fresh.next().unwrap_or(id),
            };
            dfa.set_label(id, label);
            ids.insert(name.as_str(), id);
        }
        let resolve = |dfa: &mut DFA, name: &str| -> Result<StateId> {
            if name == PHI {
                return Ok(dfa.dead_state());
            }
            ids.get(name)
                .copied()
                .ok_or_else(|| Error::UnknownState(name.to_string()))
        };

        for (name, record) in &records {
            let source = resolve(&mut dfa, name)?;
            if record.is_terminating_state {
                dfa.add_final_state(source);
            }
            for symbol in dfa.alphabet().ids() {
                let label = dfa.alphabet().label(symbol);
                let dest = record
                    .transitions
                    .get(&label)
                    .ok_or_else(|| Error::MissingTransition {
                        state: name.to_string(),
                        symbol: label.clone(),
                    })?;
                let dest = resolve(&mut dfa, dest)?;
                dfa.add_transition(source, symbol, dest);
            }
        }

        let start = match file.starting_state.as_str() {
            PHI => dfa.dead_state(),
            name => ids
                .get(name)
                .copied()
                .ok_or_else(|| Error::MissingStart(name.to_string()))?,
        };
        dfa.set_start_state(start);
        Ok(dfa)
    }
}

fn to_json<T: Serialize>(file: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(file)?)
}

fn from_json<T: DeserializeOwned>(json: &str) -> Result<T> {
    Ok(serde_json::from_str(json)?)
}

pub fn nfa_to_json(nfa: &EpsilonNFA) -> Result<String> {
    to_json(&NfaFile::from(nfa))
}

pub fn nfa_from_json(json: &str) -> Result<EpsilonNFA> {
    EpsilonNFA::try_from(&from_json::<NfaFile>(json)?)
}

pub fn dfa_to_json(dfa: &DFA) -> Result<String> {
    to_json(&DfaFile::from(dfa))
}

pub fn dfa_from_json(json: &str) -> Result<DFA> {
    DFA::try_from(&from_json::<DfaFile>(json)?)
}

pub fn read_nfa(path: impl AsRef<Path>) -> Result<EpsilonNFA> {
    nfa_from_json(&fs::read_to_string(path)?)
}

pub fn write_nfa(path: impl AsRef<Path>, nfa: &EpsilonNFA) -> Result<()> {
    Ok(fs::write(path, nfa_to_json(nfa)?)?)
}

pub fn read_dfa(path: impl AsRef<Path>) -> Result<DFA> {
    dfa_from_json(&fs::read_to_string(path)?)
}

pub fn write_dfa(path: impl AsRef<Path>, dfa: &DFA) -> Result<()> {
    Ok(fs::write(path, dfa_to_json(dfa)?)?)
}
