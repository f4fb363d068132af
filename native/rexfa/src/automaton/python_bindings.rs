//! PyO3 bindings for the automaton module.
//!
//! Exposes the compile pipeline and the automata it produces to Python.

use crate::automaton::dfa::DFA;
use crate::automaton::epsilon_nfa::{EpsilonNFA as RustEpsilonNFA, GraphEdge};
use crate::automaton::state::{StateId, StateSet};
use crate::automaton::subset_construction::subset_construction;
use crate::error::Error;
use crate::schema;
use pyo3::exceptions::{PyOSError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PySet};

impl From<Error> for PyErr {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(err) => PyOSError::new_err(err.to_string()),
            other => PyValueError::new_err(other.to_string()),
        }
    }
}

fn state_set<'py>(py: Python<'py>, states: &StateSet) -> PyResult<Bound<'py, PySet>> {
    let set = PySet::empty(py)?;
    for state in states.iter() {
        set.add(state)?;
    }
    Ok(set)
}

fn networkx<'py>(
    py: Python<'py>,
    (nodes, edges): (Vec<StateId>, Vec<GraphEdge>),
) -> PyResult<Bound<'py, PyAny>> {
    let nx = py.import("networkx")?;
    let graph = nx.call_method0("MultiDiGraph")?;

    for state in nodes {
        graph.call_method1("add_node", (state,))?;
    }
    for (src, dst, label) in edges {
        let kwargs = PyDict::new(py);
        kwargs.set_item("label", label)?;
        graph.call_method("add_edge", (src, dst), Some(&kwargs))?;
    }

    Ok(graph)
}

/// An Epsilon Non-deterministic Finite Automaton.
#[pyclass(name = "EpsilonNFA", module = "rexfa.automaton")]
pub struct PyEpsilonNFA {
    nfa: RustEpsilonNFA,
}

#[pymethods]
impl PyEpsilonNFA {
    /// Load an NFA from its JSON form.
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        let mut nfa = schema::nfa_from_json(json)?;
        nfa.compute_epsilon_closures();
        Ok(Self { nfa })
    }

    #[getter]
    fn start_state(&self) -> Option<StateId> {
        self.nfa.start_state()
    }

    #[getter]
    fn final_states<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PySet>> {
        state_set(py, self.nfa.final_states())
    }

    #[getter]
    fn num_states(&self) -> StateId {
        self.nfa.num_states()
    }

    fn accepts(&self, input: &str) -> bool {
        self.nfa.accepts(input)
    }

    /// Check if the NFA's language is empty.
    fn is_empty(&self) -> bool {
        self.nfa.is_empty()
    }

    /// Determinize without minimizing.
    fn to_dfa(&self) -> PyDFA {
        PyDFA {
            dfa: subset_construction(&self.nfa),
        }
    }

    /// Determinize and minimize.
    fn minimize(&self) -> PyDFA {
        PyDFA {
            dfa: subset_construction(&self.nfa).minimize(),
        }
    }

    fn to_json(&self) -> PyResult<String> {
        Ok(schema::nfa_to_json(&self.nfa)?)
    }

    /// Convert to a NetworkX MultiDiGraph.
    fn to_networkx<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        networkx(py, self.nfa.to_graph())
    }
}

/// A Deterministic Finite Automaton.
#[pyclass(name = "DeterministicFiniteAutomaton", module = "rexfa.automaton")]
pub struct PyDFA {
    dfa: DFA,
}

#[pymethods]
impl PyDFA {
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        Ok(Self {
            dfa: schema::dfa_from_json(json)?,
        })
    }

    /// Get the start state as an integer index.
    #[getter]
    fn start_state(&self) -> Option<StateId> {
        self.dfa.start_state()
    }

    /// Get the final states as a set of integer indices.
    #[getter]
    fn final_states<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PySet>> {
        state_set(py, self.dfa.final_states())
    }

    #[getter]
    fn num_states(&self) -> StateId {
        self.dfa.num_states()
    }

    fn accepts(&self, input: &str) -> bool {
        self.dfa.accepts(input)
    }

    /// Check if the DFA's language is empty.
    fn is_empty(&self) -> bool {
        self.dfa.is_empty()
    }

    /// Minimize the DFA (returns a new minimized DFA).
    fn minimize(&self) -> PyDFA {
        PyDFA {
            dfa: self.dfa.minimize(),
        }
    }

    fn to_json(&self) -> PyResult<String> {
        Ok(schema::dfa_to_json(&self.dfa)?)
    }

    /// Convert to a NetworkX MultiDiGraph.
    fn to_networkx<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        networkx(py, self.dfa.to_graph())
    }
}

/// Compile `regex`, returning `(nfa, dfa, minimized)`.
#[pyfunction]
fn compile(regex: &str) -> PyResult<(PyEpsilonNFA, PyDFA, PyDFA)> {
    let compiled = crate::compile(regex).map_err(Error::from)?;
    Ok((
        PyEpsilonNFA { nfa: compiled.nfa },
        PyDFA { dfa: compiled.dfa },
        PyDFA {
            dfa: compiled.minimized,
        },
    ))
}

/// Register the automaton submodule.
pub fn automaton(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyEpsilonNFA>()?;
    m.add_class::<PyDFA>()?;
    m.add_function(wrap_pyfunction!(compile, m)?)?;
    Ok(())
}
