//! Compile regular expressions into finite automata.
//!
//! The pipeline runs strictly left to right:
//!
//! 1. [`regex::parse`] validates the pattern, resolves character classes,
//!    makes concatenation explicit and converts to postfix.
//! 2. [`automaton::thompson_construction`] builds an ε-NFA.
//! 3. [`automaton::subset_construction`] determinizes it into a total DFA.
//! 4. [`automaton::DFA::minimize`] merges equivalent states.
//!
//! [`schema`] converts the results to and from the JSON automaton format.
//!
//! ```
//! let compiled = rexfa::compile("a(b|c)*").unwrap();
//! assert!(compiled.minimized.accepts("abcb"));
//! assert!(!compiled.minimized.accepts("b"));
//! ```

pub mod automaton;
pub mod error;
pub mod regex;
pub mod schema;

pub use automaton::{DFA, EpsilonNFA};
pub use error::{Error, InvalidRegex, Result};

use log::debug;

/// Every automaton produced while compiling one regex.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub nfa: EpsilonNFA,
    pub dfa: DFA,
    pub minimized: DFA,
}

/// Run the whole pipeline on `regex`.
///
/// Fails only on invalid input; determinization and minimization are total.
pub fn compile(regex: &str) -> Result<Compiled, InvalidRegex> {
    let postfix = regex::parse(regex)?;
    let mut nfa = automaton::thompson_construction(&postfix);
    nfa.compute_epsilon_closures();
    let dfa = automaton::subset_construction(&nfa);
    let minimized = dfa.minimize();
    debug!(
        "compiled {regex:?}: nfa={} dfa={} minimized={}",
        nfa.num_states(),
        dfa.num_states(),
        minimized.num_states()
    );
    Ok(Compiled {
        nfa,
        dfa,
        minimized,
    })
}

#[cfg(feature = "python")]
mod python {
    use crate::automaton;
    use pyo3::prelude::*;

    fn import_submodule<'py>(
        py: Python<'py>,
        m: &Bound<'py, PyModule>,
        package: &str,
        name: &str,
        import_func: impl FnOnce(&Bound<'py, PyModule>) -> PyResult<()>,
    ) -> PyResult<()> {
        let submodule = PyModule::new(py, name)?;
        import_func(&submodule)?;

        // Dotted imports look the submodule up in sys.modules
        let sys_modules = PyModule::import(py, "sys")?.getattr("modules")?;
        sys_modules.set_item(format!("{package}.{name}"), submodule.clone())?;

        m.add_submodule(&submodule)?;
        Ok(())
    }

    #[pymodule]
    fn rexfa(m: &Bound<'_, PyModule>) -> PyResult<()> {
        import_submodule(m.py(), m, "rexfa", "automaton", automaton::automaton)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_automaton_submodule_is_importable() {
            pyo3::prepare_freethreaded_python();
            Python::with_gil(|py| {
                let package = PyModule::new(py, "rexfa").unwrap();
                import_submodule(py, &package, "rexfa", "automaton", automaton::automaton)
                    .unwrap();

                let sys_modules = PyModule::import(py, "sys").unwrap().getattr("modules").unwrap();
                assert!(sys_modules.contains("rexfa.automaton").unwrap());

                let submodule = PyModule::import(py, "rexfa.automaton").unwrap();
                let compiled = submodule.getattr("compile").unwrap().call1(("a|b",)).unwrap();
                let minimized = compiled.get_item(2).unwrap();
                let accepts = minimized.call_method1("accepts", ("b",)).unwrap();
                assert!(accepts.extract::<bool>().unwrap());
                assert!(package.getattr("automaton").is_ok());
            });
        }
    }
}
