use std::collections::BTreeMap;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;

use log::info;
use log::warn;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::Automaton;
use crate::Dfa;
use crate::DfaBuilder;
use crate::ReferencePolicy;
use crate::StateIndex;

#[derive(Error, Debug)]
pub enum NativeError {
    #[error("Invalid .afd document: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid transition key \"{0}\", expected \"<from>,<symbol>\"")]
    InvalidTransitionKey(String),

    #[error("Transition \"{0}\" has an empty symbol, which is not allowed in a DFA")]
    EpsilonTransition(String),

    #[error("Transition \"{key}\" refers to unknown state \"{name}\"")]
    UnknownState { key: String, name: String },
}

/// The native exchange format of a deterministic automaton, stored as a JSON
/// document in `.afd` files:
///
/// ```json
/// {
///   "alphabet": ["a", "b"],
///   "states": ["q0", "q1"],
///   "initial_state": "q0",
///   "final_states": ["q1"],
///   "transitions": { "q0,a": "q1", "q1,b": "q0" }
/// }
/// ```
///
/// The transition keys consist of the name of the source state and the
/// symbol, separated by the first comma. The initial state is the empty string
/// when there is none.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeFormat {
    #[serde(default)]
    pub alphabet: Vec<String>,
    pub states: Vec<String>,
    #[serde(default)]
    pub initial_state: String,
    #[serde(default)]
    pub final_states: Vec<String>,
    #[serde(default)]
    pub transitions: BTreeMap<String, String>,
}

impl Dfa {
    /// Converts the automaton into the native exchange format.
    pub fn to_native_format(&self) -> NativeFormat {
        NativeFormat {
            alphabet: self.alphabet().iter().cloned().collect(),
            states: self.states().iter().map(|state| state.name().to_string()).collect(),
            initial_state: self
                .initial_state()
                .map(|initial| self.state_name(initial).to_string())
                .unwrap_or_default(),
            final_states: self
                .final_states()
                .iter()
                .map(|state| self.state_name(*state).to_string())
                .collect(),
            transitions: self
                .transitions()
                .map(|(from, symbol, to)| {
                    (
                        format!("{},{symbol}", self.state_name(from)),
                        self.state_name(to).to_string(),
                    )
                })
                .collect(),
        }
    }

    /// Reconstructs an automaton from the native exchange format.
    ///
    /// The states are added first, marked initial and final by their name,
    /// followed by the transitions. The alphabet is derived from the
    /// transitions. Transitions referring to an unknown state are handled
    /// according to the given policy.
    pub fn from_native_format(data: &NativeFormat, policy: ReferencePolicy) -> Result<Dfa, NativeError> {
        let mut builder = DfaBuilder::new();

        // The first state with a given name is the one that transitions refer to.
        let mut states: FxHashMap<&str, StateIndex> = FxHashMap::default();
        for name in &data.states {
            let is_initial = *name == data.initial_state;
            let is_final = data.final_states.contains(name);

            let index = builder.add_state(name, is_initial, is_final);
            states.entry(name.as_str()).or_insert(index);
        }

        for (key, to_name) in &data.transitions {
            let (from_name, symbol) =
                split_transition_key(key, &states).ok_or_else(|| NativeError::InvalidTransitionKey(key.clone()))?;

            if symbol.is_empty() {
                return Err(NativeError::EpsilonTransition(key.clone()));
            }

            match (states.get(from_name), states.get(to_name.as_str())) {
                (Some(&from), Some(&to)) => builder.add_transition(from, symbol, to),
                (from, _) => {
                    let name = if from.is_none() { from_name } else { to_name.as_str() };
                    match policy {
                        ReferencePolicy::Skip => {
                            warn!("Skipping transition \"{key}\" -> \"{to_name}\", state \"{name}\" does not exist");
                        }
                        ReferencePolicy::Fail => {
                            return Err(NativeError::UnknownState {
                                key: key.clone(),
                                name: name.to_string(),
                            });
                        }
                    }
                }
            }
        }

        Ok(builder.finish())
    }
}

/// Splits a transition key into the name of the source state and the symbol.
///
/// State names may contain commas themselves, so the longest prefix that names
/// a state and leaves a non-empty symbol is taken. When no such prefix exists
/// the key is split at the first comma.
fn split_transition_key<'a>(key: &'a str, states: &FxHashMap<&str, StateIndex>) -> Option<(&'a str, &'a str)> {
    let splits: Vec<(&str, &str)> = key
        .match_indices(',')
        .map(|(position, _)| (&key[..position], &key[position + 1..]))
        .collect();

    let first = *splits.first()?;
    Some(
        splits
            .into_iter()
            .rev()
            .find(|(from, symbol)| !symbol.is_empty() && states.contains_key(from))
            .unwrap_or(first),
    )
}

/// Reads a deterministic automaton in the native `.afd` format from the given
/// reader. Note that the reader is buffered internally using a `BufReader`.
pub fn read_afd(reader: impl Read, policy: ReferencePolicy) -> Result<Dfa, NativeError> {
    info!("Reading DFA in .afd format...");

    let data: NativeFormat = serde_json::from_reader(BufReader::new(reader))?;
    let dfa = Dfa::from_native_format(&data, policy)?;

    info!("Finished reading DFA");
    Ok(dfa)
}

/// Writes the given automaton in the native `.afd` format, as pretty printed
/// JSON. Note that the writer is buffered internally using a `BufWriter`.
pub fn write_afd(writer: &mut impl Write, dfa: &Dfa) -> Result<(), NativeError> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, &dfa.to_native_format())?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;
    use rand::Rng;
    use test_log::test;

    use fasim_utilities::random_test;

    use crate::random_dfa;
    use crate::random_string;

    const ENDS_WITH_A: &str = indoc! {r#"
        {
          "alphabet": ["a", "b"],
          "states": ["q0", "q1"],
          "initial_state": "q0",
          "final_states": ["q1"],
          "transitions": {
            "q0,a": "q1",
            "q0,b": "q0",
            "q1,a": "q1",
            "q1,b": "q0"
          }
        }
    "#};

    #[test]
    fn test_reading_afd() {
        let dfa = read_afd(ENDS_WITH_A.as_bytes(), ReferencePolicy::Fail).unwrap();

        assert_eq!(dfa.num_of_states(), 2);
        assert_eq!(dfa.num_of_transitions(), 4);
        assert_eq!(dfa.initial_state(), dfa.get_state_by_name("q0"));
        assert!(dfa.validate_string("ba").accepted);
        assert!(!dfa.validate_string("aab").accepted);
    }

    #[test]
    fn test_writing_afd() {
        let dfa = read_afd(ENDS_WITH_A.as_bytes(), ReferencePolicy::Fail).unwrap();

        let mut buffer: Vec<u8> = Vec::new();
        write_afd(&mut buffer, &dfa).unwrap();

        let data: NativeFormat = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(data, serde_json::from_str::<NativeFormat>(ENDS_WITH_A).unwrap());
    }

    #[test]
    fn test_unknown_state() {
        let document = indoc! {r#"
            {
              "states": ["q0"],
              "initial_state": "q0",
              "final_states": ["q0"],
              "transitions": { "q0,a": "q0", "q0,b": "q9" }
            }
        "#};

        let dfa = read_afd(document.as_bytes(), ReferencePolicy::Skip).unwrap();
        assert_eq!(dfa.num_of_transitions(), 1);
        assert!(dfa.validate_string("aa").accepted);
        assert!(!dfa.validate_string("b").accepted);

        match read_afd(document.as_bytes(), ReferencePolicy::Fail) {
            Err(NativeError::UnknownState { key, name }) => {
                assert_eq!(key, "q0,b");
                assert_eq!(name, "q9");
            }
            result => panic!("Expected an unknown state error, got {result:?}"),
        }
    }

    #[test]
    fn test_invalid_documents() {
        let no_comma = r#"{ "states": ["q0"], "transitions": { "q0a": "q0" } }"#;
        assert!(matches!(
            read_afd(no_comma.as_bytes(), ReferencePolicy::Skip),
            Err(NativeError::InvalidTransitionKey(_))
        ));

        let epsilon = r#"{ "states": ["q0"], "transitions": { "q0,": "q0" } }"#;
        assert!(matches!(
            read_afd(epsilon.as_bytes(), ReferencePolicy::Skip),
            Err(NativeError::EpsilonTransition(_))
        ));

        let malformed = r#"{ "states": ["q0"], "#;
        assert!(matches!(
            read_afd(malformed.as_bytes(), ReferencePolicy::Skip),
            Err(NativeError::Json(_))
        ));
    }

    #[test]
    fn test_comma_symbol() {
        let document = r#"{ "states": ["q0"], "initial_state": "q0", "final_states": ["q0"], "transitions": { "q0,,": "q0" } }"#;

        let dfa = read_afd(document.as_bytes(), ReferencePolicy::Fail).unwrap();
        assert!(dfa.validate_string(",,").accepted);
    }

    #[test]
    fn test_comma_in_state_name() {
        let mut builder = DfaBuilder::new();
        let from = builder.try_add_state("q,0", true, false).unwrap();
        let q0 = builder.try_add_state("q0", false, false).unwrap();
        let to = builder.try_add_state("q1", false, true).unwrap();
        builder.try_add_transition(from, "a", to).unwrap();
        builder.try_add_transition(from, ",", q0).unwrap();
        builder.try_add_transition(q0, ",", to).unwrap();
        let dfa = builder.finish();

        let data = dfa.to_native_format();
        assert_eq!(data.transitions.get("q,0,a"), Some(&"q1".to_string()));

        let dfa_read = Dfa::from_native_format(&data, ReferencePolicy::Fail).unwrap();
        assert_eq!(dfa_read.num_of_transitions(), 3);
        assert_eq!(dfa_read.transition(from, "a"), Some(to));
        assert_eq!(dfa_read.transition(from, ","), Some(q0));
        assert_eq!(dfa_read.transition(q0, ","), Some(to));
        assert!(dfa_read.validate_string("a").accepted);
        assert!(dfa_read.validate_string(",,").accepted);
    }

    #[test]
    fn test_missing_initial_state() {
        let dfa = Dfa::new();
        let data = dfa.to_native_format();
        assert_eq!(data.initial_state, "");

        let dfa = Dfa::from_native_format(&data, ReferencePolicy::Fail).unwrap();
        assert!(dfa.initial_state().is_none());
    }

    #[test]
    fn test_random_afd_io() {
        random_test(100, |rng| {
            let dfa = random_dfa(rng, 8, 3, 3);

            let mut buffer: Vec<u8> = Vec::new();
            write_afd(&mut buffer, &dfa).unwrap();
            let dfa_read = read_afd(&buffer[..], ReferencePolicy::Fail).unwrap();

            assert_eq!(dfa.states(), dfa_read.states());
            assert_eq!(dfa.initial_state(), dfa_read.initial_state());
            assert_eq!(dfa.final_states(), dfa_read.final_states());
            assert_eq!(
                dfa.transitions().collect::<Vec<_>>(),
                dfa_read.transitions().collect::<Vec<_>>()
            );

            for _ in 0..10 {
                let length = rng.random_range(0..6);
                let input = random_string(rng, dfa.alphabet(), length);
                assert_eq!(dfa.accepts(&input), dfa_read.accepts(&input));
            }
        });
    }
}
