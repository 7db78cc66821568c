//! Deterministic finite automata.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use delegate::delegate;
use fasim_collections::VecSet;
use itertools::Itertools;
use log::trace;
use log::warn;

use crate::Automaton;
use crate::BuildError;
use crate::DfaValidation;
use crate::State;
use crate::StateIndex;
use crate::StateSpace;
use crate::Step;
use crate::Validation;

/// Incrementally constructs a [`Dfa`].
///
/// The unchecked operations follow the classic semantics: duplicate state
/// names are accepted and a second transition for the same state and symbol
/// overwrites the first. The `try_` variants reject both.
#[derive(Clone, Debug, Default)]
pub struct DfaBuilder {
    space: StateSpace,

    /// For every state the target per input symbol.
    transitions: Vec<BTreeMap<String, StateIndex>>,
}

impl DfaBuilder {
    /// Initializes a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new state, an initial state replaces the current initial state.
    pub fn add_state(&mut self, name: &str, is_initial: bool, is_final: bool) -> StateIndex {
        self.transitions.push(BTreeMap::new());
        self.space.add_state(name, is_initial, is_final)
    }

    /// Appends a new state, unless the name is empty or already used.
    pub fn try_add_state(&mut self, name: &str, is_initial: bool, is_final: bool) -> Result<StateIndex, BuildError> {
        let index = self.space.try_add_state(name, is_initial, is_final)?;
        self.transitions.push(BTreeMap::new());
        Ok(index)
    }

    /// Adds the transition `from --[symbol]-> to`, replacing an existing
    /// transition from `from` with the same symbol.
    ///
    /// A deterministic automaton has no epsilon transitions, so a transition
    /// with the empty symbol is dropped with a warning.
    pub fn add_transition(&mut self, from: StateIndex, symbol: &str, to: StateIndex) {
        if symbol.is_empty() {
            warn!("Dropping epsilon transition from {}", self.space.state(from));
            return;
        }

        debug_assert!(*to < self.space.num_of_states(), "Target state {to} does not exist");

        self.space.add_symbol(symbol);
        if let Some(previous) = self.transitions[*from].insert(symbol.to_string(), to) {
            trace!("Transition {from} --[{symbol}]-> {previous} replaced by target {to}");
        }
    }

    /// Adds the transition `from --[symbol]-> to`, unless the symbol is empty or
    /// a transition from `from` with that symbol already exists.
    pub fn try_add_transition(&mut self, from: StateIndex, symbol: &str, to: StateIndex) -> Result<(), BuildError> {
        if symbol.is_empty() {
            return Err(BuildError::EpsilonTransition {
                from: self.space.state_name(from).to_string(),
            });
        }

        if self.transitions[*from].contains_key(symbol) {
            return Err(BuildError::TransitionExists {
                from: self.space.state_name(from).to_string(),
                symbol: symbol.to_string(),
            });
        }

        self.add_transition(from, symbol, to);
        Ok(())
    }

    /// Returns the current target of the transition from `from` with `symbol`.
    pub fn transition(&self, from: StateIndex, symbol: &str) -> Option<StateIndex> {
        self.transitions[*from].get(symbol).copied()
    }

    delegate! {
        to self.space {
            /// Returns the first state with the given name.
            #[call(state_by_name)]
            pub fn get_state_by_name(&self, name: &str) -> Option<StateIndex>;
            pub fn num_of_states(&self) -> usize;
            pub fn state(&self, index: StateIndex) -> &State;
        }
    }

    /// Finalizes the builder and returns the constructed automaton.
    pub fn finish(self) -> Dfa {
        Dfa {
            space: self.space,
            transitions: self.transitions,
        }
    }
}

/// A deterministic finite automaton, the transitions form a partial function
/// from (state, symbol) to state.
///
/// A finished automaton cannot be changed, use a [`DfaBuilder`] to construct one.
#[derive(Clone, Debug, Default)]
pub struct Dfa {
    space: StateSpace,
    transitions: Vec<BTreeMap<String, StateIndex>>,
}

impl Dfa {
    /// Returns the empty automaton, which has no states and rejects every input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the target of the transition from `from` with `symbol`, if any.
    pub fn transition(&self, from: StateIndex, symbol: &str) -> Option<StateIndex> {
        self.transitions[*from].get(symbol).copied()
    }

    /// Returns the outgoing transitions of the given state, ordered by symbol.
    pub fn outgoing_transitions(&self, from: StateIndex) -> impl Iterator<Item = (&str, StateIndex)> + '_ {
        self.transitions[*from]
            .iter()
            .map(|(symbol, to)| (symbol.as_str(), *to))
    }

    /// Returns all transitions as (from, symbol, to), ordered by state and symbol.
    pub fn transitions(&self) -> impl Iterator<Item = (StateIndex, &str, StateIndex)> + '_ {
        self.space.iter_states().flat_map(move |from| {
            self.outgoing_transitions(from)
                .map(move |(symbol, to)| (from, symbol, to))
        })
    }

    /// Simulates the automaton on the given input.
    ///
    /// The trace starts with the initial state at position zero, followed by
    /// one step per consumed symbol. When no transition exists the last step
    /// has no state and the input is rejected, regardless of how much of it was
    /// consumed. Without an initial state every input is rejected with an empty trace.
    pub fn validate_string(&self, input: &str) -> DfaValidation {
        let Some(mut current) = self.space.initial_state() else {
            return Validation::rejected();
        };

        let mut steps = vec![Step::new(Some(current), 0, input)];
        for (position, (offset, character)) in input.char_indices().enumerate() {
            let end = offset + character.len_utf8();
            let remaining = &input[end..];

            match self.transition(current, &input[offset..end]) {
                Some(next) => {
                    trace!("{} --[{character}]-> {}", self.space.state(current), self.space.state(next));
                    current = next;
                    steps.push(Step::new(Some(next), position + 1, remaining));
                }
                None => {
                    trace!("No transition from {} with {character}", self.space.state(current));
                    steps.push(Step::new(None, position + 1, remaining));
                    return Validation {
                        accepted: false,
                        trace: steps,
                    };
                }
            }
        }

        Validation {
            accepted: self.space.is_final(current),
            trace: steps,
        }
    }

    delegate! {
        to self.space {
            /// Returns the first state with the given name.
            #[call(state_by_name)]
            pub fn get_state_by_name(&self, name: &str) -> Option<StateIndex>;
            pub fn states(&self) -> &[State];
            pub fn state_name(&self, index: StateIndex) -> &str;
        }
    }
}

impl Automaton for Dfa {
    fn state(&self, index: StateIndex) -> &State {
        self.space.state(index)
    }

    fn num_of_states(&self) -> usize {
        self.space.num_of_states()
    }

    fn num_of_transitions(&self) -> usize {
        self.transitions.iter().map(BTreeMap::len).sum()
    }

    fn initial_state(&self) -> Option<StateIndex> {
        self.space.initial_state()
    }

    fn final_states(&self) -> &VecSet<StateIndex> {
        self.space.final_states()
    }

    fn alphabet(&self) -> &BTreeSet<String> {
        self.space.alphabet()
    }

    fn accepts(&self, input: &str) -> bool {
        self.validate_string(input).accepted
    }
}

impl fmt::Display for Dfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of states: {}", self.num_of_states())?;
        writeln!(f, "Number of transitions: {}", self.num_of_transitions())?;
        write!(f, "Alphabet: {{{}}}", self.alphabet().iter().format(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::Rng;
    use test_log::test;

    use fasim_utilities::random_test;

    use crate::random_dfa;
    use crate::random_string;

    /// The automaton accepting all strings over {a, b} that end with an a.
    fn ends_with_a() -> Dfa {
        let mut builder = DfaBuilder::new();
        let q0 = builder.add_state("q0", true, false);
        let q1 = builder.add_state("q1", false, true);

        builder.add_transition(q0, "a", q1);
        builder.add_transition(q1, "a", q1);
        builder.add_transition(q0, "b", q0);
        builder.add_transition(q1, "b", q0);
        builder.finish()
    }

    #[test]
    fn test_ends_with_a() {
        let dfa = ends_with_a();

        let result = dfa.validate_string("aab");
        assert!(!result.accepted);
        assert_eq!(result.trace.len(), 4);
        let last = result.last_step().unwrap();
        assert_eq!(last.state, dfa.get_state_by_name("q0"));
        assert_eq!(last.position, 3);
        assert_eq!(last.remaining, "");

        assert!(dfa.validate_string("ba").accepted);
        assert!(!dfa.validate_string("").accepted);
    }

    #[test]
    fn test_trace_positions() {
        let dfa = ends_with_a();
        let result = dfa.validate_string("ba");

        let positions: Vec<(usize, &str)> = result
            .trace
            .iter()
            .map(|step| (step.position, step.remaining.as_str()))
            .collect();
        assert_eq!(positions, vec![(0, "ba"), (1, "a"), (2, "")]);
    }

    #[test]
    fn test_stuck() {
        let dfa = ends_with_a();

        let result = dfa.validate_string("abca");
        assert!(!result.accepted);

        let last = result.last_step().unwrap();
        assert_eq!(last.state, None);
        assert_eq!(last.position, 3);
        assert_eq!(last.remaining, "a");
    }

    #[test]
    fn test_no_initial_state() {
        let mut builder = DfaBuilder::new();
        let q0 = builder.add_state("q0", false, true);
        builder.add_transition(q0, "a", q0);
        let dfa = builder.finish();

        let result = dfa.validate_string("");
        assert!(!result.accepted);
        assert!(result.trace.is_empty());

        assert!(!Dfa::new().validate_string("a").accepted);
    }

    #[test]
    fn test_epsilon_transition_dropped() {
        let mut builder = DfaBuilder::new();
        let q0 = builder.add_state("q0", true, true);
        let q1 = builder.add_state("q1", false, false);
        builder.add_transition(q0, "", q1);
        builder.add_transition(q0, "a", q1);
        let dfa = builder.finish();

        assert_eq!(dfa.num_of_transitions(), 1);
        assert_eq!(dfa.transition(q0, ""), None);
        assert!(dfa.alphabet().iter().all(|symbol| !symbol.is_empty()));
        assert!(!dfa.to_native_format().transitions.contains_key("q0,"));
    }

    #[test]
    fn test_try_add_state_keeps_transitions_aligned() {
        let mut builder = DfaBuilder::new();
        let q0 = builder.try_add_state("q0", true, false).unwrap();

        assert_eq!(
            builder.try_add_state("q0", false, true),
            Err(BuildError::DuplicateState("q0".to_string()))
        );
        assert_eq!(builder.try_add_state("", false, true), Err(BuildError::EmptyName));

        let q1 = builder.try_add_state("q1", false, true).unwrap();
        assert_eq!(*q1, 1);
        assert_eq!(builder.num_of_states(), 2);

        builder.try_add_transition(q1, "a", q0).unwrap();
        builder.try_add_transition(q0, "a", q1).unwrap();
        assert_eq!(builder.transition(q1, "a"), Some(q0));

        let dfa = builder.finish();
        assert_eq!(dfa.outgoing_transitions(q1).collect::<Vec<_>>(), vec![("a", q0)]);
        assert!(dfa.validate_string("a").accepted);
        assert!(!dfa.validate_string("aa").accepted);
    }

    #[test]
    fn test_transition_overwrite() {
        let mut builder = DfaBuilder::new();
        let q0 = builder.add_state("q0", true, false);
        let q1 = builder.add_state("q1", false, true);
        let q2 = builder.add_state("q2", false, false);

        builder.add_transition(q0, "a", q1);
        builder.add_transition(q0, "a", q2);

        assert_eq!(builder.transition(q0, "a"), Some(q2));
        assert_eq!(
            builder.try_add_transition(q0, "a", q1),
            Err(BuildError::TransitionExists {
                from: "q0".to_string(),
                symbol: "a".to_string()
            })
        );
        assert_eq!(
            builder.try_add_transition(q0, "", q1),
            Err(BuildError::EpsilonTransition { from: "q0".to_string() })
        );

        let dfa = builder.finish();
        assert_eq!(dfa.num_of_transitions(), 1);
        assert!(!dfa.validate_string("a").accepted);
    }

    #[test]
    fn test_transitions_order() {
        let dfa = ends_with_a();

        let transitions: Vec<(&str, &str, &str)> = dfa
            .transitions()
            .map(|(from, symbol, to)| (dfa.state_name(from), symbol, dfa.state_name(to)))
            .collect();

        assert_eq!(
            transitions,
            vec![
                ("q0", "a", "q1"),
                ("q0", "b", "q0"),
                ("q1", "a", "q1"),
                ("q1", "b", "q0")
            ]
        );
    }

    #[test]
    fn test_random_empty_string() {
        random_test(100, |rng| {
            let dfa = random_dfa(rng, 5, 3, 3);

            let initial = dfa.initial_state().expect("Random automata have an initial state");
            assert_eq!(dfa.validate_string("").accepted, dfa.is_final(initial));
        });
    }

    #[test]
    fn test_random_trace_shape() {
        random_test(100, |rng| {
            let dfa = random_dfa(rng, 5, 3, 3);
            let length = rng.random_range(0..8);
            let input = random_string(rng, dfa.alphabet(), length);

            let result = dfa.validate_string(&input);
            let last = result.last_step().expect("The trace contains at least the initial step");

            if last.state.is_none() {
                assert!(!result.accepted, "A stuck automaton must reject");
            } else {
                assert_eq!(result.trace.len(), input.chars().count() + 1);
                assert_eq!(result.accepted, dfa.is_final(last.state.unwrap()));
            }

            // Every step except the stuck one follows a transition.
            for window in result.trace.windows(2) {
                if let (Some(from), Some(to)) = (window[0].state, window[1].state) {
                    let symbol = &window[0].remaining[..window[0].remaining.len() - window[1].remaining.len()];
                    assert_eq!(dfa.transition(from, symbol), Some(to));
                }
            }
        });
    }
}
