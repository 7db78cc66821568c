//! Non-deterministic finite automata with epsilon transitions.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use delegate::delegate;
use fasim_collections::VecSet;
use itertools::Itertools;
use log::trace;

use crate::Automaton;
use crate::BuildError;
use crate::Dfa;
use crate::NfaValidation;
use crate::State;
use crate::StateIndex;
use crate::StateSpace;
use crate::Step;
use crate::Validation;
use crate::subset_construction;

/// The symbol of an epsilon (lambda) transition.
pub const EPSILON: &str = "";

/// Incrementally constructs an [`Nfa`].
#[derive(Clone, Debug, Default)]
pub struct NfaBuilder {
    space: StateSpace,
    transitions: Vec<BTreeMap<String, VecSet<StateIndex>>>,
}

impl NfaBuilder {
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

    /// Adds `to` to the destinations of `from` with `symbol`. The empty symbol
    /// is an epsilon transition.
    pub fn add_transition(&mut self, from: StateIndex, symbol: &str, to: StateIndex) {
        debug_assert!(*to < self.space.num_of_states(), "Target state {to} does not exist");

        self.space.add_symbol(symbol);
        self.transitions[*from].entry(symbol.to_string()).or_default().insert(to);
    }

    /// Adds the epsilon transition `from --[]-> to`.
    pub fn add_epsilon_transition(&mut self, from: StateIndex, to: StateIndex) {
        self.add_transition(from, EPSILON, to);
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
    pub fn finish(self) -> Nfa {
        Nfa {
            space: self.space,
            transitions: self.transitions,
        }
    }
}

/// A non-deterministic finite automaton, where every (state, symbol) pair has
/// a set of destinations and the empty symbol denotes epsilon transitions.
#[derive(Clone, Debug, Default)]
pub struct Nfa {
    space: StateSpace,
    transitions: Vec<BTreeMap<String, VecSet<StateIndex>>>,
}

impl Nfa {
    /// Returns the empty automaton, which has no states and rejects every input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the destinations of `from` with `symbol`, if there are any.
    pub fn transitions_on(&self, from: StateIndex, symbol: &str) -> Option<&VecSet<StateIndex>> {
        self.transitions[*from].get(symbol)
    }

    /// Returns all transitions as (from, symbol, to), ordered by state, symbol
    /// and destination. Epsilon transitions come first for every state.
    pub fn transitions(&self) -> impl Iterator<Item = (StateIndex, &str, StateIndex)> + '_ {
        self.space.iter_states().flat_map(move |from| {
            self.transitions[*from]
                .iter()
                .flat_map(move |(symbol, destinations)| destinations.iter().map(move |to| (from, symbol.as_str(), *to)))
        })
    }

    /// Computes the set of states reachable from the given states using only
    /// epsilon transitions, including the given states themselves.
    pub fn lambda_closure(&self, states: &VecSet<StateIndex>) -> VecSet<StateIndex> {
        let mut closure = states.clone();
        let mut worklist: Vec<StateIndex> = states.iter().copied().collect();

        while let Some(state) = worklist.pop() {
            if let Some(destinations) = self.transitions_on(state, EPSILON) {
                for &destination in destinations {
                    if closure.insert(destination) {
                        worklist.push(destination);
                    }
                }
            }
        }

        closure
    }

    /// Returns the union of the destinations of the given states with the
    /// given symbol, without taking the epsilon closure.
    pub fn move_on_symbol(&self, states: &VecSet<StateIndex>, symbol: &str) -> VecSet<StateIndex> {
        debug_assert!(!symbol.is_empty(), "Use lambda_closure for epsilon moves");

        let mut reached = VecSet::new();
        for &state in states {
            if let Some(destinations) = self.transitions_on(state, symbol) {
                reached.union_with(destinations);
            }
        }

        reached
    }

    /// Returns the epsilon closure of the initial state, or the empty set
    /// when there is no initial state.
    pub fn initial_closure(&self) -> VecSet<StateIndex> {
        match self.space.initial_state() {
            Some(initial) => self.lambda_closure(&VecSet::singleton(initial)),
            None => VecSet::new(),
        }
    }

    /// Simulates the automaton on the given input by tracking the set of
    /// active states.
    ///
    /// The input is accepted iff the active set after the last symbol contains
    /// a final state. Without an initial state every input is rejected with
    /// an empty trace.
    pub fn validate_string(&self, input: &str) -> NfaValidation {
        if self.space.initial_state().is_none() {
            return Validation::rejected();
        }

        let mut active = self.initial_closure();
        let mut steps = vec![Step::new(active.clone(), 0, input)];

        for (position, (offset, character)) in input.char_indices().enumerate() {
            let end = offset + character.len_utf8();

            let next = self.move_on_symbol(&active, &input[offset..end]);
            active = self.lambda_closure(&next);
            trace!("Read {character}, active states {:?}", active);

            steps.push(Step::new(active.clone(), position + 1, &input[end..]));
        }

        Validation {
            accepted: active.intersects(self.space.final_states()),
            trace: steps,
        }
    }

    /// Converts this automaton into an equivalent deterministic automaton, see [`subset_construction`].
    pub fn to_dfa(&self) -> Dfa {
        subset_construction(self).dfa
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

impl Automaton for Nfa {
    fn state(&self, index: StateIndex) -> &State {
        self.space.state(index)
    }

    fn num_of_states(&self) -> usize {
        self.space.num_of_states()
    }

    fn num_of_transitions(&self) -> usize {
        self.transitions
            .iter()
            .flat_map(BTreeMap::values)
            .map(VecSet::len)
            .sum()
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

impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of states: {}", self.num_of_states())?;
        writeln!(f, "Number of transitions: {}", self.num_of_transitions())?;
        write!(f, "Alphabet: {{{}}}", self.alphabet().iter().format(", "))
    }
}
