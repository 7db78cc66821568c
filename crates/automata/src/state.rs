use std::collections::BTreeSet;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;

use fasim_collections::VecSet;
use fasim_utilities::TagIndex;

use crate::BuildError;

/// A unique type for the states.
pub struct StateTag;

/// The index of a state in the arena of its automaton.
pub type StateIndex = TagIndex<usize, StateTag>;

/// A named state of an automaton. Equality and hashing only consider the name.
///
/// The flags record how the state was created, the automaton that owns the
/// state decides which state is initial and which states are final.
#[derive(Clone, Debug)]
pub struct State {
    name: String,
    is_initial: bool,
    is_final: bool,
}

impl State {
    /// Creates a new state with the given name and flags.
    pub fn new(name: impl Into<String>, is_initial: bool, is_final: bool) -> Self {
        Self {
            name: name.into(),
            is_initial,
            is_final,
        }
    }

    /// Returns the name of the state.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true iff the state was created as an initial state.
    pub fn is_initial(&self) -> bool {
        self.is_initial
    }

    /// Returns true iff the state was created as a final state.
    pub fn is_final(&self) -> bool {
        self.is_final
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The part of an automaton that is shared between the deterministic and
/// non-deterministic variants: the state arena, the initial and final states,
/// and the alphabet.
#[derive(Clone, Debug, Default)]
pub struct StateSpace {
    states: Vec<State>,
    initial_state: Option<StateIndex>,
    final_states: VecSet<StateIndex>,

    /// The input symbols, kept sorted so that every traversal over the
    /// alphabet is deterministic. Never contains the empty (epsilon) symbol.
    alphabet: BTreeSet<String>,
}

impl StateSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new state. An initial state replaces the current initial
    /// state. Duplicate names are not rejected, see [`Self::try_add_state`].
    pub fn add_state(&mut self, name: &str, is_initial: bool, is_final: bool) -> StateIndex {
        let index = StateIndex::new(self.states.len());
        self.states.push(State::new(name, is_initial, is_final));

        if is_initial {
            self.initial_state = Some(index);
        }

        if is_final {
            self.final_states.insert(index);
        }

        index
    }

    /// Same as [`Self::add_state`], but rejects empty and duplicate names.
    pub fn try_add_state(&mut self, name: &str, is_initial: bool, is_final: bool) -> Result<StateIndex, BuildError> {
        if name.is_empty() {
            return Err(BuildError::EmptyName);
        }

        if self.state_by_name(name).is_some() {
            return Err(BuildError::DuplicateState(name.to_string()));
        }

        Ok(self.add_state(name, is_initial, is_final))
    }

    /// Adds the symbol to the alphabet, unless it is the epsilon symbol.
    pub fn add_symbol(&mut self, symbol: &str) {
        if !symbol.is_empty() && !self.alphabet.contains(symbol) {
            self.alphabet.insert(symbol.to_string());
        }
    }

    /// Returns the first state with the given name.
    pub fn state_by_name(&self, name: &str) -> Option<StateIndex> {
        self.states
            .iter()
            .position(|state| state.name == name)
            .map(StateIndex::new)
    }

    /// Returns the state with the given index.
    pub fn state(&self, index: StateIndex) -> &State {
        &self.states[*index]
    }

    /// Returns the name of the state with the given index.
    pub fn state_name(&self, index: StateIndex) -> &str {
        self.states[*index].name()
    }

    /// Returns all states in insertion order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Returns the number of states.
    pub fn num_of_states(&self) -> usize {
        self.states.len()
    }

    /// Iterate over all state indices.
    pub fn iter_states(&self) -> impl Iterator<Item = StateIndex> + use<> {
        (0..self.states.len()).map(StateIndex::new)
    }

    /// Returns the initial state, if any.
    pub fn initial_state(&self) -> Option<StateIndex> {
        self.initial_state
    }

    /// Returns the set of final states.
    pub fn final_states(&self) -> &VecSet<StateIndex> {
        &self.final_states
    }

    /// Returns true iff the given state is a final state.
    pub fn is_final(&self, index: StateIndex) -> bool {
        self.final_states.contains(&index)
    }

    /// Returns the alphabet in sorted order.
    pub fn alphabet(&self) -> &BTreeSet<String> {
        &self.alphabet
    }
}
