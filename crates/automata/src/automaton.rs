use std::collections::BTreeSet;

use fasim_collections::VecSet;
use thiserror::Error;

use crate::State;
use crate::StateIndex;

/// Errors of the checked builder operations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BuildError {
    #[error("The name of a state cannot be empty")]
    EmptyName,

    #[error("The state {0} already exists")]
    DuplicateState(String),

    #[error("A deterministic automaton cannot have an epsilon transition from {from}")]
    EpsilonTransition { from: String },

    #[error("There already is a transition from {from} with symbol {symbol}")]
    TransitionExists { from: String, symbol: String },
}

/// The interface shared by deterministic and non-deterministic automata.
pub trait Automaton {
    /// Returns the state with the given index.
    fn state(&self, index: StateIndex) -> &State;

    /// Returns the number of states.
    fn num_of_states(&self) -> usize;

    /// Returns the number of transitions, where every destination of a
    /// non-deterministic transition is counted separately.
    fn num_of_transitions(&self) -> usize;

    /// Returns the initial state, if any.
    fn initial_state(&self) -> Option<StateIndex>;

    /// Returns the set of final states.
    fn final_states(&self) -> &VecSet<StateIndex>;

    /// Returns the alphabet in sorted order.
    fn alphabet(&self) -> &BTreeSet<String>;

    /// Returns true iff the automaton accepts the given input.
    fn accepts(&self, input: &str) -> bool;

    /// Iterate over all state indices.
    fn iter_states(&self) -> impl Iterator<Item = StateIndex> {
        (0..self.num_of_states()).map(StateIndex::new)
    }

    /// Returns true iff the given state is a final state.
    fn is_final(&self, index: StateIndex) -> bool {
        self.final_states().contains(&index)
    }

    /// Returns the first state with the given name.
    fn state_by_name(&self, name: &str) -> Option<StateIndex> {
        self.iter_states().find(|&index| self.state(index).name() == name)
    }
}
