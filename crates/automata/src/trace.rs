use std::fmt;

use fasim_collections::VecSet;
use itertools::Itertools;

use crate::Automaton;
use crate::StateIndex;

/// A single step of a simulation: the active state(s) after `position` input
/// symbols have been consumed, and the input that remains.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step<S> {
    pub state: S,
    pub position: usize,
    pub remaining: String,
}

impl<S> Step<S> {
    pub fn new(state: S, position: usize, remaining: &str) -> Self {
        Self {
            state,
            position,
            remaining: remaining.to_string(),
        }
    }
}

/// The result of validating an input string: whether it was accepted, and the
/// steps that the simulation took.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validation<S> {
    pub accepted: bool,
    pub trace: Vec<Step<S>>,
}

/// A deterministic step, `None` when the automaton got stuck.
pub type DfaStep = Step<Option<StateIndex>>;

/// A non-deterministic step, the set of active states.
pub type NfaStep = Step<VecSet<StateIndex>>;

pub type DfaValidation = Validation<Option<StateIndex>>;
pub type NfaValidation = Validation<VecSet<StateIndex>>;

impl<S> Validation<S> {
    /// A rejection without any steps.
    pub fn rejected() -> Self {
        Self {
            accepted: false,
            trace: Vec::new(),
        }
    }

    /// Returns the last step of the trace.
    pub fn last_step(&self) -> Option<&Step<S>> {
        self.trace.last()
    }

    /// Returns an object that prints the trace using the state names of the given automaton.
    pub fn display<'a, A: Automaton>(&'a self, automaton: &'a A) -> TraceDisplay<'a, S, A> {
        TraceDisplay {
            validation: self,
            automaton,
        }
    }
}

/// The active states of a step, printed with the state names of an automaton.
pub trait ActiveStates {
    fn write_names(&self, f: &mut fmt::Formatter<'_>, automaton: &impl Automaton) -> fmt::Result;
}

impl ActiveStates for Option<StateIndex> {
    fn write_names(&self, f: &mut fmt::Formatter<'_>, automaton: &impl Automaton) -> fmt::Result {
        match self {
            Some(state) => write!(f, "{}", automaton.state(*state)),
            None => write!(f, "stuck"),
        }
    }
}

impl ActiveStates for VecSet<StateIndex> {
    fn write_names(&self, f: &mut fmt::Formatter<'_>, automaton: &impl Automaton) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.iter().map(|state| automaton.state(*state).name()).format(", ")
        )
    }
}

/// Prints one line per step followed by the verdict.
pub struct TraceDisplay<'a, S, A> {
    validation: &'a Validation<S>,
    automaton: &'a A,
}

impl<S: ActiveStates, A: Automaton> fmt::Display for TraceDisplay<'_, S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.validation.trace.iter().enumerate() {
            write!(f, "Step {i}: ")?;
            step.state.write_names(f, self.automaton)?;
            writeln!(f, " (position {}, remaining \"{}\")", step.position, step.remaining)?;
        }

        if self.validation.accepted {
            write!(f, "accepted")
        } else {
            write!(f, "rejected")
        }
    }
}
