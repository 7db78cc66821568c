//!
//! A crate containing deterministic and non-deterministic finite automata,
//! their simulation, the subset construction and their file formats.
//!
//! This crate does not use unsafe code.

#![forbid(unsafe_code)]

mod automaton;
mod dfa;
mod io;
mod io_afd;
mod io_jff;
mod nfa;
mod random_automaton;
mod state;
mod subset_construction;
mod table;
mod trace;

pub use automaton::*;
pub use dfa::*;
pub use io::*;
pub use io_afd::*;
pub use io_jff::*;
pub use nfa::*;
pub use random_automaton::*;
pub use state::*;
pub use subset_construction::*;
pub use table::*;
pub use trace::*;
