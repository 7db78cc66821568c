use std::ffi::OsStr;
use std::fs::File;
use std::path::Path;

#[cfg(feature = "clap")]
use clap::ValueEnum;

use fasim_utilities::FasimError;

use crate::Dfa;
use crate::Nfa;
use crate::read_afd;
use crate::read_jff_dfa;
use crate::read_jff_nfa;

/// Explicitly specify the automaton file format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(ValueEnum))]
pub enum AutomatonFormat {
    /// The native JSON format for deterministic automata.
    Afd,
    /// The JFLAP XML format.
    Jff,
}

/// Determines how transitions that refer to a state that does not exist are
/// treated while reading an automaton.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(ValueEnum))]
pub enum ReferencePolicy {
    /// Drop the transition and log a warning.
    #[default]
    Skip,
    /// Abort reading with an error naming the missing state.
    Fail,
}

/// Determines how a document is materialized as a deterministic automaton.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(ValueEnum))]
pub enum Determinism {
    /// Epsilon transitions and conflicting transitions are errors.
    #[default]
    Strict,
    /// A later transition overwrites an earlier one with the same source and
    /// symbol, epsilon transitions are dropped.
    #[cfg_attr(feature = "clap", value(name = "last-wins"))]
    LastTransitionWins,
}

/// Guesses the automaton file format from the file extension.
pub fn guess_format_from_extension(path: &Path, format: Option<AutomatonFormat>) -> Option<AutomatonFormat> {
    if let Some(format) = format {
        return Some(format);
    }

    if path.extension() == Some(OsStr::new("afd")) || path.extension() == Some(OsStr::new("json")) {
        Some(AutomatonFormat::Afd)
    } else if path.extension() == Some(OsStr::new("jff")) {
        Some(AutomatonFormat::Jff)
    } else {
        None
    }
}

/// Reads a deterministic automaton from the given path and format.
pub fn read_dfa(
    path: &Path,
    format: AutomatonFormat,
    policy: ReferencePolicy,
    determinism: Determinism,
) -> Result<Dfa, FasimError> {
    match format {
        AutomatonFormat::Afd => Ok(read_afd(File::open(path)?, policy)?),
        AutomatonFormat::Jff => {
            let content = std::fs::read_to_string(path)?;
            Ok(read_jff_dfa(&content, policy, determinism)?)
        }
    }
}

/// Reads a non-deterministic automaton from the given path, only the JFLAP
/// format can describe these.
pub fn read_nfa(path: &Path, policy: ReferencePolicy) -> Result<Nfa, FasimError> {
    let content = std::fs::read_to_string(path)?;
    Ok(read_jff_nfa(&content, policy)?)
}
