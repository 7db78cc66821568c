use std::fmt;

use itertools::Itertools;

use crate::Automaton;
use crate::Dfa;
use crate::EPSILON;
use crate::Nfa;
use crate::StateIndex;

/// A textual transition table with one row per state and one column per
/// symbol, in sorted order.
///
/// Every row starts with the state name, followed by ` (I)` for the initial
/// state and ` (F)` for final states. A missing transition is shown as `-`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TransitionTable {
    pub fn from_dfa(dfa: &Dfa) -> Self {
        let header = Self::header(dfa.alphabet().iter().map(String::as_str));

        let rows = dfa
            .iter_states()
            .map(|state| {
                let mut row = vec![Self::state_label(dfa, state)];
                row.extend(dfa.alphabet().iter().map(|symbol| match dfa.transition(state, symbol) {
                    Some(to) => dfa.state_name(to).to_string(),
                    None => "-".to_string(),
                }));
                row
            })
            .collect();

        Self { header, rows }
    }

    /// The destinations are printed as sets, with an additional `ε` column
    /// when the automaton has epsilon transitions.
    pub fn from_nfa(nfa: &Nfa) -> Self {
        let has_epsilon = nfa.transitions().any(|(_, symbol, _)| symbol == EPSILON);

        let symbols: Vec<&str> = has_epsilon
            .then_some(EPSILON)
            .into_iter()
            .chain(nfa.alphabet().iter().map(String::as_str))
            .collect();

        let header = Self::header(symbols.iter().map(|&symbol| if symbol.is_empty() { "ε" } else { symbol }));

        let rows = nfa
            .iter_states()
            .map(|state| {
                let mut row = vec![Self::state_label(nfa, state)];
                row.extend(symbols.iter().map(|&symbol| match nfa.transitions_on(state, symbol) {
                    Some(destinations) => format!(
                        "{{{}}}",
                        destinations.iter().map(|to| nfa.state_name(*to)).format(", ")
                    ),
                    None => "-".to_string(),
                }));
                row
            })
            .collect();

        Self { header, rows }
    }

    /// Returns the rows of the table, without the header.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    fn header<'a>(symbols: impl Iterator<Item = &'a str>) -> Vec<String> {
        std::iter::once("State")
            .chain(symbols)
            .map(str::to_string)
            .collect()
    }

    fn state_label(automaton: &impl Automaton, state: StateIndex) -> String {
        let mut label = automaton.state(state).name().to_string();
        if automaton.initial_state() == Some(state) {
            label.push_str(" (I)");
        }
        if automaton.is_final(state) {
            label.push_str(" (F)");
        }
        label
    }
}

impl fmt::Display for TransitionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths: Vec<usize> = (0..self.header.len())
            .map(|column| {
                std::iter::once(&self.header)
                    .chain(&self.rows)
                    .map(|row| row[column].chars().count())
                    .max()
                    .unwrap_or_default()
            })
            .collect();

        for row in std::iter::once(&self.header).chain(&self.rows) {
            let line = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .join(" | ");
            writeln!(f, "{}", line.trim_end())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;
    use test_log::test;

    use crate::DfaBuilder;
    use crate::NfaBuilder;

    #[test]
    fn test_dfa_table() {
        let mut builder = DfaBuilder::new();
        let q0 = builder.add_state("q0", true, false);
        let q1 = builder.add_state("q1", false, true);
        builder.add_transition(q0, "a", q1);
        builder.add_transition(q0, "b", q0);
        builder.add_transition(q1, "a", q1);
        let dfa = builder.finish();

        let table = TransitionTable::from_dfa(&dfa);
        assert_eq!(table.rows()[1], vec!["q1 (F)", "q1", "-"]);
        assert_eq!(
            table.to_string(),
            indoc! {"
                State  | a  | b
                q0 (I) | q1 | q0
                q1 (F) | q1 | -
            "}
        );
    }

    #[test]
    fn test_nfa_table() {
        let mut builder = NfaBuilder::new();
        let q0 = builder.add_state("q0", true, true);
        let q1 = builder.add_state("q1", false, false);
        builder.add_epsilon_transition(q0, q1);
        builder.add_transition(q0, "a", q0);
        builder.add_transition(q0, "a", q1);
        let nfa = builder.finish();

        let table = TransitionTable::from_nfa(&nfa);
        assert_eq!(table.rows()[0], vec!["q0 (I) (F)", "{q1}", "{q0, q1}"]);
        assert_eq!(table.rows()[1], vec!["q1", "-", "-"]);
        assert!(table.to_string().starts_with("State      | ε    | a"));
    }
}
