//! Subset construction algorithm for converting an NFA with epsilon transitions to a DFA.

use std::collections::VecDeque;

use fasim_collections::VecSet;
use log::debug;
use log::trace;
use rustc_hash::FxHashMap;

use crate::Automaton;
use crate::Dfa;
use crate::DfaBuilder;
use crate::Nfa;
use crate::StateIndex;

/// The result of the subset construction.
pub struct SubsetConstruction {
    /// The constructed deterministic automaton.
    pub dfa: Dfa,

    /// For every state of the DFA the set of NFA states that it represents.
    pub subsets: Vec<VecSet<StateIndex>>,
}

/// Converts the given NFA into a DFA accepting the same language using the
/// powerset construction.
///
/// Every DFA state corresponds to an epsilon closed set of NFA states. The sets
/// are explored breadth first and the symbols in sorted order, so the DFA
/// states are named `q0`, `q1`, ... in a deterministic discovery order. Sets
/// without any outgoing states are not represented, so the result has no
/// transition where the NFA would have no active states left.
///
/// An NFA without initial state results in the empty DFA.
pub fn subset_construction(nfa: &Nfa) -> SubsetConstruction {
    let mut builder = DfaBuilder::new();
    let mut subsets: Vec<VecSet<StateIndex>> = Vec::new();

    if nfa.initial_state().is_none() {
        debug!("The NFA has no initial state, the resulting DFA is empty");
        return SubsetConstruction {
            dfa: builder.finish(),
            subsets,
        };
    }

    // Maps the sets of NFA states to their DFA state.
    let mut state_mapping: FxHashMap<VecSet<StateIndex>, StateIndex> = FxHashMap::default();

    let initial_closure = nfa.initial_closure();
    let initial = builder.add_state("q0", true, initial_closure.intersects(nfa.final_states()));
    state_mapping.insert(initial_closure.clone(), initial);
    subsets.push(initial_closure.clone());

    let mut worklist = VecDeque::from([initial_closure]);
    while let Some(current) = worklist.pop_front() {
        let current_state = state_mapping[&current];

        for symbol in nfa.alphabet() {
            let closed = nfa.lambda_closure(&nfa.move_on_symbol(&current, symbol));

            if closed.is_empty() {
                continue;
            }

            let next_state = match state_mapping.get(&closed) {
                Some(&existing) => existing,
                None => {
                    let name = format!("q{}", state_mapping.len());
                    let is_final = closed.intersects(nfa.final_states());
                    let state = builder.add_state(&name, false, is_final);
                    trace!("Discovered {name} for {closed:?}");

                    state_mapping.insert(closed.clone(), state);
                    subsets.push(closed.clone());
                    worklist.push_back(closed);
                    state
                }
            };

            builder.add_transition(current_state, symbol, next_state);
        }
    }

    let dfa = builder.finish();
    debug!(
        "Subset construction resulted in {} states and {} transitions from {} states",
        dfa.num_of_states(),
        dfa.num_of_transitions(),
        nfa.num_of_states()
    );

    SubsetConstruction { dfa, subsets }
}
