use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::IteratorRandom;

use crate::Dfa;
use crate::DfaBuilder;
use crate::EPSILON;
use crate::Nfa;
use crate::NfaBuilder;
use crate::StateIndex;

/// Returns the lower case letters used as the symbols of random automata.
fn random_symbols(num_of_symbols: u32) -> Vec<String> {
    assert!(
        num_of_symbols <= 26,
        "Too many symbols requested, we only support alphabetic symbols."
    );

    (0..num_of_symbols)
        .map(|i| {
            char::from_digit(i + 10, 36)
                .expect("Radix is less than 37, so should not panic")
                .to_string()
        })
        .collect()
}

/// Generates a random DFA with the given number of states and symbols. Every
/// state has at most `outdegree` outgoing transitions, state `q0` is the
/// initial state and every state is final with probability one half.
pub fn random_dfa(rng: &mut impl Rng, num_of_states: usize, num_of_symbols: u32, outdegree: usize) -> Dfa {
    assert!(num_of_states > 0, "A random automaton has at least the initial state");
    let symbols = random_symbols(num_of_symbols);

    let mut builder = DfaBuilder::new();
    for i in 0..num_of_states {
        builder.add_state(&format!("q{i}"), i == 0, rng.random_bool(0.5));
    }

    for from in 0..num_of_states {
        for _ in 0..rng.random_range(0..=outdegree) {
            let symbol = &symbols[rng.random_range(0..symbols.len())];
            let to = rng.random_range(0..num_of_states);

            builder.add_transition(StateIndex::new(from), symbol, StateIndex::new(to));
        }
    }

    builder.finish()
}

/// Generates a random NFA with the given number of states and symbols, where
/// roughly one in four transitions is an epsilon transition.
pub fn random_nfa(rng: &mut impl Rng, num_of_states: usize, num_of_symbols: u32, outdegree: usize) -> Nfa {
    assert!(num_of_states > 0, "A random automaton has at least the initial state");
    let symbols = random_symbols(num_of_symbols);

    let mut builder = NfaBuilder::new();
    for i in 0..num_of_states {
        builder.add_state(&format!("q{i}"), i == 0, rng.random_bool(0.3));
    }

    for from in 0..num_of_states {
        for _ in 0..rng.random_range(0..=outdegree) {
            let to = rng.random_range(0..num_of_states);

            if rng.random_bool(0.25) {
                builder.add_transition(StateIndex::new(from), EPSILON, StateIndex::new(to));
            } else {
                let symbol = &symbols[rng.random_range(0..symbols.len())];
                builder.add_transition(StateIndex::new(from), symbol, StateIndex::new(to));
            }
        }
    }

    builder.finish()
}

/// Generates a random string of the given length over the given alphabet. The
/// string is empty when the alphabet is.
pub fn random_string(rng: &mut impl Rng, alphabet: &BTreeSet<String>, length: usize) -> String {
    let mut result = String::new();
    for _ in 0..length {
        match alphabet.iter().choose(rng) {
            Some(symbol) => result.push_str(symbol),
            None => break,
        }
    }

    result
}
