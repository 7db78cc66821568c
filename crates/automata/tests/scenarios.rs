use indoc::indoc;
use rand::Rng;

use fasim_automata::Automaton;
use fasim_automata::Determinism;
use fasim_automata::Dfa;
use fasim_automata::DfaBuilder;
use fasim_automata::NfaBuilder;
use fasim_automata::ReferencePolicy;
use fasim_automata::TransitionTable;
use fasim_automata::random_nfa;
use fasim_automata::random_string;
use fasim_automata::read_afd;
use fasim_automata::read_jff_dfa;
use fasim_automata::read_jff_nfa;
use fasim_automata::write_afd;
use fasim_utilities::random_test;
use fasim_utilities::test_logger;

/// Accepts the strings over {a, b} that end with an a.
const ENDS_WITH_A: &str = indoc! {r#"
    <?xml version="1.0" encoding="UTF-8" standalone="no"?>
    <structure>
        <type>fa</type>
        <automaton>
            <state id="0" name="q0"><initial/></state>
            <state id="1" name="q1"><final/></state>
            <transition><from>0</from><to>1</to><read>a</read></transition>
            <transition><from>0</from><to>0</to><read>b</read></transition>
            <transition><from>1</from><to>1</to><read>a</read></transition>
            <transition><from>1</from><to>0</to><read>b</read></transition>
        </automaton>
    </structure>
"#};

#[test]
fn test_ends_with_a() {
    test_logger();

    let dfa = read_jff_dfa(ENDS_WITH_A, ReferencePolicy::Fail, Determinism::Strict).unwrap();
    let q0 = dfa.get_state_by_name("q0");

    let result = dfa.validate_string("aab");
    assert!(!result.accepted);
    assert_eq!(result.last_step().unwrap().state, q0);

    assert!(dfa.validate_string("ba").accepted);
    assert!(!dfa.validate_string("").accepted);
}

#[test]
fn test_epsilon_conversion() {
    test_logger();

    let mut builder = NfaBuilder::new();
    let q0 = builder.add_state("q0", true, false);
    let q1 = builder.add_state("q1", false, true);
    builder.add_epsilon_transition(q0, q1);
    builder.add_transition(q1, "a", q1);
    let nfa = builder.finish();

    let dfa = nfa.to_dfa();
    let initial = dfa.initial_state().unwrap();
    assert!(dfa.is_final(initial));
    assert!(dfa.validate_string("").accepted);
}

#[test]
fn test_stuck_dfa() {
    test_logger();

    let mut builder = DfaBuilder::new();
    let q0 = builder.add_state("q0", true, true);
    builder.add_transition(q0, "a", q0);
    let dfa = builder.finish();

    let result = dfa.validate_string("aba");
    assert!(!result.accepted);

    let last = result.last_step().unwrap();
    assert_eq!(last.state, None);
    assert_eq!(last.position, 2);
    assert_eq!(last.remaining, "a");
}

#[test]
fn test_jff_to_afd() {
    test_logger();

    let nfa = read_jff_nfa(ENDS_WITH_A, ReferencePolicy::Fail).unwrap();
    let dfa = nfa.to_dfa();

    let mut buffer: Vec<u8> = Vec::new();
    write_afd(&mut buffer, &dfa).unwrap();
    let dfa_read: Dfa = read_afd(&buffer[..], ReferencePolicy::Fail).unwrap();

    assert_eq!(
        TransitionTable::from_dfa(&dfa).to_string(),
        TransitionTable::from_dfa(&dfa_read).to_string()
    );

    for input in ["", "a", "b", "ab", "ba", "abba", "bbbba"] {
        assert_eq!(nfa.accepts(input), dfa_read.accepts(input), "Disagree on {input:?}");
    }
}

#[test]
fn test_random_conversion_round_trip() {
    random_test(50, |rng| {
        let nfa = random_nfa(rng, 5, 2, 3);
        let dfa = nfa.to_dfa();

        let mut buffer: Vec<u8> = Vec::new();
        write_afd(&mut buffer, &dfa).unwrap();
        let dfa_read = read_afd(&buffer[..], ReferencePolicy::Fail).unwrap();

        for _ in 0..20 {
            let length = rng.random_range(0..7);
            let input = random_string(rng, nfa.alphabet(), length);
            assert_eq!(nfa.accepts(&input), dfa_read.accepts(&input), "Disagree on {input:?}");
        }
    });
}
