//! Import of automata in the XML format of JFLAP (`.jff` files).

use log::info;
use log::trace;
use log::warn;
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::Determinism;
use crate::Dfa;
use crate::DfaBuilder;
use crate::Nfa;
use crate::NfaBuilder;
use crate::ReferencePolicy;
use crate::StateIndex;

#[derive(Parser)]
#[grammar = "jff.pest"]
pub struct JffParser;

#[derive(Error, Debug)]
pub enum JffError {
    #[error("Invalid .jff document\n{0}")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),

    #[error("A <{element}> element is missing its {part}")]
    Missing { element: &'static str, part: &'static str },

    #[error("Transition {from} -> {to} refers to unknown state id \"{id}\"")]
    UnknownState { from: String, to: String, id: String },

    #[error("State \"{state}\" has multiple transitions with symbol \"{symbol}\"")]
    NonDeterministic { state: String, symbol: String },

    #[error("State \"{state}\" has an epsilon transition, which is not allowed in a DFA")]
    EpsilonTransition { state: String },
}

/// An element of the parsed document, text and CDATA sections are both
/// stored as (decoded) text.
#[derive(Debug, Default)]
struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

#[derive(Debug)]
enum XmlNode {
    Element(XmlElement),
    Text(String),
}

impl XmlElement {
    fn from_pair(pair: Pair<'_, Rule>) -> XmlElement {
        debug_assert_eq!(pair.as_rule(), Rule::element);

        let mut element = XmlElement::default();
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::name => element.name = inner.as_str().to_string(),
                Rule::attribute => {
                    let mut parts = inner.into_inner();
                    if let (Some(name), Some(value)) = (parts.next(), parts.next()) {
                        element
                            .attributes
                            .push((name.as_str().to_string(), unescape(value.as_str())));
                    }
                }
                Rule::element => element.children.push(XmlNode::Element(XmlElement::from_pair(inner))),
                Rule::text => element.children.push(XmlNode::Text(unescape(inner.as_str()))),
                Rule::cdata => {
                    let text = inner.into_inner().next().map(|text| text.as_str()).unwrap_or_default();
                    element.children.push(XmlNode::Text(text.to_string()));
                }
                _ => unreachable!("Unexpected rule {:?} in element", inner.as_rule()),
            }
        }

        element
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the first direct child element with the given name.
    fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find_map(|node| match node {
            XmlNode::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }

    /// Returns the concatenated text content of this element.
    fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Collects all elements below this one with the given name in document order.
    fn descendants<'a>(&'a self, name: &str, result: &mut Vec<&'a XmlElement>) {
        for node in &self.children {
            if let XmlNode::Element(element) = node {
                if element.name == name {
                    result.push(element);
                }
                element.descendants(name, result);
            }
        }
    }
}

/// Decodes the predefined and numeric character entities, unknown entities are kept as is.
fn unescape(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('&') {
        result.push_str(&rest[..start]);
        rest = &rest[start..];

        let decoded = rest.find(';').and_then(|end| {
            let character = match &rest[1..end] {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                entity => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                    .and_then(Result::ok)
                    .and_then(char::from_u32),
            };
            character.map(|character| (character, end))
        });

        match decoded {
            Some((character, end)) => {
                result.push(character);
                rest = &rest[end + 1..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// A state as declared in the document.
struct JffState {
    id: String,
    name: String,
    is_initial: bool,
    is_final: bool,
}

/// A transition as declared in the document, the symbol is empty for epsilon.
struct JffTransition {
    from: String,
    to: String,
    symbol: String,
}

/// The automaton described by a document, before its states are resolved.
struct JffAutomaton {
    states: Vec<JffState>,
    transitions: Vec<JffTransition>,
}

/// Parses the document and extracts the states and transitions.
fn parse_jff(content: &str) -> Result<JffAutomaton, JffError> {
    let mut document = JffParser::parse(Rule::document, content).map_err(Box::new)?;

    let root = document
        .next()
        .and_then(|document| document.into_inner().find(|pair| pair.as_rule() == Rule::element))
        .map(XmlElement::from_pair)
        .ok_or(JffError::Missing {
            element: "document",
            part: "root element",
        })?;

    let mut state_elements = Vec::new();
    root.descendants("state", &mut state_elements);

    let mut states = Vec::new();
    for element in state_elements {
        let id = element.attribute("id").ok_or(JffError::Missing {
            element: "state",
            part: "id attribute",
        })?;

        states.push(JffState {
            id: id.to_string(),
            name: element.attribute("name").unwrap_or(id).to_string(),
            is_initial: element.child("initial").is_some(),
            is_final: element.child("final").is_some(),
        });
    }

    let mut transition_elements = Vec::new();
    root.descendants("transition", &mut transition_elements);

    let mut transitions = Vec::new();
    for element in transition_elements {
        let from = element.child("from").ok_or(JffError::Missing {
            element: "transition",
            part: "<from> element",
        })?;
        let to = element.child("to").ok_or(JffError::Missing {
            element: "transition",
            part: "<to> element",
        })?;

        transitions.push(JffTransition {
            from: from.text().trim().to_string(),
            to: to.text().trim().to_string(),
            symbol: element.child("read").map(XmlElement::text).unwrap_or_default(),
        });
    }

    trace!(
        "Parsed {} states and {} transitions",
        states.len(),
        transitions.len()
    );
    Ok(JffAutomaton { states, transitions })
}

/// Looks up the states of a transition, returns `None` when the transition
/// must be skipped.
fn resolve(
    ids: &FxHashMap<&str, StateIndex>,
    transition: &JffTransition,
    policy: ReferencePolicy,
) -> Result<Option<(StateIndex, StateIndex)>, JffError> {
    match (ids.get(transition.from.as_str()), ids.get(transition.to.as_str())) {
        (Some(&from), Some(&to)) => Ok(Some((from, to))),
        (from, _) => {
            let id = if from.is_none() { &transition.from } else { &transition.to };
            match policy {
                ReferencePolicy::Skip => {
                    warn!(
                        "Skipping transition {} -> {}, state id \"{id}\" does not exist",
                        transition.from, transition.to
                    );
                    Ok(None)
                }
                ReferencePolicy::Fail => Err(JffError::UnknownState {
                    from: transition.from.clone(),
                    to: transition.to.clone(),
                    id: id.clone(),
                }),
            }
        }
    }
}

/// Reads a non-deterministic automaton from the content of a `.jff` file.
///
/// The states are the `state` elements at any depth of the document, named by
/// their `name` attribute or otherwise their `id`, and marked by `initial` and
/// `final` child elements. The `transition` elements refer to the state ids in
/// their `from` and `to` children, a missing or empty `read` child denotes an
/// epsilon transition. When a state id occurs multiple times the last state
/// with that id is used.
pub fn read_jff_nfa(content: &str, policy: ReferencePolicy) -> Result<Nfa, JffError> {
    info!("Reading NFA in .jff format...");

    let automaton = parse_jff(content)?;
    let mut builder = NfaBuilder::new();

    let mut ids: FxHashMap<&str, StateIndex> = FxHashMap::default();
    for state in &automaton.states {
        let index = builder.add_state(&state.name, state.is_initial, state.is_final);
        ids.insert(state.id.as_str(), index);
    }

    for transition in &automaton.transitions {
        if let Some((from, to)) = resolve(&ids, transition, policy)? {
            builder.add_transition(from, &transition.symbol, to);
        }
    }

    info!("Finished reading NFA");
    Ok(builder.finish())
}

/// Reads a deterministic automaton from the content of a `.jff` file, see
/// [`read_jff_nfa`] for the interpretation of the document. The determinism
/// argument decides whether epsilon transitions and multiple transitions with
/// the same source and symbol are rejected or resolved.
pub fn read_jff_dfa(content: &str, policy: ReferencePolicy, determinism: Determinism) -> Result<Dfa, JffError> {
    info!("Reading DFA in .jff format...");

    let automaton = parse_jff(content)?;
    let mut builder = DfaBuilder::new();

    let mut ids: FxHashMap<&str, StateIndex> = FxHashMap::default();
    for state in &automaton.states {
        let index = builder.add_state(&state.name, state.is_initial, state.is_final);
        ids.insert(state.id.as_str(), index);
    }

    for transition in &automaton.transitions {
        let Some((from, to)) = resolve(&ids, transition, policy)? else {
            continue;
        };

        let state = builder.state(from).name().to_string();
        if transition.symbol.is_empty() {
            match determinism {
                Determinism::Strict => return Err(JffError::EpsilonTransition { state }),
                Determinism::LastTransitionWins => {
                    warn!("Dropping epsilon transition from state \"{state}\"");
                    continue;
                }
            }
        }

        if builder.transition(from, &transition.symbol).is_some_and(|existing| existing != to) {
            match determinism {
                Determinism::Strict => {
                    return Err(JffError::NonDeterministic {
                        state,
                        symbol: transition.symbol.clone(),
                    });
                }
                Determinism::LastTransitionWins => {
                    warn!(
                        "Transition from state \"{state}\" with symbol \"{}\" overwrites an earlier one",
                        transition.symbol
                    );
                }
            }
        }

        builder.add_transition(from, &transition.symbol, to);
    }

    info!("Finished reading DFA");
    Ok(builder.finish())
}
