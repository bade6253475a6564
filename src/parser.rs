//! This module provides the parser for machine definition files, utilizing
//! the `pest` crate. It defines functions to parse the `.tm` text format
//! into a `Definition` struct.

use crate::types::{Definition, Direction, MachineError, Transition, DEFAULT_BLANK_SYMBOL};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::{HashMap, HashSet};

/// Derives a `PestParser` for the definition grammar in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct DefinitionParser;

/// Parses the given input string into a `Definition`.
///
/// This is the main entry point for parsing machine definitions. The
/// `states`, `start`, `accept` and `reject` sections may be omitted: states
/// are inferred from the rules, the start state defaults to the first state
/// block, and the accept/reject roles default to the labels `accept` and
/// `reject`. The parsed definition is validated before being returned.
///
/// # Returns
///
/// * `Ok(Definition)` if the input is successfully parsed and validated.
/// * `Err(MachineError::ParseError)` if there are any syntax errors.
/// * `Err(MachineError::InvalidDefinition)` if a required section is missing
///   or the role states violate the construction constraints.
pub fn parse(input: &str) -> Result<Definition, MachineError> {
    let root = DefinitionParser::parse(Rule::program, input.trim())
        .map_err(|e| MachineError::ParseError(e.into()))? //
        .next()
        .unwrap();

    let definition = parse_definition(root)?;

    definition.validate()?;

    Ok(definition)
}

/// Parses the top-level structure of a definition from a
/// `Pair<Rule::program>`, applying the documented section defaults.
fn parse_definition(pair: Pair<Rule>) -> Result<Definition, MachineError> {
    let mut name: Option<String> = None;
    let mut blank: Option<char> = None;
    let mut input: Option<String> = None;
    let mut declared_states: Option<HashSet<String>> = None;
    let mut start: Option<String> = None;
    let mut accept: Option<String> = None;
    let mut reject: Option<String> = None;
    let mut transitions: Option<HashMap<String, Vec<Transition>>> = None;
    let mut first_state: Option<String> = None;
    let mut seen = HashSet::new();

    // Parse top-level sections
    for p in pair.into_inner() {
        let span = p.as_span();
        let rule = p.as_rule();

        check_unique_rule(rule, span, &mut seen)?;

        match rule {
            Rule::name => name = Some(parse_inner_string(p)),
            Rule::blank => blank = Some(parse_symbol(&parse_inner_string(p))),
            Rule::tape => input = Some(parse_tape(p)),
            Rule::states => declared_states = Some(parse_states(p)),
            Rule::start => start = Some(parse_inner_string(p)),
            Rule::accept => accept = Some(parse_inner_string(p)),
            Rule::reject => reject = Some(parse_inner_string(p)),
            Rule::rules => transitions = Some(parse_transitions(p, &mut first_state)?),
            _ => {} // Skip other rules
        }
    }

    // Handle mandatory checks and defaults
    let name = check_required_rule(name, "name")?;
    let transitions = check_required_rule(transitions, "rules")?;
    let blank = blank.unwrap_or(DEFAULT_BLANK_SYMBOL);
    let input = input.unwrap_or_default();

    let start_state = match start {
        Some(state) => state,
        None => first_state.ok_or_else(|| {
            MachineError::InvalidDefinition(
                "Missing 'start' section and no rules to infer it from".to_string(),
            )
        })?,
    };
    let accept_state = accept.unwrap_or_else(|| "accept".to_string());
    let reject_state = reject.unwrap_or_else(|| "reject".to_string());

    let states = declared_states.unwrap_or_else(|| {
        infer_states(&transitions, [&start_state, &accept_state, &reject_state])
    });

    Ok(Definition {
        name,
        states,
        start_state,
        accept_state,
        reject_state,
        blank,
        input,
        transitions,
    })
}

/// Collects every state mentioned by the rules plus the role states.
fn infer_states(
    transitions: &HashMap<String, Vec<Transition>>,
    roles: [&String; 3],
) -> HashSet<String> {
    let mut states: HashSet<String> = transitions.keys().cloned().collect();
    states.extend(
        transitions
            .values()
            .flatten()
            .map(|t| t.next_state.clone()),
    );
    states.extend(roles.into_iter().cloned());

    states
}

/// Parses the rules section from a `Pair<Rule::rules>`.
///
/// The first state block encountered becomes the inferred start state.
/// Duplicate state blocks and duplicate read symbols within a block are
/// rejected, keeping the transition table deterministic.
fn parse_transitions(
    pair: Pair<Rule>,
    first_state: &mut Option<String>,
) -> Result<HashMap<String, Vec<Transition>>, MachineError> {
    let mut transitions = HashMap::new();

    for block in pair.into_inner() {
        if block.as_rule() != Rule::state_block {
            continue;
        }

        let span = block.as_span();
        let (state, rules) = parse_state_block(block)?;

        if first_state.is_none() {
            *first_state = Some(state.clone());
        }

        // Prevent duplicated state blocks
        if transitions.contains_key(&state) {
            return Err(parse_error(
                &format!("Duplicate rules for state: {state}"),
                span,
            ));
        }

        transitions.insert(state, rules);
    }

    Ok(transitions)
}

/// Parses a single state block into its state label and transition rules.
fn parse_state_block(pair: Pair<Rule>) -> Result<(String, Vec<Transition>), MachineError> {
    let mut pairs = pair.into_inner();
    let state = pairs
        .next()
        .unwrap() // state_name, guaranteed by the grammar
        .into_inner()
        .next()
        .unwrap()
        .as_str()
        .to_string();

    let mut seen_reads = HashSet::new();
    let mut rules = Vec::new();

    for p in pairs {
        if p.as_rule() != Rule::rule_line {
            continue;
        }

        let span = p.as_span();
        let transition = parse_rule_line(p)?;

        // At most one transition per (state, read symbol) pair
        if !seen_reads.insert(transition.read) {
            return Err(parse_error(
                &format!(
                    "Duplicate transition for state '{}' reading '{}'",
                    state, transition.read
                ),
                span,
            ));
        }

        rules.push(transition);
    }

    Ok((state, rules))
}

/// Parses a `read -> write, direction, next_state` line.
fn parse_rule_line(pair: Pair<Rule>) -> Result<Transition, MachineError> {
    let mut pairs = pair.into_inner();
    let read = parse_symbol(pairs.next().unwrap().as_str());
    let write = parse_symbol(pairs.next().unwrap().as_str());
    let direction = parse_direction(pairs.next().unwrap())?;
    let next_state = pairs.next().unwrap().as_str().to_string();

    Ok(Transition {
        read,
        write,
        direction,
        next_state,
    })
}

/// Parses the initial tape contents from a `Pair<Rule::tape>`.
fn parse_tape(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .flat_map(|symbols| symbols.into_inner())
        .filter(|p| p.as_rule() == Rule::symbol)
        .map(|p| parse_symbol(p.as_str()))
        .collect()
}

/// Parses the declared state set from a `Pair<Rule::states>`.
fn parse_states(pair: Pair<Rule>) -> HashSet<String> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::ident)
        .map(|p| p.as_str().to_string())
        .collect()
}

/// Parses a single direction marker.
///
/// Supports '<' or 'L' for Left, '>' or 'R' for Right, and '-' or 'S' for Stay.
fn parse_direction(pair: Pair<Rule>) -> Result<Direction, MachineError> {
    let span = pair.as_span();
    match pair.as_str() {
        "<" | "L" => Ok(Direction::Left),
        ">" | "R" => Ok(Direction::Right),
        "-" | "S" => Ok(Direction::Stay),
        _ => Err(parse_error(
            &format!("Unsupported direction: {}", pair.as_str()),
            span,
        )),
    }
}

/// Parses a single character symbol from a string.
fn parse_symbol(input: &str) -> char {
    input.chars().next().unwrap_or(DEFAULT_BLANK_SYMBOL)
}

/// Extracts the inner string content from a `Pair`.
fn parse_inner_string(pair: Pair<Rule>) -> String {
    pair.into_inner().next().unwrap().as_str().trim().into()
}

/// Creates a `MachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> MachineError {
    MachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Checks if a given section has already been declared, ensuring uniqueness
/// of top-level sections.
fn check_unique_rule(rule: Rule, span: Span, seen: &mut HashSet<Rule>) -> Result<(), MachineError> {
    if !matches!(
        rule,
        Rule::name
            | Rule::blank
            | Rule::tape
            | Rule::states
            | Rule::start
            | Rule::accept
            | Rule::reject
            | Rule::rules
    ) {
        return Ok(());
    };

    if seen.contains(&rule) {
        return Err(parse_error(
            &format!("Duplicate \"{rule:?}:\" declaration"),
            span,
        ));
    }

    seen.insert(rule);

    Ok(())
}

/// Checks if a required section is present, returning an `Err` if missing.
fn check_required_rule<T>(value: Option<T>, name: &str) -> Result<T, MachineError> {
    value.ok_or_else(|| MachineError::InvalidDefinition(format!("Missing '{name}' section")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::Machine;
    use crate::types::{Outcome, DEFAULT_MAX_STEPS};

    const UNARY: &str = r#"
name: Unary Recognizer
tape: 111
states: q0, q1, qa, qr
start: q0
accept: qa
reject: qr
rules:
  q0:
    1 -> X, R, q1
  q1:
    1 -> 1, R, q1
    _ -> _, S, qa
"#;

    #[test]
    fn test_parse_full_definition() {
        let definition = parse(UNARY).unwrap();

        assert_eq!(definition.name, "Unary Recognizer");
        assert_eq!(definition.input, "111");
        assert_eq!(definition.start_state, "q0");
        assert_eq!(definition.accept_state, "qa");
        assert_eq!(definition.reject_state, "qr");
        assert_eq!(definition.blank, DEFAULT_BLANK_SYMBOL);
        assert_eq!(definition.states.len(), 4);
        assert_eq!(
            definition.transitions["q0"][0],
            Transition {
                read: '1',
                write: 'X',
                direction: Direction::Right,
                next_state: "q1".into(),
            }
        );
        assert_eq!(definition.transitions["q1"].len(), 2);
    }

    #[test]
    fn test_parsed_definition_runs_to_acceptance() {
        let definition = parse(UNARY).unwrap();
        let mut machine = Machine::new(definition).unwrap();

        let outcome = machine.run(DEFAULT_MAX_STEPS).unwrap();

        match outcome {
            Outcome::Accepted(snapshot) => {
                assert_eq!(snapshot.head, 3);
                assert_eq!(&snapshot.tape[..4], &['X', '1', '1', '_']);
            }
            other => panic!("Expected Accepted, got {:?}", other),
        }
    }

    #[test]
    fn test_states_and_roles_are_inferred_when_omitted() {
        let input = r#"
name: Inferred
tape: a
rules:
  begin:
    a -> b, R, accept
"#;

        let definition = parse(input).unwrap();

        assert_eq!(definition.start_state, "begin");
        assert_eq!(definition.accept_state, "accept");
        assert_eq!(definition.reject_state, "reject");
        for state in ["begin", "accept", "reject"] {
            assert!(definition.states.contains(state), "missing {state}");
        }
    }

    #[test]
    fn test_custom_blank_symbol() {
        let input = r#"
name: Custom Blank
blank: 0
tape: 1
rules:
  start:
    1 -> 1, R, accept
"#;

        let definition = parse(input).unwrap();
        assert_eq!(definition.blank, '0');
    }

    #[test]
    fn test_empty_tape_section() {
        let input = r#"
name: Empty Tape
tape:
rules:
  start:
    _ -> _, S, accept
"#;

        let definition = parse(input).unwrap();
        assert_eq!(definition.input, "");
    }

    #[test]
    fn test_missing_tape_section_defaults_to_empty() {
        let input = r#"
name: No Tape
rules:
  start:
    _ -> _, S, accept
"#;

        let definition = parse(input).unwrap();
        assert_eq!(definition.input, "");
    }

    #[test]
    fn test_alternate_direction_markers() {
        let input = r#"
name: Markers
tape: ab
rules:
  start:
    a -> a, >, mid
  mid:
    b -> b, <, last
  last:
    a -> a, -, accept
"#;

        let definition = parse(input).unwrap();
        assert_eq!(definition.transitions["start"][0].direction, Direction::Right);
        assert_eq!(definition.transitions["mid"][0].direction, Direction::Left);
        assert_eq!(definition.transitions["last"][0].direction, Direction::Stay);
    }

    #[test]
    fn test_comments_and_blank_lines_are_ignored() {
        let input = r#"
# A machine with commentary.
name: Commented

tape: 1

rules:
  # scan a single one
  start:
    1 -> 1, R, accept
"#;

        let definition = parse(input).unwrap();
        assert_eq!(definition.name, "Commented");
        assert_eq!(definition.transitions["start"].len(), 1);
    }

    #[test]
    fn test_duplicate_section_is_rejected() {
        let input = r#"
name: First
name: Second
tape: a
rules:
  start:
    a -> a, R, accept
"#;

        let error = parse(input).unwrap_err();
        assert!(matches!(error, MachineError::ParseError(_)));
        assert!(format!("{error}").contains("Duplicate"));
    }

    #[test]
    fn test_duplicate_state_block_is_rejected() {
        let input = r#"
name: Duplicated State
tape: a
rules:
  start:
    a -> a, R, accept
  start:
    a -> b, L, reject
"#;

        let error = parse(input).unwrap_err();
        assert!(format!("{error}").contains("Duplicate rules for state: start"));
    }

    #[test]
    fn test_duplicate_read_in_state_block_is_rejected() {
        let input = r#"
name: Nondeterministic
tape: a
rules:
  start:
    a -> a, R, accept
    a -> b, L, reject
"#;

        let error = parse(input).unwrap_err();
        assert!(format!("{error}").contains("Duplicate transition for state 'start' reading 'a'"));
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let input = r#"
tape: a
rules:
  start:
    a -> a, R, accept
"#;

        let error = parse(input).unwrap_err();
        assert_eq!(
            error,
            MachineError::InvalidDefinition("Missing 'name' section".to_string())
        );
    }

    #[test]
    fn test_explicit_states_missing_a_role_is_rejected() {
        let input = r#"
name: Missing Role
tape: a
states: start, accept
rules:
  start:
    a -> a, R, accept
"#;

        let error = parse(input).unwrap_err();
        assert!(matches!(error, MachineError::InvalidDefinition(_)));
    }

    #[test]
    fn test_accept_equal_to_reject_is_rejected() {
        let input = r#"
name: Conflated Roles
tape: a
accept: done
reject: done
rules:
  start:
    a -> a, R, done
"#;

        let error = parse(input).unwrap_err();
        assert!(matches!(error, MachineError::InvalidDefinition(_)));
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        let error = parse("This is not a valid definition").unwrap_err();
        assert!(matches!(error, MachineError::ParseError(_)));
    }
}
