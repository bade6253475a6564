//! This module defines the core data structures and types used throughout the
//! Turing machine engine, including machine definitions, transitions, outcome
//! classification, snapshots, and error types.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::Rule;

/// The default blank symbol used on the tape when a definition omits one.
pub const DEFAULT_BLANK_SYMBOL: char = '_';
/// Trailing blanks appended to the initial tape contents at load time,
/// amortizing reallocation during early rightward movement. On-demand
/// extension is what actually keeps the tape unbounded.
pub const TAPE_LOAD_PADDING: usize = 10;
/// The default step budget used by drivers that do not specify one.
pub const DEFAULT_MAX_STEPS: usize = 10_000;

/// A complete single-tape Turing machine definition.
///
/// A definition declares the state set with its three distinguished roles
/// (start, accept, reject), the blank symbol, the initial tape contents,
/// and the deterministic transition table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Definition {
    /// The name of the machine.
    pub name: String,
    /// The finite set of states. Must contain the three role states.
    pub states: HashSet<String>,
    /// The state the machine starts in, with the head at index 0.
    pub start_state: String,
    /// Reaching this state terminates a run with `Outcome::Accepted`.
    pub accept_state: String,
    /// Reaching this state terminates a run with `Outcome::Rejected`.
    pub reject_state: String,
    /// The blank symbol padding every untouched tape cell.
    pub blank: char,
    /// The initial tape contents, possibly empty.
    pub input: String,
    /// The transition table, grouped by source state. At most one
    /// transition per (state, read symbol) pair.
    pub transitions: HashMap<String, Vec<Transition>>,
}

impl Definition {
    /// Finds the transition for the given state and read symbol.
    ///
    /// Returns `None` when the table has no entry for the pair, which the
    /// engine reports as the `Halted` outcome rather than an error.
    pub fn lookup(&self, state: &str, symbol: char) -> Option<&Transition> {
        self.transitions
            .get(state)?
            .iter()
            .find(|t| t.read == symbol)
    }

    /// Checks the construction constraints: the three role states must be
    /// members of the state set, and accept must differ from reject.
    pub fn validate(&self) -> Result<(), MachineError> {
        for (role, state) in [
            ("start", &self.start_state),
            ("accept", &self.accept_state),
            ("reject", &self.reject_state),
        ] {
            if !self.states.contains(state) {
                return Err(MachineError::InvalidDefinition(format!(
                    "{} state '{}' is not a member of the state set",
                    role, state
                )));
            }
        }

        if self.accept_state == self.reject_state {
            return Err(MachineError::InvalidDefinition(format!(
                "accept and reject states must differ, both are '{}'",
                self.accept_state
            )));
        }

        Ok(())
    }
}

/// A single transition rule.
///
/// When the machine is in the rule's source state and reads `read` under
/// the head, it writes `write`, moves the head in `direction`, and enters
/// `next_state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The symbol the head must read for this rule to apply.
    pub read: char,
    /// The symbol written at the head position.
    pub write: char,
    /// The head movement applied after writing.
    pub direction: Direction,
    /// The state the machine transitions to.
    pub next_state: String,
}

/// The possible head movements after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

/// The outcome of a single execution step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A transition was applied; the snapshot shows the configuration
    /// after it.
    Continued(Snapshot),
    /// No transition matched the current (state, symbol) pair. The
    /// configuration is unchanged. This is a terminal condition, distinct
    /// from rejection.
    Halted,
}

/// The terminal outcome of a bounded run, each carrying the final
/// configuration snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// The machine reached its accept state.
    Accepted(Snapshot),
    /// The machine reached its reject state.
    Rejected(Snapshot),
    /// No transition matched; see [`Step::Halted`].
    Halted(Snapshot),
    /// The step budget ran out before any terminal condition.
    StepLimitExceeded(Snapshot),
}

impl Outcome {
    /// The snapshot of the configuration the run terminated in.
    pub fn snapshot(&self) -> &Snapshot {
        match self {
            Outcome::Accepted(s)
            | Outcome::Rejected(s)
            | Outcome::Halted(s)
            | Outcome::StepLimitExceeded(s) => s,
        }
    }

    /// The payload-free classification of this outcome.
    pub fn termination(&self) -> Termination {
        match self {
            Outcome::Accepted(_) => Termination::Accepted,
            Outcome::Rejected(_) => Termination::Rejected,
            Outcome::Halted(_) => Termination::Halted,
            Outcome::StepLimitExceeded(_) => Termination::StepLimitExceeded,
        }
    }
}

/// The four ways a machine stops. Recorded by the engine once reached;
/// stepping a machine that carries one is a caller error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    Accepted,
    Rejected,
    Halted,
    StepLimitExceeded,
}

/// A read-only observation of the machine configuration, exposed after
/// every step for external consumers (console printers, visualizers).
/// Observers cannot mutate engine state through it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The current state label.
    pub state: String,
    /// The materialized tape contents. Cells the head never visited stay
    /// implicitly blank and do not appear here.
    pub tape: Vec<char>,
    /// The head index into `tape`.
    pub head: usize,
    /// The transition applied by the step that produced this snapshot,
    /// absent on the entry snapshot.
    pub applied: Option<AppliedTransition>,
}

/// The (read, write, movement) triple of the most recently applied
/// transition, as seen by observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedTransition {
    /// The symbol that was under the head.
    pub read: char,
    /// The symbol written over it.
    pub write: char,
    /// The head movement that followed.
    pub direction: Direction,
}

/// Represents various errors that can occur during Turing machine
/// operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineError {
    /// The definition violates a construction constraint: a role state is
    /// missing from the state set, or accept equals reject.
    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),
    /// `step()` or `run()` was invoked on a machine whose last recorded
    /// outcome was already terminal.
    #[error("Machine already terminated: {0:?}")]
    PreconditionViolation(Termination),
    /// Indicates an error during the parsing of a machine definition.
    #[error("Definition parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates an error related to file system operations, such as
    /// reading definition files.
    #[error("File error: {0}")]
    FileError(String),
}
