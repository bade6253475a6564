//! This module defines the `Machine` struct, the deterministic single-tape
//! Turing machine engine. It owns the machine definition and current
//! configuration, advances the configuration one transition at a time, and
//! classifies run outcomes.

use crate::tape::Tape;
use crate::types::{
    AppliedTransition, Definition, Direction, MachineError, Outcome, Snapshot, Step, Termination,
};

/// A deterministic single-tape Turing machine.
///
/// The machine exclusively owns its definition and configuration (current
/// state, tape, head index). Each step is atomic with respect to the
/// machine's own state; concurrent simulations use independent instances.
#[derive(Debug, Clone)]
pub struct Machine {
    definition: Definition,
    state: String,
    tape: Tape,
    head: usize,
    step_count: usize,
    applied: Option<AppliedTransition>,
    termination: Option<Termination>,
}

impl Machine {
    /// Creates a new `Machine` from a definition, with the head at index 0,
    /// the current state set to the start state, and the tape loaded from
    /// the definition's initial contents.
    ///
    /// # Errors
    ///
    /// Returns `MachineError::InvalidDefinition` when a role state is not a
    /// member of the state set or the accept and reject states coincide.
    pub fn new(definition: Definition) -> Result<Self, MachineError> {
        definition.validate()?;

        let tape = Tape::from_input(&definition.input, definition.blank);
        Ok(Self {
            state: definition.start_state.clone(),
            tape,
            head: 0,
            step_count: 0,
            applied: None,
            termination: None,
            definition,
        })
    }

    /// Creates a new `Machine` with the definition's initial tape contents
    /// replaced by `input`. Driver convenience; validation is identical to
    /// [`Machine::new`].
    pub fn with_input(mut definition: Definition, input: &str) -> Result<Self, MachineError> {
        definition.input = input.to_string();
        Self::new(definition)
    }

    /// Executes a single step of the machine's computation.
    ///
    /// In strict order: reads the symbol under the head (materializing the
    /// cell on demand), looks up a transition for the current
    /// (state, symbol) pair, and either applies it or reports `Halted`.
    /// A missing transition is a normal terminal outcome, not an error,
    /// and leaves state, tape, and head unchanged.
    ///
    /// # Errors
    ///
    /// Returns `MachineError::PreconditionViolation` when the machine has
    /// already recorded a terminal outcome.
    pub fn step(&mut self) -> Result<Step, MachineError> {
        self.ensure_live()?;
        Ok(self.advance())
    }

    /// Runs the machine until it reaches a terminal outcome or exhausts
    /// `max_steps` step attempts.
    ///
    /// Terminal-state precedence is checked strictly before each transition
    /// lookup: a machine already in the accept or reject state never
    /// attempts another transition, even if the table defines one.
    ///
    /// # Errors
    ///
    /// Returns `MachineError::PreconditionViolation` when the machine has
    /// already recorded a terminal outcome.
    pub fn run(&mut self, max_steps: usize) -> Result<Outcome, MachineError> {
        self.ensure_live()?;

        let mut taken = 0;
        loop {
            if self.state == self.definition.accept_state {
                self.termination = Some(Termination::Accepted);
                return Ok(Outcome::Accepted(self.snapshot()));
            }
            if self.state == self.definition.reject_state {
                self.termination = Some(Termination::Rejected);
                return Ok(Outcome::Rejected(self.snapshot()));
            }
            if taken == max_steps {
                self.termination = Some(Termination::StepLimitExceeded);
                return Ok(Outcome::StepLimitExceeded(self.snapshot()));
            }

            match self.advance() {
                Step::Halted => return Ok(Outcome::Halted(self.snapshot())),
                Step::Continued(_) => taken += 1,
            }
        }
    }

    /// Returns a lazy iterator of snapshots: the entry snapshot first, then
    /// one snapshot per applied step, ending before any terminal condition.
    ///
    /// The trace replays a clone of the machine, so it can be rebuilt and
    /// consumed any number of times; determinism guarantees an identical
    /// sequence each time.
    pub fn trace(&self, max_steps: usize) -> Trace {
        Trace {
            machine: self.clone(),
            entry_emitted: false,
            taken: 0,
            max_steps,
        }
    }

    /// Resets the machine to its initial configuration and clears any
    /// recorded terminal outcome.
    pub fn reset(&mut self) {
        self.state = self.definition.start_state.clone();
        self.tape = Tape::from_input(&self.definition.input, self.definition.blank);
        self.head = 0;
        self.step_count = 0;
        self.applied = None;
        self.termination = None;
    }

    /// Returns a read-only snapshot of the current configuration.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state.clone(),
            tape: self.tape.cells().to_vec(),
            head: self.head,
            applied: self.applied,
        }
    }

    /// Returns the current state of the machine.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the tape.
    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Returns the head index.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Returns the total number of steps executed by the machine.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Returns the transition applied by the most recent step, if any.
    pub fn last_transition(&self) -> Option<AppliedTransition> {
        self.applied
    }

    /// Returns the recorded terminal outcome, if the machine has stopped.
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Whether a terminal outcome has been recorded. Once terminated, the
    /// configuration is frozen; further `step`/`run` calls are caller
    /// errors until [`Machine::reset`].
    pub fn is_terminated(&self) -> bool {
        self.termination.is_some()
    }

    /// Returns the machine definition.
    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    fn ensure_live(&self) -> Result<(), MachineError> {
        match self.termination {
            Some(t) => Err(MachineError::PreconditionViolation(t)),
            None => Ok(()),
        }
    }

    /// Whether the current state is one of the two role states `run`
    /// terminates on.
    fn in_terminal_state(&self) -> bool {
        self.state == self.definition.accept_state || self.state == self.definition.reject_state
    }

    fn advance(&mut self) -> Step {
        let symbol = self.tape.read(self.head);

        let transition = match self.definition.lookup(&self.state, symbol) {
            Some(t) => t.clone(),
            None => {
                self.termination = Some(Termination::Halted);
                return Step::Halted;
            }
        };

        self.tape.write(self.head, transition.write);
        self.state = transition.next_state;

        match transition.direction {
            Direction::Left => {
                if self.head == 0 {
                    // The head index stays 0; the origin shifts instead.
                    self.tape.grow_left();
                } else {
                    self.head -= 1;
                }
            }
            Direction::Right => {
                self.head += 1;
                self.tape.materialize(self.head);
            }
            Direction::Stay => {}
        }

        self.applied = Some(AppliedTransition {
            read: symbol,
            write: transition.write,
            direction: transition.direction,
        });
        self.step_count += 1;

        Step::Continued(self.snapshot())
    }
}

/// A lazy sequence of configuration snapshots, created by
/// [`Machine::trace`]. Yields the entry snapshot first, then one snapshot
/// per applied step, and stops before accept, reject, halt, or the step
/// budget.
pub struct Trace {
    machine: Machine,
    entry_emitted: bool,
    taken: usize,
    max_steps: usize,
}

impl Iterator for Trace {
    type Item = Snapshot;

    fn next(&mut self) -> Option<Snapshot> {
        if !self.entry_emitted {
            self.entry_emitted = true;
            return Some(self.machine.snapshot());
        }

        if self.machine.in_terminal_state() || self.taken == self.max_steps {
            return None;
        }

        match self.machine.step() {
            Ok(Step::Continued(snapshot)) => {
                self.taken += 1;
                Some(snapshot)
            }
            _ => None,
        }
    }
}
