//! This crate provides a deterministic single-tape Turing machine engine.
//! It includes modules for defining and parsing machines, simulating their
//! execution step by step with observable snapshots, classifying run
//! outcomes, and managing a collection of embedded machine definitions.

pub mod library;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `Library` struct and registry from the library module.
pub use library::{Library, LIBRARY};
/// Re-exports the `DefinitionLoader` struct from the loader module.
pub use loader::DefinitionLoader;
/// Re-exports the `Machine` struct and `Trace` iterator from the machine module.
pub use machine::{Machine, Trace};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports the `Tape` struct from the tape module.
pub use tape::Tape;
/// Re-exports the core definition and execution types from the types module.
pub use types::{
    AppliedTransition, Definition, Direction, MachineError, Outcome, Snapshot, Step, Termination,
    Transition, DEFAULT_BLANK_SYMBOL, DEFAULT_MAX_STEPS,
};
