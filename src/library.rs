//! A small catalog of ready-to-run machine definitions embedded in the
//! crate, one per terminal outcome flavor.

use crate::types::{Definition, MachineError};

use std::sync::RwLock;

// Default embedded machines
const DEFINITION_TEXTS: [&str; 4] = [
    include_str!("../machines/unary-recognizer.tm"),
    include_str!("../machines/even-ones.tm"),
    include_str!("../machines/binary-increment.tm"),
    include_str!("../machines/busy-beaver-3.tm"),
];

lazy_static::lazy_static! {
    pub static ref LIBRARY: RwLock<Vec<Definition>> = RwLock::new(Vec::new());
}

pub struct Library;

impl Library {
    /// Initialize the library with the embedded machine definitions
    pub fn load() -> Result<(), MachineError> {
        let mut definitions = Vec::new();

        for text in DEFINITION_TEXTS {
            if let Ok(definition) = crate::parser::parse(text) {
                definitions.push(definition);
            } else {
                eprintln!("Failed to parse embedded definition");
            }
        }

        if let Ok(mut write_guard) = LIBRARY.write() {
            *write_guard = definitions;
        } else {
            return Err(MachineError::FileError(
                "Failed to acquire write lock".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the number of available definitions
    pub fn count() -> usize {
        // Initialize with the embedded definitions if not already done
        let _ = Self::load();

        LIBRARY.read().map(|defs| defs.len()).unwrap_or(0)
    }

    /// Get a definition by its index
    pub fn get_by_index(index: usize) -> Result<Definition, MachineError> {
        // Initialize with the embedded definitions if not already done
        let _ = Self::load();

        LIBRARY
            .read()
            .map_err(|_| MachineError::FileError("Failed to acquire read lock".to_string()))?
            .get(index)
            .cloned()
            .ok_or_else(|| {
                MachineError::InvalidDefinition(format!("Machine index {} out of range", index))
            })
    }

    /// Get a definition by its name
    pub fn get_by_name(name: &str) -> Result<Definition, MachineError> {
        // Initialize with the embedded definitions if not already done
        let _ = Self::load();

        LIBRARY
            .read()
            .map_err(|_| MachineError::FileError("Failed to acquire read lock".to_string()))?
            .iter()
            .find(|definition| definition.name == name)
            .cloned()
            .ok_or_else(|| {
                MachineError::InvalidDefinition(format!("Machine '{}' not found", name))
            })
    }

    /// List all machine names
    pub fn names() -> Vec<String> {
        // Initialize with the embedded definitions if not already done
        let _ = Self::load();

        LIBRARY
            .read()
            .map(|defs| defs.iter().map(|d| d.name.clone()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::Machine;
    use crate::types::{Outcome, DEFAULT_MAX_STEPS};

    #[test]
    fn test_all_embedded_definitions_load() {
        assert!(Library::load().is_ok());
        assert_eq!(Library::count(), DEFINITION_TEXTS.len());
    }

    #[test]
    fn test_get_by_name() {
        let definition = Library::get_by_name("Even Ones Checker").unwrap();
        assert_eq!(definition.input, "1111");

        assert!(Library::get_by_name("No Such Machine").is_err());
    }

    #[test]
    fn test_get_by_index_out_of_range() {
        assert!(Library::get_by_index(DEFINITION_TEXTS.len()).is_err());
    }

    #[test]
    fn test_names_are_listed_in_order() {
        let names = Library::names();
        assert_eq!(names.first().map(String::as_str), Some("Unary Recognizer"));
        assert_eq!(names.len(), DEFINITION_TEXTS.len());
    }

    #[test]
    fn test_even_ones_accepts_and_rejects() {
        let definition = Library::get_by_name("Even Ones Checker").unwrap();

        let mut even = Machine::with_input(definition.clone(), "1111").unwrap();
        assert!(matches!(
            even.run(DEFAULT_MAX_STEPS).unwrap(),
            Outcome::Accepted(_)
        ));

        let mut odd = Machine::with_input(definition, "111").unwrap();
        assert!(matches!(
            odd.run(DEFAULT_MAX_STEPS).unwrap(),
            Outcome::Rejected(_)
        ));
    }

    #[test]
    fn test_binary_increment_carries() {
        let definition = Library::get_by_name("Binary Increment").unwrap();

        let mut machine = Machine::with_input(definition, "1011").unwrap();
        let outcome = machine.run(DEFAULT_MAX_STEPS).unwrap();

        assert!(matches!(outcome, Outcome::Accepted(_)));
        assert_eq!(machine.tape().trimmed(), "1100");
    }

    #[test]
    fn test_busy_beaver_halts_with_six_ones() {
        let definition = Library::get_by_name("Busy Beaver 3").unwrap();

        let mut machine = Machine::new(definition).unwrap();
        let outcome = machine.run(DEFAULT_MAX_STEPS).unwrap();

        assert!(matches!(outcome, Outcome::Halted(_)));
        assert_eq!(
            machine.tape().cells().iter().filter(|&&c| c == '1').count(),
            6
        );
    }
}
