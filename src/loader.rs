//! This module provides the `DefinitionLoader` struct, responsible for
//! loading machine definitions from various sources, including files and
//! strings.

use crate::parser::parse;
use crate::types::{Definition, MachineError};
use std::fs;
use std::path::{Path, PathBuf};

/// `DefinitionLoader` is a utility struct for loading machine definitions.
/// It provides methods to load definitions from individual files, from
/// string content, and to discover and load all `.tm` files within a
/// specified directory.
pub struct DefinitionLoader;

impl DefinitionLoader {
    /// Loads a single machine definition from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Definition)` if the file is successfully read and parsed.
    /// * `Err(MachineError::FileError)` if the file cannot be read.
    /// * `Err(MachineError::ParseError)` if the content is not a valid
    ///   definition.
    pub fn load_definition(path: &Path) -> Result<Definition, MachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            MachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        parse(&content)
    }

    /// Loads a single machine definition from the provided string content.
    ///
    /// This is useful for parsing definitions that are not stored in files,
    /// e.g., from user input.
    pub fn load_definition_from_string(content: &str) -> Result<Definition, MachineError> {
        parse(content)
    }

    /// Loads all machine definition files (`.tm` extension) from a given
    /// directory.
    ///
    /// It iterates through the directory, attempts to load each `.tm` file,
    /// and collects the results. Directories and non-`.tm` files are
    /// skipped.
    pub fn load_definitions(
        directory: &Path,
    ) -> Vec<Result<(PathBuf, Definition), MachineError>> {
        if !directory.exists() {
            return vec![Err(MachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(MachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(MachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                // Skip directories and non-.tm files
                if path.is_dir() || path.extension().is_none_or(|ext| ext != "tm") {
                    return None;
                }

                match Self::load_definition(&path) {
                    Ok(definition) => Some(Ok((path, definition))),
                    Err(e) => Some(Err(MachineError::FileError(format!(
                        "Failed to load definition from {}: {}",
                        path.display(),
                        e
                    )))),
                }
            })
            .collect()
    }
}
