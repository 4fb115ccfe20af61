// Craftsman - Solidity contracts compiled on construction
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Compilation units and the path conventions used to name them.

use std::{fmt, path::PathBuf};

/// Separator placed between a directory and a file name in file-mode unit names.
pub const UNIT_PATH_SEPARATOR: char = '/';

/// Whether `compile` receives literal source text or a directory to resolve files under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceOrFile {
    /// `path_or_source` is Solidity source text.
    Source,
    /// `path_or_source` is a directory containing the named files.
    #[default]
    Path,
}

/// One or more unit names passed to `compile`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitNames {
    /// A single unit name.
    One(String),
    /// A collection of unit names.
    Many(Vec<String>),
}

impl UnitNames {
    /// Returns all names in order.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(name) => vec![name.clone()],
            Self::Many(names) => names.clone(),
        }
    }
}

impl From<&str> for UnitNames {
    fn from(name: &str) -> Self {
        Self::One(name.to_string())
    }
}

impl From<String> for UnitNames {
    fn from(name: String) -> Self {
        Self::One(name)
    }
}

impl From<Vec<String>> for UnitNames {
    fn from(names: Vec<String>) -> Self {
        Self::Many(names)
    }
}

impl From<&[&str]> for UnitNames {
    fn from(names: &[&str]) -> Self {
        Self::Many(names.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for UnitNames {
    fn from(names: [&str; N]) -> Self {
        Self::Many(names.iter().map(|s| s.to_string()).collect())
    }
}

/// What is handed to the compiler service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilationUnit {
    /// Inline source text registered under `unit_name`.
    Source {
        /// Name the source is registered under
        unit_name: String,
        /// Solidity source text
        source_text: String,
    },
    /// A source file on disk.
    File {
        /// Path to the file; also used as its unit name
        path: PathBuf,
    },
}

impl CompilationUnit {
    /// Inline source unit.
    pub fn source(unit_name: impl Into<String>, source_text: impl Into<String>) -> Self {
        Self::Source { unit_name: unit_name.into(), source_text: source_text.into() }
    }

    /// File unit resolved as `dir` + `/` + `file_name`.
    pub fn file(dir: &str, file_name: &str) -> Self {
        Self::File { path: PathBuf::from(join_unit_path(dir, file_name)) }
    }

    /// The name results for this unit are keyed under.
    pub fn unit_name(&self) -> String {
        match self {
            Self::Source { unit_name, .. } => unit_name.clone(),
            Self::File { path } => path.to_string_lossy().into_owned(),
        }
    }
}

impl fmt::Display for CompilationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source { unit_name, source_text } => {
                write!(f, "source `{unit_name}` ({} bytes)", source_text.len())
            }
            Self::File { path } => write!(f, "file `{}`", path.display()),
        }
    }
}

/// Join a directory and a file name with exactly one separator between them.
///
/// `join_unit_path("contracts", "A.sol")` and `join_unit_path("contracts/", "A.sol")`
/// both yield `contracts/A.sol`. An empty directory yields the file name unchanged.
pub fn join_unit_path(dir: &str, file_name: &str) -> String {
    if dir.is_empty() {
        return file_name.to_string();
    }

    let dir = dir.trim_end_matches(UNIT_PATH_SEPARATOR);
    let file_name = file_name.trim_start_matches(UNIT_PATH_SEPARATOR);
    format!("{dir}{UNIT_PATH_SEPARATOR}{file_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_with_and_without_trailing_separator() {
        assert_eq!(join_unit_path("contracts", "A.sol"), "contracts/A.sol");
        assert_eq!(join_unit_path("contracts/", "A.sol"), "contracts/A.sol");
        assert_eq!(join_unit_path("contracts//", "/A.sol"), "contracts/A.sol");
    }

    #[test]
    fn test_join_root_and_empty_dir() {
        assert_eq!(join_unit_path("/", "A.sol"), "/A.sol");
        assert_eq!(join_unit_path("", "A.sol"), "A.sol");
    }

    #[test]
    fn test_unit_names() {
        let unit = CompilationUnit::source("contract", "contract A {}");
        assert_eq!(unit.unit_name(), "contract");

        let unit = CompilationUnit::file("./test/", "A.sol");
        assert_eq!(unit.unit_name(), "./test/A.sol");
        assert_eq!(unit, CompilationUnit::file("./test", "A.sol"));
    }

    #[test]
    fn test_unit_names_conversions() {
        assert_eq!(UnitNames::from("a"), UnitNames::One("a".into()));
        assert_eq!(UnitNames::from(["a", "b"]).to_vec(), vec!["a".to_string(), "b".to_string()]);
    }
}
