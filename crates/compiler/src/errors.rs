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

//! Error types of the compilation driver.

use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One diagnostic reported by the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Solc error code, if any
    pub error_code: Option<u64>,
    /// Short message
    pub message: String,
    /// Message with source location, as rendered by the compiler
    pub formatted: Option<String>,
}

impl Diagnostic {
    /// Diagnostic carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self { error_code: None, message: message.into(), formatted: None }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(formatted) = &self.formatted {
            return f.write_str(formatted.trim_end());
        }
        match self.error_code {
            Some(code) => write!(f, "Error [{code}]: {}", self.message),
            None => write!(f, "Error: {}", self.message),
        }
    }
}

/// Diagnostics produced by one compiler version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionFailure {
    /// The solc version that rejected the input
    pub compiler_version: Version,
    /// Errors it reported
    pub errors: Vec<Diagnostic>,
}

/// Failure raised by a [`CompilerService`](crate::CompilerService).
#[derive(Debug, Error)]
pub enum CompilerFailure {
    /// The compiler ran and rejected the input.
    #[error("compilation failed with {} compiler version(s)", .0.len())]
    Diagnostics(Vec<VersionFailure>),
    /// Anything else: I/O, missing compiler, malformed output.
    #[error("{0}")]
    Other(eyre::Report),
}

impl From<eyre::Report> for CompilerFailure {
    fn from(report: eyre::Report) -> Self {
        Self::Other(report)
    }
}

/// Errors returned by [`compile`](crate::compile).
#[derive(Debug, Error)]
pub enum CompileError {
    /// The caller passed arguments that do not fit the requested mode.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The compiler rejected the input.
    #[error("compiler rejected the input:{}", format_failures(.failures))]
    Rejected {
        /// Diagnostics per compiler version attempted
        failures: Vec<VersionFailure>,
    },

    /// Unexpected failure on the compiler path.
    #[error("compilation failed: {0}")]
    Unclassified(eyre::Report),
}

impl CompileError {
    /// Whether the compiler itself rejected the input.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Diagnostics for a rejected compilation; empty otherwise.
    pub fn failures(&self) -> &[VersionFailure] {
        match self {
            Self::Rejected { failures } => failures,
            _ => &[],
        }
    }
}

impl From<CompilerFailure> for CompileError {
    fn from(failure: CompilerFailure) -> Self {
        match failure {
            CompilerFailure::Diagnostics(failures) => Self::Rejected { failures },
            CompilerFailure::Other(report) => Self::Unclassified(report),
        }
    }
}

fn format_failures(failures: &[VersionFailure]) -> String {
    let mut out = String::new();
    for failure in failures {
        out.push_str(&format!("\nSolc {}:", failure.compiler_version));
        for error in &failure.errors {
            out.push_str(&format!("\n{error}"));
        }
    }
    out
}
