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

//! Errors raised by contract handles.

use std::fmt;

use craftsman_compiler::CompileError;
use thiserror::Error;

use crate::CompilationState;

/// Errors raised by [`ExtendedContract`](crate::ExtendedContract).
#[derive(Debug, Error)]
pub enum ContractError {
    /// The handle was built from an ABI, so there is no compilation to observe.
    #[error(
        "You are not supposed to call `compilation_result()` because no source code was provided."
    )]
    NoCompilationPerformed,

    /// The compiler driver failed.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Compilation succeeded without exactly one usable contract.
    #[error(
        "Something went wrong. The reason could be that you have multiple smart contracts provided \
         (found: {})",
        ContractList(.found)
    )]
    AmbiguousResult {
        /// Contract names the compilation produced
        found: Vec<String>,
    },

    /// An on-chain operation was requested before the handle was usable.
    #[error("contract is not ready for on-chain operations (state: {0})")]
    NotReady(CompilationState),

    /// An operation needs the contract address but none was configured.
    #[error("contract address is not set")]
    MissingAddress,

    /// A deployment was requested but the handle holds no creation bytecode.
    #[error("contract has no bytecode to deploy")]
    MissingBytecode,

    /// A compiling handle was built outside a tokio runtime.
    #[error("no tokio runtime available to run the compilation")]
    RuntimeUnavailable,

    /// The compilation task ended without resolving.
    #[error("compilation task ended without producing a result")]
    CompilationAborted,

    /// Stored bytecode is not plain hex (e.g. unlinked libraries).
    #[error("bytecode cannot be decoded: {0}")]
    InvalidBytecode(#[from] hex::FromHexError),
}

struct ContractList<'a>(&'a [String]);

impl fmt::Display for ContractList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&self.0.join(", "))
        }
    }
}
