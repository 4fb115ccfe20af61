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

//! Craftsman Compiler - turns Solidity source into ABI and bytecode artifacts.
//!
//! The entry point is [`compile`]: hand it a [`CompilerService`] (usually
//! [`SolcService`]), one or more unit names, and either source text or a
//! directory. It returns a [`CompilationResultSet`] mapping unit names to
//! contract names to [`CompiledArtifact`]s, with a top-level alias when the
//! result holds a single contract.
//!
//! Failures come back as [`CompileError`]:
//! - [`CompileError::InvalidArguments`] for requests that do not fit the mode
//! - [`CompileError::Rejected`] when solc reports errors, keyed by compiler version
//! - [`CompileError::Unclassified`] for everything else on the compiler path

mod artifact;
pub use artifact::*;

mod driver;
pub use driver::*;

mod errors;
pub use errors::*;

mod service;
pub use service::*;

mod solc;
pub use solc::*;

mod unit;
pub use unit::*;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
