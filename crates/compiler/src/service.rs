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

//! The seam between the driver and the actual Solidity compiler.

use std::{future::Future, path::Path};

use crate::{CompilerFailure, UnitContracts};

/// A Solidity compiler the driver can invoke.
///
/// Implementations return raw `unit -> contract -> artifact` maps; the driver
/// classifies failures and builds the [`CompilationResultSet`](crate::CompilationResultSet).
pub trait CompilerService: Send + Sync {
    /// Compile `source_text` registered under `unit_name`.
    fn compile_source(
        &self,
        unit_name: &str,
        source_text: &str,
    ) -> impl Future<Output = Result<UnitContracts, CompilerFailure>> + Send;

    /// Compile the file at `path`, keyed by the path as given.
    fn compile_file(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<UnitContracts, CompilerFailure>> + Send;
}
