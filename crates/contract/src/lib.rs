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

//! Craftsman Contract - contract handles built straight from Solidity source.
//!
//! [`ExtendedContract`] accepts either a pre-compiled ABI or source text through
//! [`ContractInit`]. Source is compiled in the background; the handle is usable
//! for on-chain calls once its [`CompilationOutcome`] resolves successfully.
//!
//! - [`ExtendedContract::compilation_result`] exposes the outcome, or fails with
//!   [`ContractError::NoCompilationPerformed`] for ABI-built handles.
//! - [`ExtendedContract::had_finished_compilation`] is the synchronous flag.
//! - [`CraftsmanPlugin`] exposes the same constructors through a [`PluginRegistry`].

mod contract;
pub use contract::*;

mod errors;
pub use errors::*;

mod options;
pub use options::*;

mod outcome;
pub use outcome::*;

mod plugin;
pub use plugin::*;
