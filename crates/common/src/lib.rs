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

//! Craftsman Common - Shared functionality for Craftsman components
//!
//! This crate provides the logging setup and the configuration types used by
//! the compiler driver, the contract handle and the command-line tool.

/// Compiler and file-based configuration
pub mod config;
/// Logging setup and utilities for consistent logging across Craftsman components
pub mod logging;

pub use config::*;
pub use logging::*;
