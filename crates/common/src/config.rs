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

//! Configuration for Craftsman components.
//!
//! Settings can be built in code with the `with_*` builders or loaded from a
//! TOML file such as:
//!
//! ```toml
//! [compiler]
//! version = "auto"
//! optimizer_runs = 200
//! evm_version = "paris"
//! ```

use eyre::{Context, Result};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::Path, str::FromStr};
use tracing::debug;

/// Default config file name looked up by the CLI.
pub const DEFAULT_CONFIG_FILE: &str = "craftsman.toml";

/// How the solc version for a compilation is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VersionPolicy {
    /// Detect the newest release satisfying the source's `pragma solidity`.
    #[default]
    Auto,
    /// Always use this exact release.
    Exact(Version),
}

impl fmt::Display for VersionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Exact(version) => write!(f, "{version}"),
        }
    }
}

impl FromStr for VersionPolicy {
    type Err = semver::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        Version::parse(s.trim_start_matches('v')).map(Self::Exact)
    }
}

impl Serialize for VersionPolicy {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionPolicy {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Settings handed to the Solidity compiler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Compiler version selection
    pub version: VersionPolicy,
    /// Optimizer runs; `None` leaves the optimizer disabled
    pub optimizer_runs: Option<usize>,
    /// Target EVM version (e.g. `"paris"`); `None` uses the compiler default
    pub evm_version: Option<String>,
}

impl CompilerConfig {
    /// Pin the compiler to an exact version
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = VersionPolicy::Exact(version);
        self
    }

    /// Enable the optimizer with the given number of runs
    pub fn with_optimizer_runs(mut self, runs: usize) -> Self {
        self.optimizer_runs = Some(runs);
        self
    }

    /// Set the target EVM version
    pub fn with_evm_version(mut self, evm_version: impl Into<String>) -> Self {
        self.evm_version = Some(evm_version.into());
        self
    }
}

/// Top-level configuration file layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftsmanConfig {
    /// Compiler settings
    pub compiler: CompilerConfig,
}

impl CraftsmanConfig {
    /// Load configuration from a TOML file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load configuration from `path` if it exists, otherwise use defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from(path)
        } else {
            debug!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config to TOML")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}
