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

//! Test helpers: a scripted [`CompilerService`] and sample sources.

use std::{
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use alloy_json_abi::JsonAbi;
use parking_lot::Mutex;
use semver::Version;
use tokio::sync::Notify;

use crate::{
    CompiledArtifact, CompilerFailure, CompilerService, Diagnostic, UnitContracts, VersionFailure,
};

/// Single-contract source with one public integer.
pub const MY_CONTRACT: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.0;

contract MyContract {
    uint256 public myNumber;

    constructor(uint256 _myNumber) {
        myNumber = _myNumber;
    }

    function setMyNumber(uint256 _myNumber) public {
        myNumber = _myNumber;
    }
}
"#;

/// Source defining two contracts in one unit.
pub const TWO_CONTRACTS: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.0;

contract First {
    uint256 public a;
}

contract Second {
    uint256 public b;
}
"#;

/// Source that does not parse.
pub const INVALID_SOURCE: &str = r#"pragma solidity ^0.8.0;
contract Broken {
    uint256 public x
}
"#;

/// ABI of [`MY_CONTRACT`].
pub fn my_contract_abi() -> JsonAbi {
    serde_json::from_str(
        r#"[
            {"inputs":[{"internalType":"uint256","name":"_myNumber","type":"uint256"}],"stateMutability":"nonpayable","type":"constructor"},
            {"inputs":[],"name":"myNumber","outputs":[{"internalType":"uint256","name":"","type":"uint256"}],"stateMutability":"view","type":"function"},
            {"inputs":[{"internalType":"uint256","name":"_myNumber","type":"uint256"}],"name":"setMyNumber","outputs":[],"stateMutability":"nonpayable","type":"function"}
        ]"#,
    )
    .expect("valid ABI fixture")
}

#[derive(Debug, Clone)]
enum Behavior {
    Succeed,
    Reject(String),
    Fail(String),
}

/// A [`CompilerService`] returning scripted results.
///
/// Each call returns the scripted contracts registered under the requested unit
/// name (the unit name in source mode, the path as given in file mode).
#[derive(Debug)]
pub struct MockCompiler {
    contracts: UnitContracts,
    behavior: Behavior,
    gate: Option<Arc<Notify>>,
    invocations: AtomicUsize,
    source_calls: Mutex<Vec<String>>,
    file_calls: Mutex<Vec<String>>,
}

impl Default for MockCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCompiler {
    /// A compiler that succeeds with no contracts.
    pub fn new() -> Self {
        Self {
            contracts: UnitContracts::new(),
            behavior: Behavior::Succeed,
            gate: None,
            invocations: AtomicUsize::new(0),
            source_calls: Mutex::new(Vec::new()),
            file_calls: Mutex::new(Vec::new()),
        }
    }

    /// Register a contract with an empty ABI.
    pub fn with_contract(self, unit: &str, name: &str, bytecode: &str) -> Self {
        self.with_artifact(unit, name, CompiledArtifact::new(JsonAbi::default(), bytecode))
    }

    /// Register a contract artifact.
    pub fn with_artifact(mut self, unit: &str, name: &str, artifact: CompiledArtifact) -> Self {
        self.contracts.entry(unit.to_string()).or_default().insert(name.to_string(), artifact);
        self
    }

    /// Every call is rejected with one diagnostic from solc 0.8.19.
    pub fn rejecting(mut self, message: &str) -> Self {
        self.behavior = Behavior::Reject(message.to_string());
        self
    }

    /// Every call fails with an unclassified error.
    pub fn failing(mut self, message: &str) -> Self {
        self.behavior = Behavior::Fail(message.to_string());
        self
    }

    /// Calls wait until `gate` is notified.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Number of service calls so far.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Unit names passed to `compile_source`.
    pub fn source_calls(&self) -> Vec<String> {
        self.source_calls.lock().clone()
    }

    /// Paths passed to `compile_file`.
    pub fn file_calls(&self) -> Vec<String> {
        self.file_calls.lock().clone()
    }

    async fn respond(&self, unit: String) -> Result<UnitContracts, CompilerFailure> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match &self.behavior {
            Behavior::Succeed => Ok(self
                .contracts
                .get(&unit)
                .map(|contracts| UnitContracts::from([(unit.clone(), contracts.clone())]))
                .unwrap_or_default()),
            Behavior::Reject(message) => Err(CompilerFailure::Diagnostics(vec![VersionFailure {
                compiler_version: Version::new(0, 8, 19),
                errors: vec![Diagnostic::new(message.clone())],
            }])),
            Behavior::Fail(message) => Err(CompilerFailure::Other(eyre::eyre!("{message}"))),
        }
    }
}

impl CompilerService for MockCompiler {
    async fn compile_source(
        &self,
        unit_name: &str,
        _source_text: &str,
    ) -> Result<UnitContracts, CompilerFailure> {
        self.source_calls.lock().push(unit_name.to_string());
        self.respond(unit_name.to_string()).await
    }

    async fn compile_file(&self, path: &Path) -> Result<UnitContracts, CompilerFailure> {
        let unit = path.to_string_lossy().into_owned();
        self.file_calls.lock().push(unit.clone());
        self.respond(unit).await
    }
}
