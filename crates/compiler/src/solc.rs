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

//! [`CompilerService`] backed by solc through `foundry-compilers`.
//!
//! The solc binary is resolved per compilation: with [`VersionPolicy::Auto`] the
//! newest release matching the source's `pragma solidity` is picked (and installed
//! through svm when missing); with [`VersionPolicy::Exact`] that release is used.
//! solc runs as a child process, so each invocation is moved to the blocking pool.

use std::path::{Path, PathBuf};

use craftsman_common::{CompilerConfig, VersionPolicy};
use eyre::{eyre, Result};
use foundry_compilers::{
    artifacts::{
        output_selection::OutputSelection, BytecodeObject, CompilerOutput, EvmVersion, Settings,
        SolcInput, Source, Sources,
    },
    solc::{Solc, SolcLanguage},
};
use semver::Version;
use tracing::{debug, trace};

use crate::{
    CompiledArtifact, CompilerFailure, CompilerService, Diagnostic, UnitContracts, VersionFailure,
};

/// Solc-backed compiler service.
#[derive(Debug, Clone, Default)]
pub struct SolcService {
    config: CompilerConfig,
}

impl SolcService {
    /// New service using the given compiler settings.
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    /// Compiler settings in use.
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Standard-JSON settings derived from the configuration.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = Settings::new(OutputSelection::complete_output_selection());

        if let Some(runs) = self.config.optimizer_runs {
            settings.optimizer.enabled = Some(true);
            settings.optimizer.runs = Some(runs);
        }

        if let Some(evm_version) = &self.config.evm_version {
            let parsed = evm_version
                .parse::<EvmVersion>()
                .map_err(|e| eyre!("invalid EVM version `{evm_version}`: {e}"))?;
            settings.evm_version = Some(parsed);
        }

        Ok(settings)
    }

    fn resolve_version(&self, source: &Source) -> Result<Version> {
        match &self.config.version {
            VersionPolicy::Auto => Ok(Solc::detect_version(source)?),
            VersionPolicy::Exact(version) => Ok(version.clone()),
        }
    }

    /// Run solc on a single source unit.
    fn run_solc(
        &self,
        unit_path: PathBuf,
        source: Source,
        allow_dir: Option<PathBuf>,
    ) -> Result<(Version, CompilerOutput)> {
        let version = self.resolve_version(&source)?;
        let mut solc = Solc::find_or_install(&version)?;
        if let Some(dir) = allow_dir {
            solc.allow_paths.insert(dir);
        }
        trace!(unit=?unit_path, compiler=?solc, "using compiler");

        let sources = Sources::from_iter([(unit_path, source)]);
        let input = SolcInput::new(SolcLanguage::Solidity, sources, self.settings()?);
        let output = solc.compile_exact(&input)?;

        Ok((version, output))
    }

    fn compile_blocking(
        &self,
        unit_path: PathBuf,
        source: Source,
        allow_dir: Option<PathBuf>,
    ) -> Result<UnitContracts, CompilerFailure> {
        let (version, output) = self.run_solc(unit_path, source, allow_dir)?;

        let errors = collect_errors(&output);
        if !errors.is_empty() {
            debug!(version=%version, count=errors.len(), "solc reported errors");
            return Err(CompilerFailure::Diagnostics(vec![VersionFailure {
                compiler_version: version,
                errors,
            }]));
        }

        Ok(collect_contracts(output))
    }
}

impl CompilerService for SolcService {
    async fn compile_source(
        &self,
        unit_name: &str,
        source_text: &str,
    ) -> Result<UnitContracts, CompilerFailure> {
        let service = self.clone();
        let unit_path = PathBuf::from(unit_name);
        let source = Source::new(source_text);

        spawn_compile(move || service.compile_blocking(unit_path, source, None)).await
    }

    async fn compile_file(&self, path: &Path) -> Result<UnitContracts, CompilerFailure> {
        let service = self.clone();
        let unit_path = path.to_path_buf();

        spawn_compile(move || {
            let source = Source::read(&unit_path).map_err(|e| CompilerFailure::Other(e.into()))?;
            let allow_dir = unit_path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(Path::to_path_buf);
            service.compile_blocking(unit_path, source, allow_dir)
        })
        .await
    }
}

async fn spawn_compile<F>(job: F) -> Result<UnitContracts, CompilerFailure>
where
    F: FnOnce() -> Result<UnitContracts, CompilerFailure> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| CompilerFailure::Other(eyre!("compiler task failed: {e}")))?
}

/// Error-severity diagnostics of a solc run. Warnings are dropped.
fn collect_errors(output: &CompilerOutput) -> Vec<Diagnostic> {
    output
        .errors
        .iter()
        .filter(|e| e.is_error())
        .map(|e| Diagnostic {
            error_code: e.error_code,
            message: e.message.clone(),
            formatted: e.formatted_message.clone(),
        })
        .collect()
}

/// Contracts with an ABI, keyed by unit and contract name.
fn collect_contracts(output: CompilerOutput) -> UnitContracts {
    let mut units = UnitContracts::new();

    for (path, contracts) in output.contracts {
        let unit = path.to_string_lossy().into_owned();
        for (name, contract) in contracts {
            let Some(abi) = contract.abi else {
                trace!(unit=%unit, contract=%name, "skipping contract without ABI");
                continue;
            };
            let bytecode = contract
                .evm
                .and_then(|evm| evm.bytecode)
                .map(|bytecode| bytecode_hex(&bytecode.object))
                .unwrap_or_default();

            let artifact = CompiledArtifact::new(abi, bytecode);
            units.entry(unit.clone()).or_default().insert(name, artifact);
        }
    }

    units
}

fn bytecode_hex(object: &BytecodeObject) -> String {
    match object {
        BytecodeObject::Bytecode(bytes) => hex::encode(bytes),
        BytecodeObject::Unlinked(unlinked) => unlinked.trim_start_matches("0x").to_string(),
    }
}
