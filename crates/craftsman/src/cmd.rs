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

//! Command implementations for the Craftsman CLI

use std::{fs, path::Path};

use craftsman_compiler::{try_compile, CompilationResultSet, SolcService, SourceOrFile};
use eyre::Result;
use tracing::{error, info};

/// Compile `files` under `dir` and print the results.
pub async fn compile_files(service: &SolcService, dir: &str, files: &[String]) -> Result<()> {
    let result = try_compile(service, files.to_vec(), dir, SourceOrFile::Path).await?;
    report(result)
}

/// Compile the contents of `file` as a source unit named `unit_name`.
pub async fn compile_source_file(
    service: &SolcService,
    file: &Path,
    unit_name: &str,
) -> Result<()> {
    let source_code = match fs::read_to_string(file) {
        Ok(source_code) => source_code,
        Err(e) => {
            error!("Failed to read {}: {}", file.display(), e);
            return Ok(());
        }
    };

    let result = try_compile(service, unit_name, &source_code, SourceOrFile::Source).await?;
    report(result)
}

fn report(result: Option<CompilationResultSet>) -> Result<()> {
    let Some(result) = result else {
        info!("No artifacts produced");
        return Ok(());
    };

    info!("Compiled {} contract(s)", result.len());
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
