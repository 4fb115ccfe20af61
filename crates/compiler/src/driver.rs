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

//! The compilation driver.
//!
//! [`compile`] validates the request, invokes the [`CompilerService`] once per
//! unit and merges the output into a [`CompilationResultSet`]. Failures are
//! classified into compiler rejections and everything else; both are logged and
//! returned to the caller. [`try_compile`] is the lenient variant that turns
//! compiler failures into `None`.

use tracing::{debug, error, info};

use crate::{
    CompilationResultSet, CompilationUnit, CompileError, CompilerFailure, CompilerService,
    SourceOrFile, UnitContracts, UnitNames,
};

/// Compile `path_or_source` and return the normalized result set.
///
/// * [`SourceOrFile::Source`]: `unit_names` must be a single name and
///   `path_or_source` is the source text.
/// * [`SourceOrFile::Path`]: `path_or_source` is a directory and every name in
///   `unit_names` is a file under it.
pub async fn compile<S: CompilerService>(
    service: &S,
    unit_names: impl Into<UnitNames>,
    path_or_source: &str,
    mode: SourceOrFile,
) -> Result<CompilationResultSet, CompileError> {
    let units = plan_units(unit_names.into(), path_or_source, mode)?;

    let mut merged = UnitContracts::new();
    for unit in &units {
        debug!(unit=%unit, "compiling");
        let contracts = compile_unit(service, unit).await.map_err(|failure| {
            let err = CompileError::from(failure);
            report_failure(&err);
            err
        })?;
        for (unit_name, artifacts) in contracts {
            merged.entry(unit_name).or_default().extend(artifacts);
        }
    }

    let result = CompilationResultSet::from_units(merged);
    info!(units = units.len(), contracts = result.len(), "compilation finished");
    Ok(result)
}

/// Like [`compile`], but compiler failures yield `Ok(None)` after being logged.
///
/// Argument errors are still returned.
pub async fn try_compile<S: CompilerService>(
    service: &S,
    unit_names: impl Into<UnitNames>,
    path_or_source: &str,
    mode: SourceOrFile,
) -> Result<Option<CompilationResultSet>, CompileError> {
    match compile(service, unit_names, path_or_source, mode).await {
        Ok(result) => Ok(Some(result)),
        Err(err @ CompileError::InvalidArguments(_)) => Err(err),
        Err(_) => Ok(None),
    }
}

/// Compile a single unit through the service.
pub async fn compile_unit<S: CompilerService>(
    service: &S,
    unit: &CompilationUnit,
) -> Result<UnitContracts, CompilerFailure> {
    match unit {
        CompilationUnit::Source { unit_name, source_text } => {
            service.compile_source(unit_name, source_text).await
        }
        CompilationUnit::File { path } => service.compile_file(path).await,
    }
}

fn plan_units(
    unit_names: UnitNames,
    path_or_source: &str,
    mode: SourceOrFile,
) -> Result<Vec<CompilationUnit>, CompileError> {
    match (mode, unit_names) {
        (SourceOrFile::Source, UnitNames::One(unit_name)) => {
            Ok(vec![CompilationUnit::source(unit_name, path_or_source)])
        }
        (SourceOrFile::Source, UnitNames::Many(names)) => Err(CompileError::InvalidArguments(
            format!("source mode takes a single unit name, got {} names", names.len()),
        )),
        (SourceOrFile::Path, names) => {
            let names = names.to_vec();
            if names.is_empty() {
                return Err(CompileError::InvalidArguments(
                    "path mode needs at least one file name".to_string(),
                ));
            }
            Ok(names.iter().map(|name| CompilationUnit::file(path_or_source, name)).collect())
        }
    }
}

/// Log a compilation failure.
fn report_failure(err: &CompileError) {
    for line in failure_lines(err) {
        error!("{line}");
    }
}

fn failure_lines(err: &CompileError) -> Vec<String> {
    match err {
        CompileError::Rejected { failures } => {
            let mut lines = vec!["Compile errors encountered:".to_string()];
            for failure in failures {
                lines.push(format!("Solc {}:", failure.compiler_version));
                lines.extend(failure.errors.iter().map(ToString::to_string));
            }
            lines
        }
        // Debug formatting keeps the whole cause chain.
        CompileError::Unclassified(report) => vec![format!("compilation failed: {report:?}")],
        other => vec![other.to_string()],
    }
}
