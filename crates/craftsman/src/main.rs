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

//! Craftsman - compile Solidity sources from the command line.
//!
//! Successful compilations print the result set as JSON on stdout. Compiler
//! failures are logged and the process still exits successfully.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use craftsman_common::{config::DEFAULT_CONFIG_FILE, CraftsmanConfig, VersionPolicy};
use craftsman_compiler::SolcService;
use eyre::Result;

mod cmd;

/// Command-line interface for Craftsman
#[derive(Debug, Parser)]
#[command(name = "craftsman")]
#[command(about = "Craftsman - compile Solidity sources into contract artifacts")]
#[command(version)]
pub struct Cli {
    /// Configuration file; missing files fall back to defaults
    #[arg(long, env = "CRAFTSMAN_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Solc version to use, or "auto" to follow the source pragma
    #[arg(long, env = "CRAFTSMAN_SOLC_VERSION")]
    pub solc_version: Option<VersionPolicy>,

    /// Enable the optimizer with this many runs
    #[arg(long)]
    pub optimizer_runs: Option<usize>,

    /// Target EVM version (e.g. "paris")
    #[arg(long)]
    pub evm_version: Option<String>,

    /// Also write logs to a rolling file in the temp directory
    #[arg(long)]
    pub log_file: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile Solidity files located under a directory
    Compile {
        /// Directory the files are relative to
        dir: String,
        /// Files to compile
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Compile a single file's contents as an in-memory source unit
    CompileSource {
        /// File holding the Solidity source
        file: PathBuf,
        /// Unit name to register the source under
        #[arg(long, default_value = "contract")]
        unit_name: String,
    },
}

impl Cli {
    /// Configuration file values with command-line overrides applied.
    fn resolve_config(&self) -> Result<CraftsmanConfig> {
        let mut config = CraftsmanConfig::load_or_default(&self.config)?;
        if let Some(version) = &self.solc_version {
            config.compiler.version = version.clone();
        }
        if let Some(runs) = self.optimizer_runs {
            config.compiler.optimizer_runs = Some(runs);
        }
        if let Some(evm_version) = &self.evm_version {
            config.compiler.evm_version = Some(evm_version.clone());
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    craftsman_common::logging::init_logging("craftsman", cli.log_file)?;

    let config = cli.resolve_config()?;
    tracing::debug!(compiler = ?config.compiler, "configuration resolved");
    let service = SolcService::new(config.compiler);

    match &cli.command {
        Commands::Compile { dir, files } => {
            tracing::info!("Compiling {} file(s) under {}", files.len(), dir);
            cmd::compile_files(&service, dir, files).await
        }
        Commands::CompileSource { file, unit_name } => {
            tracing::info!("Compiling {} as unit {}", file.display(), unit_name);
            cmd::compile_source_file(&service, file, unit_name).await
        }
    }
}
