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

//! Logging setup shared by Craftsman components.
//!
//! Console output is always enabled. File output goes to
//! `<tmp>/craftsman-logs/<component>/` with daily rotation. Levels follow
//! `RUST_LOG` and fall back to `info`.

use eyre::Result;
use std::{env, fs, path::PathBuf, sync::Once};
use tracing::Level;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, time::LocalTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Directives appended to the console filter to keep solc download chatter quiet.
const CONSOLE_QUIET_DIRECTIVES: &str = "svm=warn,reqwest=warn,hyper=warn";

/// Initialize logging for a Craftsman component.
///
/// # Arguments
/// * `component_name` - Name of the component (e.g., "craftsman")
/// * `enable_file_logging` - Whether to also write logs to a rolling file
///
/// # Examples
/// ```rust
/// use craftsman_common::logging;
///
/// fn main() -> eyre::Result<()> {
///     logging::init_logging("craftsman", false)?;
///     tracing::info!("compiler ready");
///     Ok(())
/// }
/// ```
pub fn init_logging(component_name: &str, enable_file_logging: bool) -> Result<()> {
    let env_filter = default_env_filter(Level::INFO)?;

    let console_layer = fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_timer(LocalTime::rfc_3339())
        .with_ansi(true)
        .with_writer(std::io::stderr);

    if enable_file_logging {
        let log_dir = create_log_directory(component_name)?;

        let file_appender = rolling::daily(&log_dir, format!("{component_name}.log"));
        let (non_blocking_appender, guard) = non_blocking(file_appender);

        // The guard flushes on drop; logging lives as long as the process.
        std::mem::forget(guard);

        let file_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(LocalTime::rfc_3339())
            .with_ansi(false)
            .with_writer(non_blocking_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer.with_filter(filter_for_console()))
            .with(file_layer)
            .try_init()
            .map_err(|e| eyre::eyre!("Failed to initialize tracing subscriber: {e}"))?;

        tracing::info!(
            component = component_name,
            log_dir = %log_dir.display(),
            "Logging initialized with console and file output"
        );
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer.with_filter(filter_for_console()))
            .try_init()
            .map_err(|e| eyre::eyre!("Failed to initialize tracing subscriber: {e}"))?;

        tracing::debug!(component = component_name, "Logging initialized with console output only");
    }

    Ok(())
}

/// Build an [`EnvFilter`] from `RUST_LOG`, or from `level` if unset.
fn default_env_filter(level: Level) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.as_str()))
        .map_err(|e| eyre::eyre!("Failed to create environment filter: {e}"))
}

/// Create the log directory in the system temp folder.
fn create_log_directory(component_name: &str) -> Result<PathBuf> {
    let log_dir = env::temp_dir().join("craftsman-logs").join(component_name);
    fs::create_dir_all(&log_dir)?;
    Ok(log_dir)
}

fn filter_for_console() -> EnvFilter {
    let base = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    EnvFilter::try_new(format!("{base},{CONSOLE_QUIET_DIRECTIVES}"))
        .unwrap_or_else(|_| EnvFilter::new(CONSOLE_QUIET_DIRECTIVES))
}

/// Initialize compact console-only logging.
///
/// Useful for tests and small utilities.
pub fn init_simple_logging(level: Level) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(default_env_filter(level)?)
        .with_target(false)
        .with_test_writer()
        .compact()
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to initialize simple logging: {e}"))?;

    Ok(())
}

static TEST_LOGGING_INIT: Once = Once::new();

/// Logging initialization for tests that may be called any number of times.
///
/// Defaults to `INFO` unless `RUST_LOG` is set.
///
/// ```rust
/// use craftsman_common::logging;
///
/// logging::ensure_test_logging(None);
/// tracing::info!("safe to call from every test");
/// ```
pub fn ensure_test_logging(default_level: Option<Level>) {
    TEST_LOGGING_INIT.call_once(|| {
        // Another subscriber may already be installed; that is fine for tests.
        let _ = init_simple_logging(default_level.unwrap_or(Level::INFO));
    });
}
