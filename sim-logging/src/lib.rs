// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Logging setup shared by the simulator settings crates and the `simsettings` binary.

mod error;
mod layers;

use crate::layers::{LogFormatter, OutputLayer};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, str::FromStr};
use tracing::subscriber::DefaultGuard;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_core::Level;
use tracing_subscriber::{Layer, filter::Targets, fmt as tracing_fmt, prelude::*};

pub use error::{Error, Result};
pub use layers::ReloadHandle;

/// Environment variable that adjusts the log targets, e.g. `SIM_LOG=std,sim_rpc_client=trace`.
pub const SIM_LOG_ENV: &str = "SIM_LOG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogOutputDest {
    /// Log to standard output
    Stdout,
    /// Log to standard error
    Stderr,
    /// Log to a `.log` file, or to a directory with daily rotated files
    Path(PathBuf),
}

impl LogOutputDest {
    /// Parses `stdout`, `stderr`, `data-dir` or a filesystem path.
    ///
    /// `data-dir` resolves to `<data dir>/simsettings/logs`.
    pub fn parse_from_str(val: &str) -> Result<Self> {
        match val {
            "stdout" => Ok(LogOutputDest::Stdout),
            "stderr" => Ok(LogOutputDest::Stderr),
            "data-dir" => {
                let dir = dirs_next::data_dir()
                    .ok_or(Error::DataDirNotObtainable)?
                    .join("simsettings")
                    .join("logs");
                Ok(LogOutputDest::Path(dir))
            }
            "" => Err(Error::InvalidOutputDest(val.to_string())),
            value => Ok(LogOutputDest::Path(PathBuf::from(value))),
        }
    }
}

impl std::fmt::Display for LogOutputDest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogOutputDest::Stdout => write!(f, "stdout"),
            LogOutputDest::Stderr => write!(f, "stderr"),
            LogOutputDest::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    #[default]
    Default,
    Json,
}

impl LogFormat {
    pub fn parse_from_str(val: &str) -> Result<Self> {
        match val {
            "default" => Ok(LogFormat::Default),
            "json" => Ok(LogFormat::Json),
            _ => Err(Error::InvalidLogFormat(val.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Default => "default",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Application default targets only
    Minimal,
    /// INFO for every crate in the workspace
    Standard,
    /// TRACE for every crate in the workspace
    Verbose,
}

impl FromStr for VerbosityLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "minimal" | "min" => Ok(VerbosityLevel::Minimal),
            "standard" | "std" => Ok(VerbosityLevel::Standard),
            "verbose" | "v" => Ok(VerbosityLevel::Verbose),
            _ => Err(Error::InvalidVerbosity(s.to_string())),
        }
    }
}

pub struct LogBuilder {
    default_logging_targets: Vec<(String, Level)>,
    output_dest: LogOutputDest,
    format: LogFormat,
    print_updates_to_stdout: bool,
    verbosity: Option<VerbosityLevel>,
}

impl LogBuilder {
    /// Create a new builder.
    ///
    /// `default_logging_targets` apply unless a verbosity level or `SIM_LOG` says otherwise.
    pub fn new(default_logging_targets: Vec<(String, Level)>) -> Self {
        Self {
            default_logging_targets,
            output_dest: LogOutputDest::Stderr,
            format: LogFormat::Default,
            print_updates_to_stdout: true,
            verbosity: None,
        }
    }

    pub fn output_dest(&mut self, output_dest: LogOutputDest) {
        self.output_dest = output_dest;
    }

    pub fn format(&mut self, format: LogFormat) {
        self.format = format;
    }

    pub fn verbosity(&mut self, verbosity: Option<VerbosityLevel>) {
        self.verbosity = verbosity;
    }

    /// Print where logs go and which targets are active. Defaults to true.
    pub fn print_updates_to_stdout(&mut self, print: bool) {
        self.print_updates_to_stdout = print;
    }

    /// Install the global subscriber.
    ///
    /// Keep the returned guard alive for as long as logs should be flushed to a directory.
    pub fn initialize(self) -> Result<(ReloadHandle, Option<WorkerGuard>)> {
        let output = OutputLayer::build(
            self.default_logging_targets,
            &self.output_dest,
            self.format,
            self.print_updates_to_stdout,
            self.verbosity,
        )?;

        tracing_subscriber::registry()
            .with(output.layer)
            .try_init()?;

        Ok((output.reload_handle, output.appender_guard))
    }

    /// Thread-local subscriber for tests running on a single threaded tokio runtime.
    ///
    /// Logs go to the test writer so `cargo test` captures them per test.
    pub fn init_single_threaded_tokio_test() -> DefaultGuard {
        let sim_log = std::env::var(SIM_LOG_ENV).ok();
        let targets = layers::resolve_targets(
            sim_log.as_deref(),
            vec![],
            Some(VerbosityLevel::Verbose),
            false,
        );

        let layer = tracing_fmt::layer()
            .with_ansi(false)
            .with_test_writer()
            .event_format(LogFormatter)
            .with_filter(Targets::new().with_targets(targets));

        tracing::subscriber::set_default(tracing_subscriber::registry().with(layer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_dest_parses_known_keywords_and_paths() {
        assert_eq!(
            LogOutputDest::parse_from_str("stdout").unwrap(),
            LogOutputDest::Stdout
        );
        assert_eq!(
            LogOutputDest::parse_from_str("stderr").unwrap(),
            LogOutputDest::Stderr
        );
        assert_eq!(
            LogOutputDest::parse_from_str("/tmp/sim/run.log").unwrap(),
            LogOutputDest::Path(PathBuf::from("/tmp/sim/run.log"))
        );
        assert!(LogOutputDest::parse_from_str("").is_err());
    }

    #[test]
    fn test_data_dir_dest_points_into_simsettings_logs() {
        if let Ok(LogOutputDest::Path(path)) = LogOutputDest::parse_from_str("data-dir") {
            assert!(path.ends_with("simsettings/logs"));
        }
    }

    #[test]
    fn test_log_format_round_trips_through_str() {
        for format in [LogFormat::Default, LogFormat::Json] {
            assert_eq!(LogFormat::parse_from_str(format.as_str()).unwrap(), format);
        }
        assert!(LogFormat::parse_from_str("yaml").is_err());
    }

    #[test]
    fn test_verbosity_accepts_short_forms() {
        assert_eq!(
            "std".parse::<VerbosityLevel>().unwrap(),
            VerbosityLevel::Standard
        );
        assert_eq!("V".parse::<VerbosityLevel>().unwrap(), VerbosityLevel::Verbose);
        assert_eq!(
            "minimal".parse::<VerbosityLevel>().unwrap(),
            VerbosityLevel::Minimal
        );
        assert!("chatty".parse::<VerbosityLevel>().is_err());
    }

    #[tokio::test]
    async fn test_guard_enables_workspace_targets_until_dropped() {
        let guard = LogBuilder::init_single_threaded_tokio_test();
        assert!(tracing::enabled!(target: "sim_settings", Level::TRACE));
        assert!(tracing::enabled!(target: "sim_rpc_client::client", Level::DEBUG));
        assert!(!tracing::enabled!(target: "hyper", Level::ERROR));

        drop(guard);
        assert!(!tracing::enabled!(target: "sim_settings", Level::ERROR));
    }
}
