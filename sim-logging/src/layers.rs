// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{LogFormat, LogOutputDest, SIM_LOG_ENV, VerbosityLevel, error::Result};
use std::{collections::BTreeMap, fs::OpenOptions, path::Path, sync::Mutex};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_core::{Event, Level, Subscriber};
use tracing_subscriber::{
    Layer, Registry,
    filter::Targets,
    fmt::{
        self as tracing_fmt, FmtContext, FormatEvent, FormatFields,
        format::Writer,
        time::{FormatTime, SystemTime},
        writer::BoxMakeWriter,
    },
    layer::Filter,
    registry::LookupSpan,
    reload::{self, Handle},
};

const ROLLING_LOG_FILE_PREFIX: &str = "simsettings.log";

/// Crates switched on by the `standard` and `verbose` levels.
const WORKSPACE_TARGETS: &[&str] = &[
    "simsettings",
    "sim_logging",
    "sim_rpc_client",
    "sim_settings",
];

type TargetFilter = Box<dyn Filter<Registry> + Send + Sync>;

/// Swaps the active log targets of an initialized subscriber.
pub struct ReloadHandle(Handle<TargetFilter, Registry>);

impl ReloadHandle {
    /// Replaces the active targets with the ones described by `directives`.
    ///
    /// Uses the `SIM_LOG` syntax, e.g. `sim_rpc_client=debug,tokio=warn,std`.
    pub fn modify_log_level(&self, directives: &str) -> Result<()> {
        let targets = resolve_targets(Some(directives), vec![], None, false);
        self.0.reload(target_filter(targets))?;
        Ok(())
    }
}

/// One line per event: `<time> <LEVEL> <target>:<line> <spans>: <fields>`.
pub(crate) struct LogFormatter;

impl<S, N> FormatEvent<S, N> for LogFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        SystemTime.format_time(&mut writer)?;
        write!(writer, " {:>5} {}", metadata.level(), metadata.target())?;
        if let Some(line) = metadata.line() {
            write!(writer, ":{line}")?;
        }
        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, " {}", span.name())?;
            }
        }
        write!(writer, ": ")?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// The formatting layer installed by `LogBuilder`, with what it needs kept alive.
pub(crate) struct OutputLayer {
    pub(crate) layer: Box<dyn Layer<Registry> + Send + Sync>,
    pub(crate) reload_handle: ReloadHandle,
    pub(crate) appender_guard: Option<WorkerGuard>,
}

impl OutputLayer {
    pub(crate) fn build(
        default_targets: Vec<(String, Level)>,
        output_dest: &LogOutputDest,
        format: LogFormat,
        announce: bool,
        verbosity: Option<VerbosityLevel>,
    ) -> Result<Self> {
        let (writer, appender_guard) = make_writer(output_dest, announce)?;
        let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match format {
            LogFormat::Json => tracing_fmt::layer()
                .json()
                .flatten_event(true)
                .with_writer(writer)
                .boxed(),
            LogFormat::Default => tracing_fmt::layer()
                .with_ansi(false)
                .event_format(LogFormatter)
                .with_writer(writer)
                .boxed(),
        };

        let sim_log = std::env::var(SIM_LOG_ENV).ok();
        let targets = resolve_targets(sim_log.as_deref(), default_targets, verbosity, announce);
        let (filter, handle) = reload::Layer::new(target_filter(targets));

        Ok(Self {
            layer: Box::new(fmt_layer.with_filter(filter)),
            reload_handle: ReloadHandle(handle),
            appender_guard,
        })
    }
}

fn make_writer(
    output_dest: &LogOutputDest,
    announce: bool,
) -> Result<(BoxMakeWriter, Option<WorkerGuard>)> {
    if announce {
        println!("Logging to {output_dest}");
    }
    match output_dest {
        LogOutputDest::Stdout => Ok((BoxMakeWriter::new(std::io::stdout), None)),
        LogOutputDest::Stderr => Ok((BoxMakeWriter::new(std::io::stderr), None)),
        LogOutputDest::Path(path) if is_single_file(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Ok((BoxMakeWriter::new(Mutex::new(file)), None))
        }
        LogOutputDest::Path(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, ROLLING_LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            Ok((BoxMakeWriter::new(writer), Some(guard)))
        }
    }
}

fn is_single_file(path: &Path) -> bool {
    path.extension().is_some_and(|extension| extension == "log")
}

fn target_filter(targets: Vec<(String, Level)>) -> TargetFilter {
    Box::new(Targets::new().with_targets(targets))
}

/// An entry of a `SIM_LOG` value.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Directive {
    /// `minimal`, `standard` or `verbose`, or a short form of them
    Verbosity(VerbosityLevel),
    /// `crate=level`, or a bare `crate` meaning trace
    Target(String, Level),
}

impl Directive {
    fn parse(entry: &str) -> Option<Self> {
        let entry = entry.trim();
        if entry.is_empty() {
            return None;
        }
        if let Ok(verbosity) = entry.parse::<VerbosityLevel>() {
            return Some(Directive::Verbosity(verbosity));
        }
        let (target, level) = match entry.split_once('=') {
            Some((target, level)) => (target.trim(), level.trim().parse::<Level>().ok()?),
            None => (entry, Level::TRACE),
        };
        if target.is_empty() {
            return None;
        }
        Some(Directive::Target(target.to_string(), level))
    }
}

fn parse_directives(value: &str) -> Vec<Directive> {
    value.split(',').filter_map(Directive::parse).collect()
}

/// Works out the targets to log.
///
/// A `standard` or `verbose` level passed in wins over one named in `sim_log`. Without either,
/// `default_targets` are used. `crate=level` entries of `sim_log` go on top in every case.
pub(crate) fn resolve_targets(
    sim_log: Option<&str>,
    default_targets: Vec<(String, Level)>,
    verbosity: Option<VerbosityLevel>,
    announce: bool,
) -> Vec<(String, Level)> {
    let directives = sim_log.map(parse_directives).unwrap_or_default();
    let env_verbosity = directives.iter().rev().find_map(|directive| match directive {
        Directive::Verbosity(verbosity) => Some(*verbosity),
        Directive::Target(..) => None,
    });
    let verbosity = match verbosity {
        Some(VerbosityLevel::Minimal) | None => env_verbosity,
        requested => requested,
    };

    let mut targets: BTreeMap<String, Level> = match verbosity {
        Some(VerbosityLevel::Standard) => workspace_targets(Level::INFO),
        Some(VerbosityLevel::Verbose) => workspace_targets(Level::TRACE),
        Some(VerbosityLevel::Minimal) | None => default_targets.into_iter().collect(),
    };
    if announce {
        println!("Log verbosity: {verbosity:?}");
    }

    for directive in directives {
        if let Directive::Target(target, level) = directive {
            targets.insert(target, level);
        }
    }
    targets.into_iter().collect()
}

fn workspace_targets(level: Level) -> BTreeMap<String, Level> {
    WORKSPACE_TARGETS
        .iter()
        .map(|target| (target.to_string(), level))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_defaults() -> Vec<(String, Level)> {
        vec![("sim_settings".to_string(), Level::DEBUG)]
    }

    fn level_of(targets: &[(String, Level)], name: &str) -> Option<Level> {
        targets
            .iter()
            .find(|(target, _)| target == name)
            .map(|(_, level)| *level)
    }

    #[test]
    fn test_no_env_and_no_verbosity_uses_application_defaults() {
        let targets = resolve_targets(None, app_defaults(), None, false);
        assert_eq!(targets, app_defaults());
    }

    #[test]
    fn test_requested_verbosity_wins_over_env() {
        let targets = resolve_targets(
            Some("std"),
            app_defaults(),
            Some(VerbosityLevel::Verbose),
            false,
        );
        assert_eq!(level_of(&targets, "sim_rpc_client"), Some(Level::TRACE));
        assert_eq!(level_of(&targets, "sim_settings"), Some(Level::TRACE));
    }

    #[test]
    fn test_env_verbosity_applies_when_minimal_is_requested() {
        let targets = resolve_targets(
            Some("standard"),
            app_defaults(),
            Some(VerbosityLevel::Minimal),
            false,
        );
        assert_eq!(level_of(&targets, "sim_settings"), Some(Level::INFO));
        assert_eq!(level_of(&targets, "simsettings"), Some(Level::INFO));
    }

    #[test]
    fn test_crate_levels_go_on_top() {
        let targets = resolve_targets(
            Some("std,sim_rpc_client=debug,tokio=WARN"),
            app_defaults(),
            None,
            false,
        );
        assert_eq!(level_of(&targets, "sim_rpc_client"), Some(Level::DEBUG));
        assert_eq!(level_of(&targets, "tokio"), Some(Level::WARN));
        assert_eq!(level_of(&targets, "sim_settings"), Some(Level::INFO));
    }

    #[test]
    fn test_malformed_directives_are_skipped() {
        assert_eq!(
            parse_directives(" ,=debug,foo=loud,bar,MIN"),
            vec![
                Directive::Target("bar".to_string(), Level::TRACE),
                Directive::Verbosity(VerbosityLevel::Minimal),
            ]
        );
    }

    #[test]
    fn test_log_extension_selects_a_single_file() {
        assert!(is_single_file(Path::new("/tmp/sim/run.log")));
        assert!(!is_single_file(Path::new("/tmp/sim/logs")));
        assert!(!is_single_file(Path::new("/tmp/sim/run.log.1")));
    }
}
