// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

#[macro_use]
extern crate tracing;

use clap::Parser;
use color_eyre::Result;
use sim_logging::{LogBuilder, LogFormat, LogOutputDest, VerbosityLevel};
use sim_rpc_client::{RpcEndpoint, TcpConnector};
use sim_settings::{BootstrapConfig, ConnectionArgs, SettingsBootstrapper, SimSettings};
use std::str::FromStr;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Opt {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Print the settings JSON exactly as the server returned it.
    #[clap(long)]
    print_settings: bool,

    /// Specify the logging output destination.
    ///
    /// Valid values are "stdout", "stderr", "data-dir", or a custom path.
    ///
    /// `data-dir` is the default data directory of the platform. A path ending in `.log` is
    /// written as a single file, any other path is a directory of daily log files.
    #[clap(long, default_value = "stdout", value_parser = LogOutputDest::parse_from_str, verbatim_doc_comment)]
    log_output_dest: LogOutputDest,

    /// Specify the logging format.
    ///
    /// Valid values are "default" or "json".
    #[clap(long, default_value = "default", value_parser = LogFormat::parse_from_str)]
    log_format: LogFormat,

    /// Log verbosity: "minimal", "standard" or "verbose".
    ///
    /// The SIM_LOG environment variable is applied on top.
    #[clap(long, value_parser = VerbosityLevel::from_str)]
    verbosity: Option<VerbosityLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let opt = Opt::parse();

    let mut log_builder = LogBuilder::new(vec![
        ("simsettings".to_string(), Level::INFO),
        ("sim_settings".to_string(), Level::INFO),
    ]);
    log_builder.output_dest(opt.log_output_dest.clone());
    log_builder.format(opt.log_format);
    log_builder.verbosity(opt.verbosity);
    log_builder.print_updates_to_stdout(false);
    let (_reload_handle, _log_appender_guard) = log_builder.initialize()?;

    let (endpoint, config) = <(RpcEndpoint, BootstrapConfig)>::try_from(&opt.connection)?;
    match config.max_attempts {
        Some(max_attempts) => println!(
            "Fetching settings from the simulation server at {endpoint} (up to {max_attempts} attempts)"
        ),
        None => println!("Fetching settings from the simulation server at {endpoint}"),
    }
    info!("Bootstrapping settings from {endpoint} with {config:?}");

    let mut settings = SimSettings::new();
    let bootstrapper = SettingsBootstrapper::new(
        endpoint,
        config,
        TcpConnector::new(config.client_config()),
        &mut settings,
    )
    .await?;

    if !bootstrapper.is_initialized() {
        println!(
            "The simulation server at {} returned no settings",
            bootstrapper.endpoint()
        );
        return Ok(());
    }

    println!("SimMode: {}", bootstrapper.sim_mode()?);
    println!(
        "Clock: {} x{}",
        settings.clock_type, settings.clock_speed
    );
    for (name, vehicle) in &settings.vehicles {
        println!(
            "Vehicle {name}: {} at ({}, {}, {})",
            vehicle.vehicle_type, vehicle.x, vehicle.y, vehicle.z
        );
    }
    if opt.print_settings {
        println!("{}", bootstrapper.settings_text());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_log_to_stdout() {
        let opt = Opt::try_parse_from(["simsettings"]).unwrap();
        assert_eq!(opt.log_output_dest, LogOutputDest::Stdout);
        assert_eq!(opt.log_format, LogFormat::Default);
        assert_eq!(opt.verbosity, None);
        assert!(!opt.print_settings);
        assert_eq!(opt.connection.max_attempts, None);
    }

    #[test]
    fn test_log_and_connection_flags() {
        let opt = Opt::try_parse_from([
            "simsettings",
            "--port",
            "41452",
            "--max-attempts",
            "5",
            "--log-output-dest",
            "/tmp/simsettings/run.log",
            "--log-format",
            "json",
            "--verbosity",
            "verbose",
            "--print-settings",
        ])
        .unwrap();

        assert_eq!(opt.connection.port, 41452);
        assert_eq!(opt.connection.max_attempts, Some(5));
        assert_eq!(
            opt.log_output_dest,
            LogOutputDest::Path("/tmp/simsettings/run.log".into())
        );
        assert_eq!(opt.log_format, LogFormat::Json);
        assert_eq!(opt.verbosity, Some(VerbosityLevel::Verbose));
        assert!(opt.print_settings);
    }

    #[test]
    fn test_unknown_log_format_is_rejected() {
        assert!(Opt::try_parse_from(["simsettings", "--log-format", "xml"]).is_err());
    }
}
