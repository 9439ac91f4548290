// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use color_eyre::Result;
use sim_logging::{LogBuilder, LogFormat, LogOutputDest};
use tempfile::TempDir;
use tracing::Level;

// Installing the global subscriber can only happen once per process, so this file holds a
// single test.
#[test]
fn test_logs_are_written_to_a_single_log_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let log_path = temp_dir.path().join("nested").join("bootstrap.log");

    let mut builder = LogBuilder::new(vec![("file_output".to_string(), Level::INFO)]);
    builder.output_dest(LogOutputDest::Path(log_path.clone()));
    builder.format(LogFormat::Default);
    builder.print_updates_to_stdout(false);
    let (reload_handle, guard) = builder.initialize()?;
    assert!(guard.is_none(), "single file logging needs no appender guard");

    tracing::info!("settings bootstrap started");
    tracing::debug!("filtered out at info level");

    reload_handle.modify_log_level("file_output=debug")?;
    tracing::debug!("visible after reload");

    let contents = std::fs::read_to_string(&log_path)?;
    assert!(contents.contains("settings bootstrap started"));
    assert!(!contents.contains("filtered out at info level"));
    assert!(contents.contains("visible after reload"));

    Ok(())
}
