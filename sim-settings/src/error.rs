// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use sim_rpc_client::RpcEndpoint;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Rpc(#[from] sim_rpc_client::Error),
    #[error("Could not reach the simulation server at {endpoint} after {attempts} attempts")]
    Unreachable {
        endpoint: RpcEndpoint,
        attempts: u32,
    },
    #[error("Failed to parse the settings JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("The settings document is not a JSON object")]
    NotAnObject,
    #[error("Settings have not been initialized with a settings document")]
    SettingsNotInitialized,
    #[error("SimMode is not specified in the settings")]
    SimModeNotSpecified,
    #[error("SimMode '{0}' is not recognized")]
    UnknownSimMode(String),
    #[error("Invalid value for setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },
}
