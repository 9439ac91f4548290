// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! Bootstraps simulator settings from a running simulation server.
//!
//! [`SettingsBootstrapper`] connects over RPC, retrying until the server is reachable, reads the
//! settings JSON and loads it into a [`SettingsStore`] such as [`SimSettings`].

#[macro_use]
extern crate tracing;

mod bootstrapper;
mod config;
mod document;
mod error;
mod store;

pub use bootstrapper::{SettingsBootstrapper, SettingsFetch};
pub use config::{BootstrapConfig, ConnectionArgs};
pub use document::{SIM_MODE_KEY, SettingsDocument, extract_sim_mode};
pub use error::{Error, Result};
pub use store::{SettingsStore, SimMode, SimSettings, VehicleSetting};
