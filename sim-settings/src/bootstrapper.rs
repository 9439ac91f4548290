// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{
    BootstrapConfig, Error, Result, document::extract_sim_mode, store::SettingsStore,
};
use sim_rpc_client::{ConnectionState, RpcConnector, RpcEndpoint};

/// The outcome of [`SettingsBootstrapper::fetch_settings_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsFetch {
    pub text: String,
    /// Connection attempts made, the successful one included.
    pub attempts: u32,
}

impl SettingsFetch {
    /// Whether the server handed back any settings at all.
    pub fn found(&self) -> bool {
        !self.text.is_empty()
    }
}

/// Pulls the settings text from a simulation server and loads it into a [`SettingsStore`].
///
/// All of the work happens in [`SettingsBootstrapper::new`]: it keeps opening connections until
/// one of them reports `Connected`, reads the settings string, and hands it to the store. With
/// no attempt limit configured this waits for as long as the server stays unreachable.
#[derive(Debug)]
pub struct SettingsBootstrapper<C> {
    endpoint: RpcEndpoint,
    config: BootstrapConfig,
    connector: C,
    settings_text: String,
    initialized: bool,
}

impl<C: RpcConnector> SettingsBootstrapper<C> {
    pub async fn new(
        endpoint: RpcEndpoint,
        config: BootstrapConfig,
        connector: C,
        store: &mut dyn SettingsStore,
    ) -> Result<Self> {
        let mut bootstrapper = Self::unstarted(endpoint, config, connector);
        bootstrapper.initialized = bootstrapper.initialize(store).await?;
        Ok(bootstrapper)
    }

    fn unstarted(endpoint: RpcEndpoint, config: BootstrapConfig, connector: C) -> Self {
        Self {
            endpoint,
            config,
            connector,
            settings_text: String::new(),
            initialized: false,
        }
    }

    /// The result `new` computed. It never changes afterwards.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn endpoint(&self) -> &RpcEndpoint {
        &self.endpoint
    }

    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// The last settings text fetched, empty if none was.
    pub fn settings_text(&self) -> &str {
        &self.settings_text
    }

    /// Opens a fresh connection per attempt until one reports `Connected` and answers with the
    /// settings string.
    ///
    /// An empty settings string still ends the loop; check [`SettingsFetch::found`]. A call that
    /// fails after the connection reported `Connected` counts as a failed attempt. Returns
    /// [`Error::Unreachable`] once `max_attempts` attempts have failed.
    pub async fn fetch_settings_text(&self) -> Result<SettingsFetch> {
        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            let client = self.connector.connect(&self.endpoint).await;
            tokio::time::sleep(self.config.settle_delay).await;

            let state = client.connection_state().await;
            if state == ConnectionState::Connected {
                match client.get_settings_string().await {
                    Ok(text) => {
                        if text.is_empty() {
                            warn!(
                                "Simulation server at {} returned empty settings",
                                self.endpoint
                            );
                        } else {
                            debug!(
                                "Fetched {} bytes of settings from {} on attempt {attempts}",
                                text.len(),
                                self.endpoint
                            );
                        }
                        return Ok(SettingsFetch { text, attempts });
                    }
                    Err(err) => warn!(
                        "Connected to the simulation server at {} but could not read its settings: {err}. Retrying, attempt {attempts}",
                        self.endpoint
                    ),
                }
            } else {
                warn!(
                    "Failed to connect to the simulation server at {} (state: {state}). Retrying, attempt {attempts}",
                    self.endpoint
                );
            }

            if self
                .config
                .max_attempts
                .is_some_and(|max_attempts| attempts >= max_attempts)
            {
                error!(
                    "Giving up on the simulation server at {} after {attempts} attempts",
                    self.endpoint
                );
                return Err(Error::Unreachable {
                    endpoint: self.endpoint.clone(),
                    attempts,
                });
            }

            tokio::time::sleep(self.config.retry_delay).await;
            drop(client);
        }
    }

    /// `SimMode` of the last fetched settings text, or an empty string if it names none.
    pub fn sim_mode(&self) -> Result<String> {
        extract_sim_mode(&self.settings_text)
    }

    /// Fetches the settings text and hands it to `store`.
    ///
    /// Returns `Ok(false)` when the server answered with empty settings, in which case the store
    /// is left alone. Errors raised by the store are passed through.
    pub async fn initialize(&mut self, store: &mut dyn SettingsStore) -> Result<bool> {
        let fetch = self.fetch_settings_text().await?;
        if !fetch.found() {
            self.settings_text.clear();
            return Ok(false);
        }
        self.settings_text = fetch.text;

        let text = &self.settings_text;
        store.initialize_settings(text)?;
        store.load(&|| extract_sim_mode(text))?;

        debug!("SimMode: {}", self.sim_mode()?);
        Ok(true)
    }
}
