// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{Error, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use sim_rpc_client::{ClientConfig, DEFAULT_RPC_PORT, RpcEndpoint};
use std::time::Duration;

pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Controls the connect/fetch retry loop of the bootstrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Give up after this many failed attempts. `None` retries forever.
    pub max_attempts: Option<u32>,
    /// Pause after a failed attempt before opening the next connection.
    pub retry_delay: Duration,
    /// Pause between opening a connection and checking its state.
    pub settle_delay: Duration,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl BootstrapConfig {
    pub fn new() -> Self {
        Self {
            max_attempts: None,
            retry_delay: DEFAULT_RETRY_DELAY,
            settle_delay: DEFAULT_SETTLE_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Values below one are raised to one.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts.max(1));
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// The timeouts handed to every RPC client the bootstrapper opens.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
        }
    }
}

/// Command line arguments selecting the simulation server and the retry policy.
#[derive(Args, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionArgs {
    /// Host name or IP address of the simulation server.
    #[clap(long, env = "SIM_RPC_HOST", default_value = "127.0.0.1")]
    pub host: String,
    /// RPC port of the simulation server.
    #[clap(long, env = "SIM_RPC_PORT", default_value_t = DEFAULT_RPC_PORT)]
    pub port: u16,
    /// Give up after this many failed attempts.
    ///
    /// Retries forever if not provided.
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: Option<u32>,
    /// Milliseconds to wait after a failed attempt.
    #[clap(long, default_value_t = 1000)]
    pub retry_delay_ms: u64,
    /// Milliseconds to wait between connecting and checking the connection state.
    #[clap(long, default_value_t = 1000)]
    pub settle_delay_ms: u64,
    #[clap(long, default_value_t = 5000)]
    pub connect_timeout_ms: u64,
    #[clap(long, default_value_t = 10000)]
    pub request_timeout_ms: u64,
}

impl Default for ConnectionArgs {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_RPC_PORT,
            max_attempts: None,
            retry_delay_ms: 1000,
            settle_delay_ms: 1000,
            connect_timeout_ms: 5000,
            request_timeout_ms: 10000,
        }
    }
}

impl TryFrom<&ConnectionArgs> for (RpcEndpoint, BootstrapConfig) {
    type Error = Error;

    fn try_from(args: &ConnectionArgs) -> Result<Self> {
        let host = args.host.trim();
        if host.is_empty() {
            return Err(sim_rpc_client::Error::InvalidEndpoint(args.host.clone()).into());
        }
        let endpoint = RpcEndpoint::new(host, args.port);

        let mut config = BootstrapConfig::new()
            .with_retry_delay(Duration::from_millis(args.retry_delay_ms))
            .with_settle_delay(Duration::from_millis(args.settle_delay_ms))
            .with_connect_timeout(Duration::from_millis(args.connect_timeout_ms))
            .with_request_timeout(Duration::from_millis(args.request_timeout_ms));
        if let Some(max_attempts) = args.max_attempts {
            config = config.with_max_attempts(max_attempts);
        }

        Ok((endpoint, config))
    }
}
