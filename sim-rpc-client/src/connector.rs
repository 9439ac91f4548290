// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{ClientConfig, ConnectionState, MsgpackRpcClient, Result, RpcEndpoint};
use async_trait::async_trait;

/// The calls a settings bootstrap needs from a simulation server connection.
#[async_trait]
pub trait SimRpc: Send + Sync {
    async fn connection_state(&self) -> ConnectionState;
    async fn get_settings_string(&self) -> Result<String>;
}

/// Opens a new connection to a simulation server.
///
/// Every call yields a fresh client; connections are never reused across attempts.
#[async_trait]
pub trait RpcConnector: Send + Sync {
    async fn connect(&self, endpoint: &RpcEndpoint) -> Box<dyn SimRpc>;
}

#[async_trait]
impl SimRpc for MsgpackRpcClient {
    async fn connection_state(&self) -> ConnectionState {
        MsgpackRpcClient::connection_state(self).await
    }

    async fn get_settings_string(&self) -> Result<String> {
        MsgpackRpcClient::get_settings_string(self).await
    }
}

/// Connects over TCP with [`MsgpackRpcClient`].
#[derive(Debug, Clone, Default)]
pub struct TcpConnector {
    config: ClientConfig,
}

impl TcpConnector {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl RpcConnector for TcpConnector {
    async fn connect(&self, endpoint: &RpcEndpoint) -> Box<dyn SimRpc> {
        Box::new(MsgpackRpcClient::connect(endpoint.clone(), self.config).await)
    }
}
