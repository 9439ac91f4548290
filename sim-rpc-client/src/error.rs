// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use std::time::Duration;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid RPC endpoint '{0}'")]
    InvalidEndpoint(String),
    #[error("The RPC client is not connected")]
    NotConnected,
    #[error("The RPC connection was closed by the server")]
    ConnectionClosed,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Failed to encode MessagePack-RPC message: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("Failed to decode MessagePack-RPC message: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("Unexpected MessagePack-RPC frame: {0}")]
    UnexpectedFrame(String),
    #[error("RPC call '{method}' failed on the server: {message}")]
    Remote { method: String, message: String },
    #[error("RPC call '{method}' timed out after {timeout:?}")]
    RequestTimedOut { method: String, timeout: Duration },
}
