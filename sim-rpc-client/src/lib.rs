// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! MessagePack-RPC client for a running simulation server.
//!
//! - [`MsgpackRpcClient`] speaks the wire protocol over one TCP connection
//! - [`SimRpc`] and [`RpcConnector`] are the seams callers depend on, so a fake can stand in
//!   for the server in tests
//! - with the `test-utils` feature, [`test_utils::FakeSimServer`] answers the handful of calls
//!   the settings bootstrap makes

#[macro_use]
extern crate tracing;

mod client;
pub mod codec;
mod connector;
mod endpoint;
mod error;
#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use client::{ClientConfig, ConnectionState, MsgpackRpcClient, ServerInfo};
pub use connector::{RpcConnector, SimRpc, TcpConnector};
pub use endpoint::{DEFAULT_RPC_PORT, RpcEndpoint};
pub use error::{Error, Result};
