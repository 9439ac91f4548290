// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{
    Error, Result, RpcEndpoint,
    codec::{self, Frame, NO_PARAMS, ResponseFrame},
};
use bytes::BytesMut;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{fmt, time::Duration};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    sync::Mutex,
};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// State of the connection behind a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No connection attempt has been made
    Initial,
    /// The socket is open
    Connected,
    /// The connection attempt failed or the server closed the socket
    Disconnected,
    /// The socket was torn down after an I/O error or timeout
    Reset,
    Unknown,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Initial => "initial",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Reset => "reset",
            ConnectionState::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// How long to wait for the TCP handshake
    pub connect_timeout: Duration,
    /// How long to wait for the response to a single call
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub endpoint: RpcEndpoint,
    pub version: i32,
}

struct Connection {
    stream: Option<TcpStream>,
    read_buf: BytesMut,
    state: ConnectionState,
    next_msgid: u32,
}

impl Connection {
    async fn round_trip(&mut self, msgid: u32, request: &[u8]) -> Result<ResponseFrame> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(Error::NotConnected);
        };
        stream.write_all(request).await?;

        loop {
            while let Some(frame) = codec::decode_frame(&mut self.read_buf)? {
                match frame {
                    Frame::Response(response) if response.msgid == msgid => return Ok(response),
                    Frame::Response(response) => {
                        debug!(
                            "Discarding response for msgid {} while waiting for {msgid}",
                            response.msgid
                        );
                    }
                    Frame::Notification { method } => {
                        trace!("Ignoring notification '{method}' from the server");
                    }
                    Frame::Request(request) => {
                        debug!(
                            "Ignoring unsolicited request '{}' from the server",
                            request.method
                        );
                    }
                }
            }

            if stream.read_buf(&mut self.read_buf).await? == 0 {
                return Err(Error::ConnectionClosed);
            }
        }
    }

    fn tear_down(&mut self, state: ConnectionState) {
        self.stream = None;
        self.read_buf.clear();
        self.state = state;
    }
}

/// MessagePack-RPC client over a single TCP connection.
///
/// Construction never fails: whether the server was reachable shows up in
/// [`MsgpackRpcClient::connection_state`]. Calls are serialised, one request in flight at a time.
pub struct MsgpackRpcClient {
    endpoint: RpcEndpoint,
    config: ClientConfig,
    connection: Mutex<Connection>,
}

impl MsgpackRpcClient {
    pub async fn connect(endpoint: RpcEndpoint, config: ClientConfig) -> Self {
        debug!("Connecting to the simulation server at {endpoint}");
        let attempt = tokio::time::timeout(
            config.connect_timeout,
            TcpStream::connect((endpoint.host.as_str(), endpoint.port)),
        )
        .await;

        let (stream, state) = match attempt {
            Ok(Ok(stream)) => {
                if let Err(err) = stream.set_nodelay(true) {
                    warn!("Could not disable Nagle's algorithm on {endpoint}: {err}");
                }
                info!("Connected to the simulation server at {endpoint}");
                (Some(stream), ConnectionState::Connected)
            }
            Ok(Err(err)) => {
                debug!("Failed to connect to {endpoint}: {err}");
                (None, ConnectionState::Disconnected)
            }
            Err(_) => {
                debug!(
                    "Connecting to {endpoint} timed out after {:?}",
                    config.connect_timeout
                );
                (None, ConnectionState::Disconnected)
            }
        };

        Self {
            endpoint,
            config,
            connection: Mutex::new(Connection {
                stream,
                read_buf: BytesMut::with_capacity(4096),
                state,
                next_msgid: 0,
            }),
        }
    }

    pub fn endpoint(&self) -> &RpcEndpoint {
        &self.endpoint
    }

    pub async fn connection_state(&self) -> ConnectionState {
        self.connection.lock().await.state
    }

    /// Invoke `method` and decode its result.
    ///
    /// An I/O failure or timeout tears the connection down; a server side error leaves it open.
    pub async fn call<P, R>(&self, method: &str, params: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut connection = self.connection.lock().await;
        let msgid = connection.next_msgid;
        connection.next_msgid = connection.next_msgid.wrapping_add(1);

        let request = codec::encode_request(msgid, method, params)?;
        trace!("Calling '{method}' (msgid {msgid}) on {}", self.endpoint);

        let outcome = tokio::time::timeout(
            self.config.request_timeout,
            connection.round_trip(msgid, &request),
        )
        .await;

        match outcome {
            Ok(Ok(response)) => response.into_result(method),
            Ok(Err(err)) => {
                match &err {
                    Error::NotConnected => {}
                    Error::ConnectionClosed => {
                        warn!("{} closed the connection during '{method}'", self.endpoint);
                        connection.tear_down(ConnectionState::Disconnected);
                    }
                    _ => {
                        error!("RPC call '{method}' to {} failed: {err}", self.endpoint);
                        connection.tear_down(ConnectionState::Reset);
                    }
                }
                Err(err)
            }
            Err(_) => {
                error!(
                    "RPC call '{method}' to {} timed out after {:?}",
                    self.endpoint, self.config.request_timeout
                );
                connection.tear_down(ConnectionState::Reset);
                Err(Error::RequestTimedOut {
                    method: method.to_string(),
                    timeout: self.config.request_timeout,
                })
            }
        }
    }

    pub async fn ping(&self) -> Result<bool> {
        self.call("ping", &NO_PARAMS).await
    }

    pub async fn get_server_version(&self) -> Result<i32> {
        self.call("getServerVersion", &NO_PARAMS).await
    }

    /// Ping the server and read its version in one go.
    pub async fn server_info(&self) -> Result<ServerInfo> {
        if !self.ping().await? {
            return Err(Error::UnexpectedFrame("ping returned false".to_string()));
        }
        Ok(ServerInfo {
            endpoint: self.endpoint.clone(),
            version: self.get_server_version().await?,
        })
    }

    /// The server's settings document, as JSON text.
    pub async fn get_settings_string(&self) -> Result<String> {
        self.call("getSettingsString", &NO_PARAMS).await
    }
}

impl fmt::Debug for MsgpackRpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MsgpackRpcClient")
            .field("endpoint", &self.endpoint)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
