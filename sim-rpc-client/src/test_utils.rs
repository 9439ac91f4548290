// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! An in-process stand-in for a simulation server's RPC listener.

use crate::{
    Result, RpcEndpoint,
    codec::{self, Frame, RequestFrame},
};
use bytes::BytesMut;
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    task::{JoinHandle, JoinSet},
};

pub const FAKE_SERVER_VERSION: i32 = 1;

#[derive(Debug, Clone, Default)]
pub struct FakeSimServerBuilder {
    settings: String,
    server_version: Option<i32>,
    drop_first_connections: usize,
    settings_error: Option<String>,
    response_delay: Option<Duration>,
}

impl FakeSimServerBuilder {
    /// The text returned by `getSettingsString`.
    pub fn settings(mut self, text: impl Into<String>) -> Self {
        self.settings = text.into();
        self
    }

    pub fn server_version(mut self, version: i32) -> Self {
        self.server_version = Some(version);
        self
    }

    /// Accept and immediately close the first `count` connections.
    pub fn drop_first_connections(mut self, count: usize) -> Self {
        self.drop_first_connections = count;
        self
    }

    /// Answer `getSettingsString` with this error message instead of the settings.
    pub fn settings_error(mut self, message: impl Into<String>) -> Self {
        self.settings_error = Some(message.into());
        self
    }

    /// Wait this long before answering every request.
    pub fn response_delay(mut self, delay: Duration) -> Self {
        self.response_delay = Some(delay);
        self
    }

    pub async fn spawn(self) -> Result<FakeSimServer> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let endpoint = RpcEndpoint::new("127.0.0.1", listener.local_addr()?.port());

        let connections = Arc::new(AtomicUsize::new(0));
        let settings_requests = Arc::new(AtomicUsize::new(0));
        let behaviour = Arc::new(Behaviour {
            settings: self.settings,
            server_version: self.server_version.unwrap_or(FAKE_SERVER_VERSION),
            settings_error: self.settings_error,
            response_delay: self.response_delay,
            settings_requests: Arc::clone(&settings_requests),
        });

        let accept_task = tokio::spawn(accept_loop(
            listener,
            self.drop_first_connections,
            Arc::clone(&connections),
            behaviour,
        ));

        Ok(FakeSimServer {
            endpoint,
            connections,
            settings_requests,
            accept_task,
        })
    }
}

/// Listens on an ephemeral localhost port until dropped.
#[derive(Debug)]
pub struct FakeSimServer {
    endpoint: RpcEndpoint,
    connections: Arc<AtomicUsize>,
    settings_requests: Arc<AtomicUsize>,
    accept_task: JoinHandle<()>,
}

impl FakeSimServer {
    pub fn builder() -> FakeSimServerBuilder {
        FakeSimServerBuilder::default()
    }

    pub fn endpoint(&self) -> RpcEndpoint {
        self.endpoint.clone()
    }

    /// Connections accepted so far, dropped ones included.
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn settings_request_count(&self) -> usize {
        self.settings_requests.load(Ordering::SeqCst)
    }
}

impl Drop for FakeSimServer {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

/// An endpoint on localhost with nothing listening behind it.
pub async fn unreachable_endpoint() -> Result<RpcEndpoint> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(RpcEndpoint::new("127.0.0.1", port))
}

#[derive(Debug)]
struct Behaviour {
    settings: String,
    server_version: i32,
    settings_error: Option<String>,
    response_delay: Option<Duration>,
    settings_requests: Arc<AtomicUsize>,
}

impl Behaviour {
    fn respond(&self, request: &RequestFrame) -> Result<Vec<u8>> {
        match request.method.as_str() {
            "ping" => codec::encode_response(request.msgid, Ok(&true)),
            "getServerVersion" => codec::encode_response(request.msgid, Ok(&self.server_version)),
            "getSettingsString" => {
                self.settings_requests.fetch_add(1, Ordering::SeqCst);
                match &self.settings_error {
                    Some(message) => {
                        codec::encode_response::<String>(request.msgid, Err(message.as_str()))
                    }
                    None => codec::encode_response(request.msgid, Ok(&self.settings)),
                }
            }
            method => {
                let message = format!("unknown method '{method}'");
                codec::encode_response::<()>(request.msgid, Err(message.as_str()))
            }
        }
    }
}

// The JoinSet lives in this task, so aborting it also stops every open connection.
async fn accept_loop(
    listener: TcpListener,
    drop_first: usize,
    connections: Arc<AtomicUsize>,
    behaviour: Arc<Behaviour>,
) {
    let mut open = JoinSet::new();
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(err) => {
                warn!("Fake simulation server failed to accept: {err}");
                continue;
            }
        };
        let seen = connections.fetch_add(1, Ordering::SeqCst) + 1;
        if seen <= drop_first {
            debug!("Fake simulation server dropping connection {seen} from {peer}");
            drop(stream);
            continue;
        }

        let behaviour = Arc::clone(&behaviour);
        open.spawn(async move {
            if let Err(err) = serve_connection(stream, behaviour).await {
                debug!("Fake simulation server connection from {peer} ended: {err}");
            }
        });
    }
}

async fn serve_connection(mut stream: TcpStream, behaviour: Arc<Behaviour>) -> Result<()> {
    let mut buf = BytesMut::with_capacity(1024);
    loop {
        while let Some(frame) = codec::decode_frame(&mut buf)? {
            let Frame::Request(request) = frame else {
                continue;
            };
            if let Some(delay) = behaviour.response_delay {
                tokio::time::sleep(delay).await;
            }
            let response = behaviour.respond(&request)?;
            stream.write_all(&response).await?;
        }

        if stream.read_buf(&mut buf).await? == 0 {
            return Ok(());
        }
    }
}
