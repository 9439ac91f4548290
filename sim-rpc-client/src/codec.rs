// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! MessagePack-RPC framing.
//!
//! Every message is a single MessagePack array:
//! - request `[0, msgid, method, params]`
//! - response `[1, msgid, error, result]`
//! - notification `[2, method, params]`
//!
//! There is no length prefix, so a frame ends where the top level array ends.

use crate::{Error, Result};
use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize, de::DeserializeOwned, de::IgnoredAny};
use std::io::{Cursor, ErrorKind};

pub const REQUEST: u8 = 0;
pub const RESPONSE: u8 = 1;
pub const NOTIFICATION: u8 = 2;

/// Parameters for methods that take no arguments. Encodes as an empty array.
pub const NO_PARAMS: [u8; 0] = [];

/// A complete message taken off the wire.
#[derive(Debug, Clone)]
pub enum Frame {
    Request(RequestFrame),
    Response(ResponseFrame),
    Notification { method: String },
}

#[derive(Debug, Clone)]
pub struct RequestFrame {
    pub msgid: u32,
    pub method: String,
    raw: Bytes,
}

impl RequestFrame {
    /// Decode the request parameters.
    pub fn params<P: DeserializeOwned>(&self) -> Result<P> {
        let (_, _, _, params): (u8, u32, IgnoredAny, P) = rmp_serde::from_slice(&self.raw)?;
        Ok(params)
    }
}

#[derive(Debug, Clone)]
pub struct ResponseFrame {
    pub msgid: u32,
    raw: Bytes,
}

/// The error slot of a response. Servers usually send a string, anything else is kept opaque.
#[derive(Deserialize)]
#[serde(untagged)]
enum RemoteError {
    Message(String),
    Other(IgnoredAny),
}

impl ResponseFrame {
    /// Turn the response into the call result, surfacing a server side error as `Error::Remote`.
    pub fn into_result<R: DeserializeOwned>(self, method: &str) -> Result<R> {
        let (_, _, error, _): (u8, u32, Option<RemoteError>, IgnoredAny) =
            rmp_serde::from_slice(&self.raw)?;
        match error {
            Some(RemoteError::Message(message)) => Err(Error::Remote {
                method: method.to_string(),
                message,
            }),
            Some(RemoteError::Other(_)) => Err(Error::Remote {
                method: method.to_string(),
                message: "non-string error payload".to_string(),
            }),
            None => {
                let (_, _, _, result): (u8, u32, IgnoredAny, R) =
                    rmp_serde::from_slice(&self.raw)?;
                Ok(result)
            }
        }
    }
}

pub fn encode_request<P: Serialize + ?Sized>(msgid: u32, method: &str, params: &P) -> Result<Vec<u8>> {
    Ok(rmp_serde::to_vec(&(REQUEST, msgid, method, params))?)
}

/// Encode a response. `Err` carries the error message sent back to the caller.
pub fn encode_response<R: Serialize>(msgid: u32, outcome: std::result::Result<&R, &str>) -> Result<Vec<u8>> {
    let bytes = match outcome {
        Ok(result) => rmp_serde::to_vec(&(RESPONSE, msgid, None::<&str>, Some(result)))?,
        Err(message) => rmp_serde::to_vec(&(RESPONSE, msgid, Some(message), None::<&R>))?,
    };
    Ok(bytes)
}

pub fn encode_notification<P: Serialize + ?Sized>(method: &str, params: &P) -> Result<Vec<u8>> {
    Ok(rmp_serde::to_vec(&(NOTIFICATION, method, params))?)
}

/// Take one complete frame off the front of `buf`.
///
/// Returns `Ok(None)` and leaves `buf` untouched while the frame is still incomplete.
pub fn decode_frame(buf: &mut BytesMut) -> Result<Option<Frame>> {
    if buf.is_empty() {
        return Ok(None);
    }

    let (len, elements) = {
        let mut cursor = Cursor::new(&buf[..]);
        let mut de = rmp_serde::Deserializer::new(&mut cursor);
        match Vec::<IgnoredAny>::deserialize(&mut de) {
            Ok(elements) => {
                drop(de);
                (cursor.position() as usize, elements.len())
            }
            Err(err) if is_incomplete(&err) => return Ok(None),
            Err(err) => return Err(err.into()),
        }
    };

    let raw = buf.split_to(len).freeze();
    let frame = match elements {
        4 => {
            let (kind, msgid, _, _): (u8, u32, IgnoredAny, IgnoredAny) =
                rmp_serde::from_slice(&raw)?;
            match kind {
                REQUEST => {
                    let (_, _, method, _): (u8, u32, String, IgnoredAny) =
                        rmp_serde::from_slice(&raw)?;
                    Frame::Request(RequestFrame { msgid, method, raw })
                }
                RESPONSE => Frame::Response(ResponseFrame { msgid, raw }),
                other => {
                    return Err(Error::UnexpectedFrame(format!(
                        "message type {other} with 4 elements"
                    )));
                }
            }
        }
        3 => {
            let (kind, method, _): (u8, String, IgnoredAny) = rmp_serde::from_slice(&raw)?;
            if kind != NOTIFICATION {
                return Err(Error::UnexpectedFrame(format!(
                    "message type {kind} with 3 elements"
                )));
            }
            Frame::Notification { method }
        }
        other => {
            return Err(Error::UnexpectedFrame(format!(
                "array with {other} elements"
            )));
        }
    };

    Ok(Some(frame))
}

fn is_incomplete(err: &rmp_serde::decode::Error) -> bool {
    use rmp_serde::decode::Error as DecodeError;
    match err {
        DecodeError::InvalidMarkerRead(io) | DecodeError::InvalidDataRead(io) => {
            io.kind() == ErrorKind::UnexpectedEof
        }
        _ => false,
    }
}
