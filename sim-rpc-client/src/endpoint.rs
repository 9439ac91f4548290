// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The port a simulation server listens on for RPC unless configured otherwise.
pub const DEFAULT_RPC_PORT: u16 = 41451;

/// Address of the simulation server's RPC listener.
///
/// The host is taken as given: a hostname, an IPv4 address or an IPv6 address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RpcEndpoint {
    pub host: String,
    pub port: u16,
}

impl RpcEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn localhost() -> Self {
        Self::new("127.0.0.1", DEFAULT_RPC_PORT)
    }
}

impl Default for RpcEndpoint {
    fn default() -> Self {
        Self::localhost()
    }
}

impl fmt::Display for RpcEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for RpcEndpoint {
    type Err = Error;

    /// Accepts `host`, `host:port`, `[v6]` and `[v6]:port`. A bare IPv6 address without brackets
    /// is taken as a host with the default port.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidEndpoint(s.to_string()));
        }

        if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| Error::InvalidEndpoint(s.to_string()))?;
            if host.is_empty() {
                return Err(Error::InvalidEndpoint(s.to_string()));
            }
            let port = match tail {
                "" => DEFAULT_RPC_PORT,
                tail => parse_port(s, tail.strip_prefix(':'))?,
            };
            return Ok(Self::new(host, port));
        }

        match s.matches(':').count() {
            0 => Ok(Self::new(s, DEFAULT_RPC_PORT)),
            1 => {
                let (host, port) = s
                    .split_once(':')
                    .ok_or_else(|| Error::InvalidEndpoint(s.to_string()))?;
                if host.is_empty() {
                    return Err(Error::InvalidEndpoint(s.to_string()));
                }
                Ok(Self::new(host, parse_port(s, Some(port))?))
            }
            _ => Ok(Self::new(s, DEFAULT_RPC_PORT)),
        }
    }
}

fn parse_port(input: &str, port: Option<&str>) -> Result<u16> {
    port.and_then(|port| port.parse::<u16>().ok())
        .ok_or_else(|| Error::InvalidEndpoint(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_without_port_uses_the_default_port() {
        let endpoint: RpcEndpoint = "simhost".parse().unwrap();
        assert_eq!(endpoint, RpcEndpoint::new("simhost", DEFAULT_RPC_PORT));
    }

    #[test]
    fn test_host_and_port_are_split() {
        let endpoint: RpcEndpoint = "10.0.0.7:5000".parse().unwrap();
        assert_eq!(endpoint.host, "10.0.0.7");
        assert_eq!(endpoint.port, 5000);
        assert_eq!(endpoint.to_string(), "10.0.0.7:5000");
    }

    #[test]
    fn test_ipv6_forms_are_accepted() {
        let bracketed: RpcEndpoint = "[::1]:6000".parse().unwrap();
        assert_eq!(bracketed, RpcEndpoint::new("::1", 6000));
        assert_eq!(bracketed.to_string(), "[::1]:6000");

        let bare: RpcEndpoint = "fe80::2".parse().unwrap();
        assert_eq!(bare, RpcEndpoint::new("fe80::2", DEFAULT_RPC_PORT));
    }

    #[test]
    fn test_malformed_endpoints_are_rejected() {
        for input in ["", "   ", ":41451", "host:", "host:port", "[::1", "[]:1", "[::1]x"] {
            assert!(
                input.parse::<RpcEndpoint>().is_err(),
                "expected '{input}' to be rejected"
            );
        }
    }
}
