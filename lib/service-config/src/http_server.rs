use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroUsize;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Listener of the JSON-over-HTTP RPC transport and the health probes.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct HttpServerConfig {
    /// IP address the listener binds to.
    ///
    /// Can also be set via the `HOST` environment variable.
    #[serde(default = "default_listen_ip")]
    pub host: IpAddr,

    /// Port the listener binds to. Defaults to the conventional gRPC port.
    ///
    /// Can also be set via the `PORT` environment variable.
    #[serde(default = "default_listen_port")]
    pub port: u16,

    /// Number of worker threads accepting calls. One per CPU core when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<NonZeroUsize>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_listen_ip(),
            port: default_listen_port(),
            workers: None,
        }
    }
}

fn default_listen_ip() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_listen_port() -> u16 {
    50051
}

impl HttpServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
