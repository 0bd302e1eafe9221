use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};
use tokio::net::TcpStream;

/// Answers whether the network is reachable right now.
#[async_trait]
pub trait Connectivity: Send + Sync + Debug {
    async fn is_online(&self) -> bool;
}

/// Fixed answer, for `--offline` and tests.
#[derive(Debug, Clone, Copy)]
pub struct Fixed(pub bool);

#[async_trait]
impl Connectivity for Fixed {
    async fn is_online(&self) -> bool {
        self.0
    }
}

/// Online if a TCP connection to `host:port` opens within `timeout`.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

impl TcpProbe {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Probe the host and port of `url`. Falls back to port 443 when none is given.
    pub fn for_url(url: &str) -> Option<Self> {
        let parsed = reqwest::Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_owned();
        let port = parsed.port_or_known_default().unwrap_or(443);
        Some(Self::new(host, port))
    }
}

#[async_trait]
impl Connectivity for TcpProbe {
    async fn is_online(&self) -> bool {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        match tokio::time::timeout(self.timeout, connect).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::debug!(host = %self.host, "connectivity probe failed: {e}");
                false
            }
            Err(_) => {
                tracing::debug!(host = %self.host, "connectivity probe timed out");
                false
            }
        }
    }
}
