use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fulfillment: FulfillmentConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub verification: VerificationConfig,
}

#[derive(Debug, Deserialize)]
pub struct FulfillmentConfig {
    #[serde(default = "default_fulfillment_ip")]
    pub ip: Ipv4Addr,
    #[serde(default = "default_fulfillment_port")]
    pub port: u16,
}

impl Default for FulfillmentConfig {
    fn default() -> Self {
        Self {
            ip: default_fulfillment_ip(),
            port: default_fulfillment_port(),
        }
    }
}

impl From<FulfillmentConfig> for SocketAddr {
    fn from(fulfillment: FulfillmentConfig) -> Self {
        (fulfillment.ip, fulfillment.port).into()
    }
}

fn default_fulfillment_ip() -> Ipv4Addr {
    [0, 0, 0, 0].into()
}

fn default_fulfillment_port() -> u16 {
    7878
}

/// The live stream handed to the device in play directives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamConfig {
    #[serde(default = "default_stream_url")]
    pub url: String,
    #[serde(default = "default_stream_token")]
    pub token: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: default_stream_url(),
            token: default_stream_token(),
        }
    }
}

// NOTE: There is also a higher bitrate stream available
fn default_stream_url() -> String {
    "https://live-aacplus-64.streamguys1.com/".into()
}

fn default_stream_token() -> String {
    "token".into()
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerificationConfig {
    /// Maximum allowed difference between the request timestamp and now, in seconds
    #[serde(default = "default_timestamp_tolerance")]
    pub timestamp_tolerance: u64,
    /// Timeout for fetching the signing certificate chain, in seconds
    #[serde(default = "default_certificate_timeout")]
    pub certificate_timeout: u64,
}

impl VerificationConfig {
    pub fn timestamp_tolerance(&self) -> Duration {
        Duration::from_secs(self.timestamp_tolerance)
    }

    pub fn certificate_timeout(&self) -> Duration {
        Duration::from_secs(self.certificate_timeout)
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            timestamp_tolerance: default_timestamp_tolerance(),
            certificate_timeout: default_certificate_timeout(),
        }
    }
}

fn default_timestamp_tolerance() -> u64 {
    150
}

fn default_certificate_timeout() -> u64 {
    5
}
