use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("'{0}' is not an IP address")]
    InvalidAddress(String),

    #[error("'{0}' has no IPv4 /24 network to scan")]
    UnsupportedAddress(String),

    #[error("could not reach sync server: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("sync server closed the connection before sending an ip event")]
    Closed,

    #[error("timed out waiting for the ip event")]
    Timeout,
}
