use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use futures_util::{stream, StreamExt};
use tokio_tungstenite::connect_async;
use tracing::{debug, info};

use crate::config::Config;
use super::error::DiscoveryError;

/// Host numbers probed within the /24, `.0` through `.254`.
const HOSTS_PER_PREFIX: u8 = 255;

#[derive(Clone, Debug)]
pub struct ScanOptions {
    pub port: u16,
    pub concurrency: usize,
    pub timeout: Duration,
}

impl From<&Config> for ScanOptions {
    fn from(config: &Config) -> Self {
        Self {
            port: config.discovery_port,
            concurrency: config.discovery_concurrency,
            timeout: config.discovery_timeout(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    Discovered(SocketAddr),
    Unreachable(SocketAddr),
}

/// First three octets of an IPv4 (or IPv4-mapped IPv6) address.
pub fn network_prefix(ip: &str) -> Result<[u8; 3], DiscoveryError> {
    let addr: IpAddr = ip
        .trim()
        .parse()
        .map_err(|_| DiscoveryError::InvalidAddress(ip.to_string()))?;
    match addr.to_canonical() {
        IpAddr::V4(v4) => {
            let [a, b, c, _] = v4.octets();
            Ok([a, b, c])
        }
        IpAddr::V6(_) => Err(DiscoveryError::UnsupportedAddress(ip.to_string())),
    }
}

fn hosts_in_prefix(prefix: [u8; 3], port: u16) -> impl Iterator<Item = SocketAddr> {
    let [a, b, c] = prefix;
    (0..HOSTS_PER_PREFIX).map(move |d| SocketAddr::from((Ipv4Addr::new(a, b, c, d), port)))
}

async fn probe(target: SocketAddr, timeout: Duration) -> ProbeOutcome {
    let url = format!("ws://{}/ws", target);
    match tokio::time::timeout(timeout, connect_async(url.as_str())).await {
        Ok(Ok((mut ws, _))) => {
            info!("Discovered a live host at {}", url);
            let _ = ws.close(None).await;
            ProbeOutcome::Discovered(target)
        }
        Ok(Err(e)) => {
            debug!("The host {} is unreachable: {}", url, e);
            ProbeOutcome::Unreachable(target)
        }
        Err(_) => {
            debug!("The host {} is unreachable: timed out", url);
            ProbeOutcome::Unreachable(target)
        }
    }
}

/// Probe every target with at most `options.concurrency` attempts in flight.
/// Outcomes come back in completion order.
pub async fn probe_hosts(
    targets: impl IntoIterator<Item = SocketAddr>,
    options: &ScanOptions,
) -> Vec<ProbeOutcome> {
    let timeout = options.timeout;
    stream::iter(targets)
        .map(|target| probe(target, timeout))
        .buffer_unordered(options.concurrency.max(1))
        .collect()
        .await
}

/// Scan the /24 that `own_ip` belongs to.
pub async fn scan_network(own_ip: &str, options: &ScanOptions) -> Result<Vec<ProbeOutcome>, DiscoveryError> {
    let prefix = network_prefix(own_ip)?;
    info!(
        "Scanning {}.{}.{}.0/24 on port {} ({} probes in flight, {:?} timeout)",
        prefix[0], prefix[1], prefix[2], options.port, options.concurrency, options.timeout
    );
    let outcomes = probe_hosts(hosts_in_prefix(prefix, options.port), options).await;
    let live = outcomes.iter().filter(|o| matches!(o, ProbeOutcome::Discovered(_))).count();
    info!("Scan finished: {} live of {} probed", live, outcomes.len());
    Ok(outcomes)
}
