//! Best-effort scan of the local /24 for other instances of the service.
//!
//! This is exploratory tooling: outcomes are logged per host and nothing is
//! retried or aggregated into a membership view.

pub mod client;
pub mod error;
pub mod scanner;

pub use client::request_ip;
pub use error::DiscoveryError;
pub use scanner::{network_prefix, probe_hosts, scan_network, ProbeOutcome, ScanOptions};
