pub mod document;
pub mod error;
pub mod hub;
pub mod registry;

pub use error::SyncError;
pub use hub::{EditProtocol, Joined, SyncHub};
pub use registry::ConnectionId;
