//! Request/response clients behind the dashboard pages.
//!
//! - [`MemoryClient`] — browse, search and delete memories through the Mem0
//!   proxy.
//! - [`StatusProbe`] — gateway health and service status rows.

pub mod health;
pub mod memory;

pub use health::{ServiceReport, ServiceStatus, StatusProbe};
pub use memory::{MemoryClient, MemoryConfig, MemoryRecord};
