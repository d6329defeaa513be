//! Core types and error definitions shared by the clawdash crates.
//!
//! # Main types
//!
//! - [`ClawdashError`] — Unified error enum for chat, memory and status calls.
//! - [`ClawdashResult`] — Convenience alias for `Result<T, ClawdashError>`.
//! - [`Role`] — Message role (user, assistant).
//! - [`Message`] — A single chat turn, including its streaming flag.

/// Error type and result alias.
pub mod error;
/// Chat message types.
pub mod message;

pub use error::{ClawdashError, ClawdashResult};
pub use message::{Message, Role};
