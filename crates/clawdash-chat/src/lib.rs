//! Streaming chat client for the agent gateway.
//!
//! A response body flows through four stages, leaf first:
//!
//! - [`ByteDecoder`] — incremental UTF-8 decoding of network chunks.
//! - [`FrameSplitter`] — newline framing with carry-over between reads.
//! - [`parse_frame`] — classification of a frame into a [`StreamEvent`].
//! - [`StreamProjector`] — append/replace projection onto the message text.
//!
//! [`ChatSession`] wires them together over a [`ResponseTransport`] and owns
//! the message list.

pub mod config;
pub mod decoder;
pub mod event;
pub mod frame;
pub mod projector;
pub mod reader;
pub mod session;
pub mod transport;

pub use config::GatewayConfig;
pub use decoder::ByteDecoder;
pub use event::{parse_frame, StreamEvent};
pub use frame::FrameSplitter;
pub use projector::{StreamProjector, NO_RESPONSE_FALLBACK};
pub use reader::{read_response, FrameReader};
pub use session::{ChatPhase, ChatSession, ChatUpdate, TurnOutcome};
pub use transport::{ByteStream, GatewayClient, ResponseRequest, ResponseTransport};
