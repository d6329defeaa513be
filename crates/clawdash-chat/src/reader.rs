//! The read loop: bytes in, projected message text out.

use crate::decoder::ByteDecoder;
use crate::event::{parse_frame, StreamEvent};
use crate::frame::FrameSplitter;
use crate::projector::StreamProjector;
use clawdash_core::ClawdashResult;
use futures_util::{Stream, StreamExt};
use tracing::{debug, trace};

/// Byte-level front half of the pipeline: decoder plus frame splitter.
///
/// `feed` turns one network chunk into the events it completes. State lives
/// for one response body only.
#[derive(Debug, Default)]
pub struct FrameReader {
    decoder: ByteDecoder,
    splitter: FrameSplitter,
}

impl FrameReader {
    /// Creates a reader for a new response body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `chunk` and parses every frame it completes, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let text = self.decoder.decode(chunk, false);
        self.splitter
            .split(&text)
            .into_iter()
            .map(|frame| parse_frame(&frame))
            .collect()
    }

    /// Closes the body. The unterminated tail, if any, is discarded and
    /// returned for logging.
    pub fn finish(mut self) -> String {
        let flushed = self.decoder.decode(&[], true);
        let mut tail = self.splitter.finish();
        tail.push_str(&flushed);
        tail
    }
}

/// Drives `body` to completion, projecting every event onto one message.
///
/// `on_update` receives the full content after each change. Returns the
/// accumulated text (possibly empty) when the transport signals end of
/// stream, or the first read error.
pub async fn read_response<S, F>(body: S, mut on_update: F) -> ClawdashResult<String>
where
    S: Stream<Item = ClawdashResult<Vec<u8>>>,
    F: FnMut(&str),
{
    let mut body = std::pin::pin!(body);
    let mut reader = FrameReader::new();
    let mut projector = StreamProjector::new();
    let mut chunks = 0usize;

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        chunks += 1;

        for event in reader.feed(&chunk) {
            match &event {
                StreamEvent::Malformed => trace!("Skipping malformed data frame"),
                StreamEvent::Done => debug!("Received [DONE] sentinel"),
                _ => {}
            }
            if projector.apply(&event) {
                on_update(projector.text());
            }
        }
    }

    let tail = reader.finish();
    if !tail.is_empty() {
        debug!(bytes = tail.len(), "Discarding unterminated final frame");
    }
    debug!(chunks, chars = projector.text().len(), "Response stream ended");

    Ok(projector.text().to_string())
}
