//! Projection of stream events onto the in-progress message text.

use crate::event::StreamEvent;

/// Content committed when a stream ends without producing any text.
pub const NO_RESPONSE_FALLBACK: &str = "No response received.";

/// Pure reduction step: deltas append, completed documents replace.
pub fn project(mut accumulator: String, event: &StreamEvent) -> String {
    match event {
        StreamEvent::TextDelta { text } => accumulator.push_str(text),
        StreamEvent::Completed { text } => accumulator.clone_from(text),
        StreamEvent::Ignored | StreamEvent::Done | StreamEvent::Malformed => {}
    }
    accumulator
}

/// Accumulator for one streaming message.
///
/// The projector is the only writer of a message's text while its stream is
/// active.
#[derive(Debug, Default)]
pub struct StreamProjector {
    text: String,
}

impl StreamProjector {
    /// Creates a projector with empty content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `event`, returning whether the content changed.
    pub fn apply(&mut self, event: &StreamEvent) -> bool {
        if !event.is_content() {
            return false;
        }
        let before_len = self.text.len();
        let replaced = matches!(event, StreamEvent::Completed { .. });
        self.text = project(std::mem::take(&mut self.text), event);
        replaced || self.text.len() != before_len
    }

    /// Content accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Final content: the accumulated text, or the fallback if empty.
    pub fn finish(self) -> String {
        if self.text.is_empty() {
            NO_RESPONSE_FALLBACK.to_string()
        } else {
            self.text
        }
    }
}
