//! Classification of response frames into stream events.

/// Prefix marking a frame as protocol data.
pub const DATA_PREFIX: &str = "data: ";

/// Sentinel payload some gateways send before closing the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Event type carrying an incremental text fragment.
pub const OUTPUT_TEXT_DELTA: &str = "response.output_text.delta";

/// Event type carrying the full, final response document.
pub const RESPONSE_COMPLETED: &str = "response.completed";

/// The typed meaning of one frame.
///
/// Only [`StreamEvent::TextDelta`] and [`StreamEvent::Completed`] change the
/// in-progress message. The other variants exist so the read loop can log
/// what it skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A frame with no meaning for the message: blank line, comment, a frame
    /// without the data prefix, or an event type this client does not know.
    Ignored,

    /// The `[DONE]` sentinel. A no-op; end of stream is decided by the
    /// transport.
    Done,

    /// A data frame whose payload is not a JSON object with a string `type`.
    Malformed,

    /// Text to append to the accumulated content.
    TextDelta {
        /// Non-empty fragment.
        text: String,
    },

    /// Text that replaces the accumulated content.
    Completed {
        /// Concatenated output text of the final document.
        text: String,
    },
}

impl StreamEvent {
    /// Whether applying this event can change the message content.
    pub fn is_content(&self) -> bool {
        matches!(self, StreamEvent::TextDelta { .. } | StreamEvent::Completed { .. })
    }
}

/// Parses one frame (without its line terminator).
///
/// Never fails: anything that is not a recognised data frame maps to a
/// no-op variant.
pub fn parse_frame(frame: &str) -> StreamEvent {
    let Some(data) = frame.strip_prefix(DATA_PREFIX) else {
        return StreamEvent::Ignored;
    };
    let data = data.trim();

    if data == DONE_SENTINEL {
        return StreamEvent::Done;
    }

    let payload: serde_json::Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(_) => return StreamEvent::Malformed,
    };

    let Some(kind) = payload["type"].as_str() else {
        return StreamEvent::Malformed;
    };

    match kind {
        OUTPUT_TEXT_DELTA => match payload["delta"].as_str() {
            Some(delta) if !delta.is_empty() => StreamEvent::TextDelta {
                text: delta.to_string(),
            },
            _ => StreamEvent::Ignored,
        },
        RESPONSE_COMPLETED => match extract_output_text(&payload["response"]) {
            Some(text) => StreamEvent::Completed { text },
            None => StreamEvent::Ignored,
        },
        _ => StreamEvent::Ignored,
    }
}

/// Concatenates the `output_text` parts of every `message` item of a
/// completed response, in document order.
///
/// Returns `None` when the document carries no text at all.
pub fn extract_output_text(response: &serde_json::Value) -> Option<String> {
    let output = response["output"].as_array()?;

    let mut text = String::new();
    let mut found = false;

    for item in output {
        if item["type"].as_str() != Some("message") {
            continue;
        }
        let Some(parts) = item["content"].as_array() else {
            continue;
        };
        for part in parts {
            if part["type"].as_str() != Some("output_text") {
                continue;
            }
            if let Some(t) = part["text"].as_str() {
                if !t.is_empty() {
                    text.push_str(t);
                    found = true;
                }
            }
        }
    }

    found.then_some(text)
}
