//! Incremental UTF-8 decoding of response body chunks.

const REPLACEMENT: char = '\u{FFFD}';

/// Stateful UTF-8 decoder for a chunked byte stream.
///
/// A multi-byte code point may be split across two network reads. The
/// decoder keeps the incomplete prefix and emits the character once the rest
/// of its bytes arrive. Malformed bytes are replaced with U+FFFD instead of
/// failing, so a single bad byte never aborts an otherwise useful stream.
#[derive(Debug, Default)]
pub struct ByteDecoder {
    pending: Vec<u8>,
}

impl ByteDecoder {
    /// Creates a decoder with an empty carry-over.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `chunk`, prepending bytes held back by the previous call.
    ///
    /// When `last` is true the decoder is flushed: an incomplete trailing
    /// sequence becomes a single replacement character.
    pub fn decode(&mut self, chunk: &[u8], last: bool) -> String {
        self.pending.extend_from_slice(chunk);

        let mut out = String::with_capacity(self.pending.len());
        let mut pos = 0;

        while pos < self.pending.len() {
            match std::str::from_utf8(&self.pending[pos..]) {
                Ok(valid) => {
                    out.push_str(valid);
                    pos = self.pending.len();
                }
                Err(e) => {
                    let valid_up_to = pos + e.valid_up_to();
                    if let Ok(valid) = std::str::from_utf8(&self.pending[pos..valid_up_to]) {
                        out.push_str(valid);
                    }
                    match e.error_len() {
                        Some(len) => {
                            out.push(REPLACEMENT);
                            pos = valid_up_to + len;
                        }
                        None if last => {
                            out.push(REPLACEMENT);
                            pos = self.pending.len();
                        }
                        None => {
                            pos = valid_up_to;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..pos);
        out
    }

    /// Number of bytes held back waiting for the rest of a code point.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
