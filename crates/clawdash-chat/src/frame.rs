//! Line framing over decoded response text.

/// Splits decoded text into newline-terminated frames.
///
/// The unterminated tail of each call is kept as carry-over and prefixed to
/// the text of the next call. One splitter belongs to one read loop.
#[derive(Debug, Default)]
pub struct FrameSplitter {
    carry: String,
}

impl FrameSplitter {
    /// Creates a splitter with an empty carry-over.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `text` and returns every frame completed by it, in order.
    ///
    /// Returned frames do not include the `\n` terminator.
    pub fn split(&mut self, text: &str) -> Vec<String> {
        self.carry.push_str(text);

        let Some(last_newline) = self.carry.rfind('\n') else {
            return Vec::new();
        };

        let tail = self.carry.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.carry, tail);

        complete
            .strip_suffix('\n')
            .unwrap_or(&complete)
            .split('\n')
            .map(str::to_owned)
            .collect()
    }

    /// The current unterminated fragment.
    pub fn carry(&self) -> &str {
        &self.carry
    }

    /// Ends the loop, handing back whatever fragment was never terminated.
    pub fn finish(self) -> String {
        self.carry
    }
}
