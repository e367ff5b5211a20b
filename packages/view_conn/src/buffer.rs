//! Bounded text window for streamed view output.
//!
//! Chunks are appended one line at a time. When the buffer grows past its
//! soft cap, whole lines are dropped from the front so the newest output
//! stays visible without unbounded growth.

/// Default soft cap in bytes of UTF-8 text.
const DEFAULT_SOFT_CAP: usize = 5_242_080;

/// Number of leading lines discarded per trim pass.
const TRIM_LINES: usize = 10;

/// Append-only display text with front-trimming.
///
/// Contents are always a suffix of the full appended stream starting at a
/// line boundary. `appended_total` and `start_offset` report stream
/// positions in bytes so a renderer can paint only what it has not yet
/// seen.
pub struct DisplayBuffer {
    text: String,
    soft_cap: usize,
    appended: u64,
}

impl DisplayBuffer {
    pub fn new() -> Self {
        Self::with_cap(DEFAULT_SOFT_CAP)
    }

    /// Build with a custom soft cap.
    pub fn with_cap(soft_cap: usize) -> Self {
        Self {
            text: String::new(),
            soft_cap,
            appended: 0,
        }
    }

    /// Append one chunk followed by a newline, then trim if over cap.
    ///
    /// The trim runs at most once per append: it scans from the start for
    /// the tenth newline and discards everything through it. A buffer
    /// holding fewer than ten newlines is never trimmed, even over cap.
    pub fn append_line(&mut self, chunk: &str) {
        self.text.push_str(chunk);
        self.text.push('\n');
        self.appended += chunk.len() as u64 + 1;

        if self.text.len() > self.soft_cap {
            self.trim();
        }
    }

    /// Drop the oldest `TRIM_LINES` whole lines, if that many exist.
    fn trim(&mut self) {
        let mut seen = 0;
        for (idx, byte) in self.text.bytes().enumerate() {
            if byte == b'\n' {
                seen += 1;
                if seen == TRIM_LINES {
                    self.text.drain(..=idx);
                    return;
                }
            }
        }
    }

    /// Current window of text.
    pub fn contents(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Drop all contents. Stream counters keep running.
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Total bytes ever appended, including trimmed and cleared text.
    pub fn appended_total(&self) -> u64 {
        self.appended
    }

    /// Stream position of the first byte still in the buffer.
    pub fn start_offset(&self) -> u64 {
        self.appended - self.text.len() as u64
    }
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new()
    }
}
