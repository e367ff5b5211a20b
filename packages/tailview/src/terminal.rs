//! Plain-stdout surface for a terminal session.
//!
//! Chunks stream to stdout exactly once as they arrive; pause changes show
//! up as bracketed notices on stderr so a piped stdout stays clean text.

use std::io::Write;

use tracing::debug;
use view_conn::{ControlAppearance, DisplayBuffer, ViewControl, ViewSurface};

/// Renders newly appended buffer bytes to stdout.
///
/// Rendering is keyed by stream offset: everything before `seen` has been
/// printed already, so a render after a trim or a clear never reprints
/// retained text.
pub struct TermSurface {
    seen: u64,
    submit: Option<ControlAppearance>,
    pause: Option<ControlAppearance>,
}

impl TermSurface {
    pub fn new() -> Self {
        Self {
            seen: 0,
            submit: None,
            pause: None,
        }
    }
}

impl Default for TermSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewSurface for TermSurface {
    fn render(&mut self, buffer: &DisplayBuffer) {
        let start = self.seen.max(buffer.start_offset());
        let skip = (start - buffer.start_offset()) as usize;
        let fresh = &buffer.contents()[skip..];
        if !fresh.is_empty() {
            let mut stdout = std::io::stdout().lock();
            let _ = stdout.write_all(fresh.as_bytes());
        }
        self.seen = buffer.appended_total();
    }

    fn scroll_to_end(&mut self) {
        // The terminal scrolls on its own; just make the bytes visible
        let _ = std::io::stdout().flush();
    }

    fn set_control(&mut self, control: ViewControl, appearance: ControlAppearance) {
        let slot = match control {
            ViewControl::Submit => &mut self.submit,
            ViewControl::Pause => &mut self.pause,
        };
        if *slot == Some(appearance) {
            return;
        }
        let previous = slot.replace(appearance);

        match (control, appearance) {
            (ViewControl::Pause, ControlAppearance::Active) => {
                eprintln!("[tailview: paused]");
            }
            (ViewControl::Pause, ControlAppearance::Normal)
                if previous == Some(ControlAppearance::Active) =>
            {
                eprintln!("[tailview: resumed]");
            }
            _ => debug!(?control, ?appearance, "control state"),
        }
    }
}
