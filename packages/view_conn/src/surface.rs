//! Rendering collaborator for a view stream.

use crate::buffer::DisplayBuffer;

/// The user-facing controls the manager drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewControl {
    /// Source submit/reconnect control.
    Submit,
    /// Pause toggle.
    Pause,
}

/// How a control should present itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAppearance {
    Normal,
    /// Engaged (a paused stream shows an active pause control).
    Active,
    Disabled,
}

/// Where buffer contents and control state become visible.
pub trait ViewSurface {
    /// Present the buffer's current contents.
    fn render(&mut self, buffer: &DisplayBuffer);

    /// Keep the newest output in view.
    fn scroll_to_end(&mut self);

    /// Reflect a control's availability. Called with the full desired
    /// appearance; repeated identical calls must be no-ops.
    fn set_control(&mut self, control: ViewControl, appearance: ControlAppearance);
}
