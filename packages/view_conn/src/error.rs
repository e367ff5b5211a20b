/// Errors surfaced by transport handles.
///
/// Everything here is recovered at the manager boundary: a failed control
/// send is logged and dropped, never propagated to the caller.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The handle's connection task is gone.
    #[error("connection handle is closed")]
    HandleClosed,

    /// The transport rejected or failed the send.
    #[error("send failed: {0}")]
    SendFailed(String),
}
