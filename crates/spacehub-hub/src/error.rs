/// Errors returned by [`HubHandle`](crate::HubHandle) calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HubError {
    /// The hub actor has stopped; its command channel is closed.
    #[error("hub is not running")]
    Unavailable,
}
