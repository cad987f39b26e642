//! Protocol error types.

/// Errors from the fragmentation path.
///
/// The reassembly path deliberately has no error type: malformed or stale
/// packets are ignored and tracking restarts, per the link-layer's
/// best-effort design.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FragmentError {
    #[error("message is empty")]
    Empty,

    #[error("message too large: {len} bytes (max {max})")]
    TooLarge { len: usize, max: usize },
}
