use crate::types::Kind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConvergeError>;

/// Structural failures from path resolution and convergence.
///
/// These are never retried internally: a structural mismatch cannot succeed
/// without a changed declaration, so it always surfaces to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvergeError {
    #[error("entry path is empty")]
    EmptyPath,

    /// A path segment tried to descend into (or address) a node of the
    /// wrong kind — a scalar where a container is needed, or a key applied
    /// to an array. `at` names the node, `found` its kind.
    #[error("cannot traverse {found} at `{at}`")]
    PathTypeMismatch { at: String, found: Kind },

    /// An index segment applied to a dictionary, or out of range for the
    /// array it addresses. Auto-vivification never pads arrays, so a
    /// missing position fails rather than silently extending.
    #[error("invalid index {index} into {found} at `{at}`")]
    InvalidIndex {
        at: String,
        index: usize,
        found: Kind,
    },
}
