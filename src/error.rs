use thiserror::Error;

/// Errors reported by [`BalancedTree`](crate::BalancedTree) mutations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The requested key is not stored in the tree, the tree was left untouched
    #[error("key not found in tree")]
    KeyNotFound,
    /// A traversal order name other than `pre`, `in` or `post` was parsed
    #[error("unsupported traversal method")]
    UnsupportedTraversal,
}
