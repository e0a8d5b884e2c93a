//! Errors raised while assembling cipher trees.

use thiserror::Error;

/// Result alias for this crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Cipher assembly failures.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// A node failed to construct or the tree failed its width check.
    #[error(transparent)]
    Expr(#[from] bitfunc_core::Error),
    /// The number of round keys does not match the configured rounds.
    #[error("expected {expected} round keys, found {found}")]
    KeyCount {
        /// Rounds plus one.
        expected: usize,
        /// Keys supplied.
        found: usize,
    },
}
