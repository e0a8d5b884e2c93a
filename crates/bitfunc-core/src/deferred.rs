//! Set-once width parameters.

use std::sync::OnceLock;

use log::debug;

/// A multiplicative width parameter that starts unset and is fixed by the
/// first successful commit.
#[derive(Debug)]
pub(crate) struct Deferred {
    cell: OnceLock<usize>,
    name: &'static str,
}

impl Deferred {
    pub(crate) fn new(name: &'static str, value: Option<usize>) -> Self {
        let cell = OnceLock::new();
        if let Some(value) = value {
            let _ = cell.set(value);
        }
        Self { cell, name }
    }

    /// Committed value, if any.
    #[inline]
    pub(crate) fn get(&self) -> Option<usize> {
        self.cell.get().copied()
    }

    /// Commits `value` unless another value is already committed.
    ///
    /// Returns `Err(committed)` when a different value won first.
    pub(crate) fn commit(&self, value: usize) -> Result<usize, usize> {
        let mut fresh = false;
        let committed = *self.cell.get_or_init(|| {
            fresh = true;
            value
        });
        if fresh {
            debug!("committed {} = {}", self.name, value);
        }
        if committed == value {
            Ok(value)
        } else {
            Err(committed)
        }
    }
}
