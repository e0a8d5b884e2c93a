//! Failure kinds raised by construction and width resolution.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors produced by node construction and `resolve`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// A required width and a supplied or derived hint disagree.
    #[error("width mismatch: {0}")]
    Width(#[from] WidthMismatch),
    /// A constructor received structurally invalid data.
    #[error("invalid operand: {0}")]
    InvalidOperand(#[from] InvalidOperand),
}

impl Error {
    /// Signed numeric diagnostic carried by a width mismatch, if any.
    ///
    /// For a plain disagreement this is `requested - required`; for a failed
    /// divisibility check it is the remainder.
    pub fn residual(&self) -> Option<i64> {
        match self {
            Error::Width(WidthMismatch::Residual(r)) => Some(*r),
            Error::Width(WidthMismatch::Remainder(r)) => i64::try_from(*r).ok(),
            _ => None,
        }
    }
}

/// Ways a width can fail to check out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum WidthMismatch {
    /// Requested width minus required width.
    #[error("off by {0}")]
    Residual(i64),
    /// Remainder left by a width that is not an exact multiple.
    #[error("not divisible, remainder {0}")]
    Remainder(usize),
    /// Too many unknowns to solve for a unique width.
    #[error("{unresolved} unresolved widths, cannot solve uniquely")]
    Underdetermined {
        /// Number of children whose width is unknown.
        unresolved: usize,
    },
    /// A width derived from block factors does not fit in `usize`.
    #[error("derived width overflows")]
    Overflow,
}

impl WidthMismatch {
    /// Builds the residual `requested - required`.
    pub(crate) fn between(requested: usize, required: usize) -> Self {
        WidthMismatch::Residual(signed(requested) - signed(required))
    }

    /// `a * b`, or [`WidthMismatch::Overflow`].
    pub(crate) fn product(a: usize, b: usize) -> core::result::Result<usize, Self> {
        a.checked_mul(b).ok_or(WidthMismatch::Overflow)
    }
}

fn signed(width: usize) -> i64 {
    i64::try_from(width).unwrap_or(i64::MAX)
}

/// Malformed constructor input.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidOperand {
    /// Substitution table length is not a power of two.
    #[error("substitution table length {len} is not a power of two")]
    NotPowerOfTwo {
        /// Offending length.
        len: usize,
    },
    /// Substitution table maps outside its own index range.
    #[error("substitution table entry {value} at index {index} exceeds {len}")]
    TableEntryOutOfRange {
        /// Position in the table.
        index: usize,
        /// Stored value.
        value: usize,
        /// Table length.
        len: usize,
    },
    /// Slice end precedes start.
    #[error("invalid slice bounds [{start}:{end}]")]
    SliceBounds {
        /// Start bound.
        start: usize,
        /// End bound.
        end: usize,
    },
    /// Permutation has no slots.
    #[error("permutation table is empty")]
    EmptyPermutation,
    /// Permutation slot list is not a rearrangement of `0..len`.
    #[error("slot {slot} is out of range or repeated in a permutation of {len} slots")]
    NotAPermutation {
        /// Offending slot index.
        slot: usize,
        /// Number of slots.
        len: usize,
    },
    /// An explicit multiplicative factor or truncation width was zero.
    #[error("{what} must be at least one")]
    ZeroFactor {
        /// Which parameter was zero.
        what: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residual_is_signed() {
        assert_eq!(WidthMismatch::between(8, 16), WidthMismatch::Residual(-8));
        assert_eq!(WidthMismatch::between(17, 16), WidthMismatch::Residual(1));
    }

    #[test]
    fn residual_accessor_covers_both_numeric_kinds() {
        assert_eq!(Error::from(WidthMismatch::Residual(-3)).residual(), Some(-3));
        assert_eq!(Error::from(WidthMismatch::Remainder(5)).residual(), Some(5));
        let under = Error::from(WidthMismatch::Underdetermined { unresolved: 2 });
        assert_eq!(under.residual(), None);
        assert_eq!(Error::from(WidthMismatch::Overflow).residual(), None);
        assert_eq!(
            Error::from(InvalidOperand::EmptyPermutation).residual(),
            None
        );
    }

    #[test]
    fn display_names_the_kind() {
        let err = Error::from(InvalidOperand::NotPowerOfTwo { len: 3 });
        assert_eq!(
            err.to_string(),
            "invalid operand: substitution table length 3 is not a power of two"
        );
        let err = Error::from(WidthMismatch::Residual(8));
        assert_eq!(err.to_string(), "width mismatch: off by 8");
    }

    #[test]
    fn product_reports_overflow() {
        assert_eq!(WidthMismatch::product(16, 8), Ok(128));
        assert_eq!(
            WidthMismatch::product(usize::MAX, 2),
            Err(WidthMismatch::Overflow)
        );
    }
}
