//! Leaf nodes: constants, substitution tables, permutations and slices.

use core::fmt;

use crate::deferred::Deferred;
use crate::error::{InvalidOperand, Result, WidthMismatch};
use crate::node::{Node, NodeKind};

/// Checks a hint against a width that is always known.
pub(crate) fn check_fixed(width: usize, hint: Option<usize>) -> Result<Option<usize>> {
    match hint {
        Some(requested) if requested != width => {
            Err(WidthMismatch::between(requested, width).into())
        }
        _ => Ok(Some(width)),
    }
}

/// Constant byte string, `8 * len` bits wide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Const {
    bytes: Box<[u8]>,
}

impl Const {
    /// The constant bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Width in bits, or `None` if `8 * len` does not fit in `usize`.
    pub fn width(&self) -> Option<usize> {
        self.bytes.len().checked_mul(8)
    }

    pub(crate) fn resolve(&self, hint: Option<usize>) -> Result<Option<usize>> {
        let width = self.width().ok_or(WidthMismatch::Overflow)?;
        check_fixed(width, hint)
    }
}

impl fmt::Display for Const {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "const {}", hex::encode(&self.bytes))
    }
}

/// Substitution table over `log2(len)`-bit values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sbox {
    table: Box<[usize]>,
    width: usize,
}

impl Sbox {
    /// The table, indexed by input value.
    pub fn table(&self) -> &[usize] {
        &self.table
    }

    /// Width in bits.
    pub fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn resolve(&self, hint: Option<usize>) -> Result<Option<usize>> {
        check_fixed(self.width, hint)
    }
}

impl fmt::Display for Sbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("sbox [...]")
    }
}

/// Permutation of `k` equal-sized slots.
///
/// The slot size (block factor) may be left open and is then learned from the
/// first concrete width hint.
#[derive(Debug)]
pub struct Perm {
    slots: Box<[usize]>,
    block: Deferred,
}

impl Perm {
    /// Slot order.
    pub fn slots(&self) -> &[usize] {
        &self.slots
    }

    /// Block factor, once known.
    pub fn block(&self) -> Option<usize> {
        self.block.get()
    }

    pub(crate) fn resolve(&self, hint: Option<usize>) -> Result<Option<usize>> {
        let slots = self.slots.len();
        let Some(requested) = hint else {
            return match self.block.get() {
                Some(block) => Ok(Some(WidthMismatch::product(block, slots)?)),
                None => Ok(None),
            };
        };
        if let Some(block) = self.block.get() {
            return check_fixed(WidthMismatch::product(block, slots)?, hint);
        }
        if requested % slots != 0 {
            return Err(WidthMismatch::Remainder(requested % slots).into());
        }
        // A zero hint commits a zero block; the permutation is then empty.
        match self.block.commit(requested / slots) {
            Ok(_) => Ok(Some(requested)),
            Err(committed) => {
                let width = WidthMismatch::product(committed, slots)?;
                Err(WidthMismatch::between(requested, width).into())
            }
        }
    }
}

impl fmt::Display for Perm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "perm {:?}", self.slots)
    }
}

/// Bit range `[start, end)` of the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slice {
    start: usize,
    end: usize,
}

impl Slice {
    /// First bit.
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last bit.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Width in bits.
    pub fn width(&self) -> usize {
        self.end - self.start
    }

    pub(crate) fn resolve(&self, hint: Option<usize>) -> Result<Option<usize>> {
        check_fixed(self.width(), hint)
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.start, self.end)
    }
}

impl Node {
    /// Constant node from raw bytes or text.
    pub fn constant(bytes: impl Into<Vec<u8>>) -> Node {
        Node::from_kind(NodeKind::Const(Const {
            bytes: bytes.into().into_boxed_slice(),
        }))
    }

    /// Substitution table node.
    ///
    /// The table length must be a power of two and every entry must index
    /// into the table.
    pub fn sbox(table: impl Into<Vec<usize>>) -> Result<Node> {
        let table = table.into();
        let len = table.len();
        if !len.is_power_of_two() {
            return Err(InvalidOperand::NotPowerOfTwo { len }.into());
        }
        if let Some((index, &value)) = table.iter().enumerate().find(|&(_, &v)| v >= len) {
            return Err(InvalidOperand::TableEntryOutOfRange { index, value, len }.into());
        }
        Ok(Node::from_kind(NodeKind::Sbox(Sbox {
            table: table.into_boxed_slice(),
            width: len.trailing_zeros() as usize,
        })))
    }

    /// Permutation node over `slots.len()` slots with an optional block factor.
    pub fn perm(slots: impl Into<Vec<usize>>, block: Option<usize>) -> Result<Node> {
        let slots = slots.into();
        let len = slots.len();
        if len == 0 {
            return Err(InvalidOperand::EmptyPermutation.into());
        }
        let mut seen = vec![false; len];
        for &slot in &slots {
            match seen.get_mut(slot) {
                Some(flag) if !*flag => *flag = true,
                _ => return Err(InvalidOperand::NotAPermutation { slot, len }.into()),
            }
        }
        if block == Some(0) {
            return Err(InvalidOperand::ZeroFactor {
                what: "block factor",
            }
            .into());
        }
        Ok(Node::from_kind(NodeKind::Perm(Perm {
            slots: slots.into_boxed_slice(),
            block: Deferred::new("perm block factor", block),
        })))
    }

    /// Slice node selecting bits `start..end`.
    pub fn slice(start: usize, end: usize) -> Result<Node> {
        if end < start {
            return Err(InvalidOperand::SliceBounds { start, end }.into());
        }
        Ok(Node::from_kind(NodeKind::Slice(Slice { start, end })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use rand::{Rng, RngCore, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn const_width_is_eight_bits_per_byte() {
        let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
        for _ in 0..32 {
            let mut bytes = vec![0u8; rng.gen_range(0..64)];
            rng.fill_bytes(&mut bytes);
            let width = bytes.len() * 8;
            let node = Node::constant(bytes);
            if let NodeKind::Const(c) = node.kind() {
                assert_eq!(c.width(), Some(width));
            }
            assert_eq!(node.resolve(None), Ok(Some(width)));
            assert_eq!(node.resolve(Some(width)), Ok(Some(width)));
            let err = node.resolve(Some(width + 1)).unwrap_err();
            assert_eq!(err.residual(), Some(1));
        }
    }

    #[test]
    fn const_accepts_text() {
        let node = Node::constant("abcd");
        assert_eq!(node.width(), Ok(Some(32)));
        assert_eq!(node.to_string(), "const 61626364");
    }

    #[test]
    fn sbox_width_is_log2_of_length() {
        for bits in 0..12 {
            let len = 1usize << bits;
            let node = Node::sbox((0..len).collect::<Vec<_>>()).expect("power of two");
            assert_eq!(node.width(), Ok(Some(bits)));
        }
    }

    #[test]
    fn sbox_rejects_non_power_of_two() {
        for len in [0usize, 3, 5, 6, 7, 12, 255, 257] {
            let err = Node::sbox((0..len).collect::<Vec<_>>()).unwrap_err();
            assert_eq!(err, Error::InvalidOperand(InvalidOperand::NotPowerOfTwo { len }));
        }
    }

    #[test]
    fn sbox_rejects_out_of_range_entry() {
        let err = Node::sbox(vec![0, 1, 4, 2]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidOperand(InvalidOperand::TableEntryOutOfRange {
                index: 2,
                value: 4,
                len: 4
            })
        );
    }

    #[test]
    fn perm_learns_block_from_divisible_hint() {
        let mut rng = ChaCha20Rng::from_seed([2u8; 32]);
        for _ in 0..64 {
            let k = rng.gen_range(1..20usize);
            let hint = rng.gen_range(0..400usize);
            let node = Node::perm((0..k).rev().collect::<Vec<_>>(), None).unwrap();
            let NodeKind::Perm(perm) = node.kind() else {
                unreachable!()
            };
            let result = node.resolve(Some(hint));
            if hint % k == 0 {
                assert_eq!(result, Ok(Some(hint)));
                assert_eq!(perm.block(), Some(hint / k));
                assert!(node.resolve(Some(hint + k)).is_err());
                assert_eq!(node.resolve(None), Ok(Some(hint)));
            } else {
                assert_eq!(result.unwrap_err().residual(), Some((hint % k) as i64));
                assert_eq!(perm.block(), None);
            }
        }
    }

    #[test]
    fn perm_with_known_block_reports_signed_difference() {
        let node = Node::perm(vec![1, 0], Some(8)).unwrap();
        assert_eq!(node.width(), Ok(Some(16)));
        assert_eq!(node.resolve(Some(12)).unwrap_err().residual(), Some(-4));
    }

    #[test]
    fn perm_zero_hint_fixes_an_empty_block() {
        let node = Node::perm(vec![0, 1, 2, 3], None).unwrap();
        assert_eq!(node.resolve(Some(0)), Ok(Some(0)));
        let NodeKind::Perm(perm) = node.kind() else {
            unreachable!()
        };
        assert_eq!(perm.block(), Some(0));
        assert_eq!(node.width(), Ok(Some(0)));
        assert_eq!(node.resolve(Some(8)).unwrap_err().residual(), Some(8));
    }

    #[test]
    fn perm_width_overflow_is_an_error() {
        let node = Node::perm(vec![1, 0], Some(usize::MAX)).unwrap();
        assert_eq!(node.width(), Err(Error::Width(WidthMismatch::Overflow)));
        assert_eq!(
            node.resolve(Some(64)),
            Err(Error::Width(WidthMismatch::Overflow))
        );

        let learned = Node::perm(vec![2, 0, 1], None).unwrap();
        assert_eq!(learned.resolve(Some(usize::MAX)), Ok(Some(usize::MAX)));
        assert_eq!(
            learned.resolve(Some(3)).unwrap_err().residual(),
            Some(3 - i64::MAX)
        );
    }

    #[test]
    fn perm_without_hint_is_unknown() {
        let node = Node::perm(vec![0, 1, 2, 3], None).unwrap();
        assert_eq!(node.width(), Ok(None));
    }

    #[test]
    fn perm_rejects_malformed_slots() {
        assert_eq!(
            Node::perm(Vec::new(), None).unwrap_err(),
            Error::InvalidOperand(InvalidOperand::EmptyPermutation)
        );
        assert_eq!(
            Node::perm(vec![0, 0, 1], None).unwrap_err(),
            Error::InvalidOperand(InvalidOperand::NotAPermutation { slot: 0, len: 3 })
        );
        assert_eq!(
            Node::perm(vec![0, 3, 1], None).unwrap_err(),
            Error::InvalidOperand(InvalidOperand::NotAPermutation { slot: 3, len: 3 })
        );
        assert!(Node::perm(vec![0], Some(0)).is_err());
    }

    #[test]
    fn slice_width_and_bounds() {
        let node = Node::slice(8, 24).unwrap();
        assert_eq!(node.width(), Ok(Some(16)));
        assert_eq!(node.resolve(Some(8)).unwrap_err().residual(), Some(-8));
        assert_eq!(node.to_string(), "[8:24]");
        assert!(Node::slice(4, 4).is_ok());
        assert_eq!(
            Node::slice(9, 4).unwrap_err(),
            Error::InvalidOperand(InvalidOperand::SliceBounds { start: 9, end: 4 })
        );
    }
}
