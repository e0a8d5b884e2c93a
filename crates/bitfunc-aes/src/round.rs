//! AES round layers expressed as bitfunc trees.
//!
//! The state is 16 bytes in row-major order. Each layer is built once per
//! [`RoundLayers`] and shared by every round that uses it, so its deferred
//! block parameters are learned a single time.

use std::collections::BTreeMap;

use bitfunc_core::{Node, Result};

use crate::key::RoundKey;

/// ShiftRows as a permutation of the 16 state bytes.
pub const SHIFT_ROWS: [usize; 16] = [0, 1, 2, 3, 5, 6, 7, 4, 10, 11, 8, 9, 15, 12, 13, 14];

/// MixColumns coefficient matrix.
pub const MIX_COEFFICIENTS: [[u8; 4]; 4] = [[2, 3, 1, 1], [1, 2, 3, 1], [1, 1, 2, 3], [3, 1, 1, 2]];

fn byte_slice(index: usize) -> Result<Node> {
    Node::slice(index * 8, index * 8 + 8)
}

/// Multiply-by-constant substitution nodes, built once per coefficient.
#[derive(Default)]
struct MulTables {
    tables: BTreeMap<u8, Node>,
}

impl MulTables {
    fn get(&mut self, k: u8) -> Result<Node> {
        if let Some(node) = self.tables.get(&k) {
            return Ok(node.clone());
        }
        let node = Node::sbox(crate::gf::mul_table(k))?;
        self.tables.insert(k, node.clone());
        Ok(node)
    }
}

/// One output byte of a column: `c0*b0 ^ (c1*b1 ^ (c2*b2 ^ c3*b3))`.
fn mix_row(coefficients: &[u8; 4], tables: &mut MulTables) -> Result<Node> {
    let mut acc: Option<Node> = None;
    for (byte, &k) in coefficients.iter().enumerate().rev() {
        let term = byte_slice(byte)?.then(&tables.get(k)?);
        acc = Some(match acc {
            None => term,
            Some(rest) => term.then(&Node::xor(rest, None)?),
        });
    }
    Ok(acc.unwrap_or_else(|| Node::seq([])))
}

/// Regroups the state from rows to columns; it is its own inverse.
fn transpose() -> Result<Node> {
    let mut lanes = Vec::with_capacity(16);
    for col in 0..4 {
        for row in 0..4 {
            lanes.push(byte_slice(row * 4 + col)?);
        }
    }
    Ok(Node::cat(lanes))
}

/// Shared layer nodes for building rounds.
#[derive(Clone, Debug)]
pub struct RoundLayers {
    sub_bytes: Node,
    shift_rows: Node,
    mix_columns: Node,
}

impl RoundLayers {
    /// Builds the layers from the generated tables.
    pub fn new() -> Result<Self> {
        let sub_bytes = Node::map(Node::sbox(crate::gf::sbox_table())?, None)?;
        let shift_rows = Node::perm(SHIFT_ROWS.to_vec(), None)?;

        let mut tables = MulTables::default();
        let mut rows = Vec::with_capacity(4);
        for coefficients in &MIX_COEFFICIENTS {
            rows.push(mix_row(coefficients, &mut tables)?);
        }
        let column = Node::cat(rows);
        let mut columns = Vec::with_capacity(4);
        for c in 0..4 {
            columns.push(column.prepend(&Node::slice(c * 32, c * 32 + 32)?));
        }
        let transpose = transpose()?;
        let mix_columns = transpose.then(&Node::cat(columns)).then(&transpose);

        Ok(Self {
            sub_bytes,
            shift_rows,
            mix_columns,
        })
    }

    /// SubBytes: the S-box mapped over an open number of byte blocks.
    pub fn sub_bytes(&self) -> &Node {
        &self.sub_bytes
    }

    /// ShiftRows: a 16-slot permutation with an open slot size.
    pub fn shift_rows(&self) -> &Node {
        &self.shift_rows
    }

    /// MixColumns: transpose, mix each 32-bit column, transpose back.
    pub fn mix_columns(&self) -> &Node {
        &self.mix_columns
    }

    /// A full round ending in the key addition.
    pub fn round(&self, key: &RoundKey) -> Result<Node> {
        Ok(self
            .sub_bytes
            .then(&self.shift_rows)
            .then(&self.mix_columns)
            .then(&add_round_key(key)?))
    }

    /// The last round, without MixColumns.
    pub fn final_round(&self, key: &RoundKey) -> Result<Node> {
        Ok(self
            .sub_bytes
            .then(&self.shift_rows)
            .then(&add_round_key(key)?))
    }
}

/// AddRoundKey: XOR against the key as a constant.
pub fn add_round_key(key: &RoundKey) -> Result<Node> {
    Node::xor(Node::constant(key.0), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitfunc_core::{Error, NodeKind, WidthMismatch};

    fn stage_count(node: &Node) -> usize {
        match node.kind() {
            NodeKind::Seq(seq) => seq.stages().len(),
            _ => 1,
        }
    }

    #[test]
    fn round_resolves_to_block_width() {
        let layers = RoundLayers::new().unwrap();
        let round = layers.round(&RoundKey([0x11; 16])).unwrap();
        assert_eq!(stage_count(&round), 6);
        assert_eq!(round.width(), Ok(Some(128)));
        match layers.sub_bytes().kind() {
            NodeKind::Map(map) => assert_eq!(map.blocks(), Some(16)),
            _ => unreachable!(),
        }
        match layers.shift_rows().kind() {
            NodeKind::Perm(perm) => assert_eq!(perm.block(), Some(8)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn mix_columns_is_fully_determined() {
        let layers = RoundLayers::new().unwrap();
        assert_eq!(layers.mix_columns().width(), Ok(Some(128)));
        assert_eq!(stage_count(layers.mix_columns()), 3);
    }

    #[test]
    fn mix_row_nests_xor_terms() {
        let mut tables = MulTables::default();
        let row = mix_row(&[2, 3, 1, 1], &mut tables).unwrap();
        assert_eq!(row.width(), Ok(Some(8)));
        assert_eq!(
            row.to_string(),
            "[[0:8], sbox [...], ^ [[8:16], sbox [...], ^ [[16:24], sbox [...], ^ [[24:32], sbox [...]]]]]"
        );
    }

    fn table(node: &Node) -> &[usize] {
        match node.kind() {
            NodeKind::Sbox(sbox) => sbox.table(),
            _ => panic!("not a substitution table"),
        }
    }

    #[test]
    fn mul_tables_follow_their_coefficient() {
        let mut tables = MulTables::default();
        for k in [1u8, 2, 3, 4, 9] {
            let node = tables.get(k).unwrap();
            for (x, &y) in table(&node).iter().enumerate() {
                assert_eq!(y, usize::from(crate::gf::gmul(x as u8, k)), "{k} * {x}");
            }
            assert!(Node::ptr_eq(&node, &tables.get(k).unwrap()));
        }
        assert!(!Node::ptr_eq(&tables.get(1).unwrap(), &tables.get(4).unwrap()));
        assert_eq!(tables.tables.len(), 5);
    }

    #[test]
    fn shift_rows_rejects_width_not_divisible_into_slots() {
        let layers = RoundLayers::new().unwrap();
        let head = layers.sub_bytes().then(layers.shift_rows());
        assert_eq!(
            head.resolve(Some(120)).unwrap_err(),
            Error::Width(WidthMismatch::Remainder(8))
        );
    }

    #[test]
    fn final_round_skips_mix_columns() {
        let layers = RoundLayers::new().unwrap();
        let last = layers.final_round(&RoundKey([0; 16])).unwrap();
        assert_eq!(stage_count(&last), 3);
        assert_eq!(last.resolve(Some(128)), Ok(Some(128)));
        assert_eq!(last.resolve(Some(64)).unwrap_err().residual(), Some(-4));
    }
}
