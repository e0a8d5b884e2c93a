//! Two-input combination wrappers and block replication.

use core::fmt;

use log::trace;

use crate::deferred::Deferred;
use crate::error::{InvalidOperand, Result, WidthMismatch};
use crate::leaf::check_fixed;
use crate::node::{Node, NodeKind};

/// Operator tag of a [`Combine`] node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CombineOp {
    /// Bitwise exclusive or.
    Xor,
    /// Modular addition.
    ModAdd,
    /// Modular multiplication.
    ModMul,
}

impl CombineOp {
    /// Display tag.
    pub fn symbol(self) -> &'static str {
        match self {
            CombineOp::Xor => "^",
            CombineOp::ModAdd => "+",
            CombineOp::ModMul => "*",
        }
    }
}

/// Combines two equal-width inputs, one of which is the wrapped child,
/// optionally truncated to a fixed output width.
#[derive(Debug)]
pub struct Combine {
    op: CombineOp,
    child: Node,
    truncate: Option<usize>,
}

impl Combine {
    /// Operator tag.
    pub fn op(&self) -> CombineOp {
        self.op
    }

    /// Wrapped operand.
    pub fn child(&self) -> &Node {
        &self.child
    }

    /// Truncation width, if any.
    pub fn truncate(&self) -> Option<usize> {
        self.truncate
    }

    pub(crate) fn resolve(&self, hint: Option<usize>) -> Result<Option<usize>> {
        match (self.truncate, hint) {
            (None, _) => self.child.resolve(hint),
            (Some(width), None) => {
                self.child.resolve(Some(width))?;
                Ok(Some(width))
            }
            (Some(width), Some(_)) => check_fixed(width, hint),
        }
    }
}

impl fmt::Display for Combine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op.symbol(), self.child)
    }
}

/// Applies one child independently to each of `blocks` consecutive blocks.
#[derive(Debug)]
pub struct Map {
    child: Node,
    blocks: Deferred,
}

impl Map {
    /// Replicated child.
    pub fn child(&self) -> &Node {
        &self.child
    }

    /// Block count, once known.
    pub fn blocks(&self) -> Option<usize> {
        self.blocks.get()
    }

    pub(crate) fn resolve(&self, hint: Option<usize>) -> Result<Option<usize>> {
        let Some(requested) = hint else {
            return match self.blocks.get() {
                Some(blocks) => match self.child.width()? {
                    Some(width) => Ok(Some(WidthMismatch::product(width, blocks)?)),
                    None => Ok(None),
                },
                None => Ok(None),
            };
        };
        if let Some(blocks) = self.blocks.get() {
            return self.resolve_blocks(requested, blocks);
        }
        let child_width = match self.child.width()? {
            Some(width) if width > 0 => width,
            _ => return Err(WidthMismatch::Underdetermined { unresolved: 1 }.into()),
        };
        if requested % child_width != 0 {
            return Err(WidthMismatch::Remainder(requested % child_width).into());
        }
        trace!("map child width {child_width}, hint {requested}");
        match self.blocks.commit(requested / child_width) {
            Ok(_) => Ok(Some(requested)),
            Err(blocks) => self.resolve_blocks(requested, blocks),
        }
    }

    fn resolve_blocks(&self, requested: usize, blocks: usize) -> Result<Option<usize>> {
        // Zero blocks, committed by a zero hint, replicate nothing.
        if blocks == 0 {
            return check_fixed(0, Some(requested));
        }
        if requested % blocks != 0 {
            return Err(WidthMismatch::Remainder(requested % blocks).into());
        }
        let per_block = requested / blocks;
        match self.child.resolve(Some(per_block))? {
            Some(width) if width != per_block => {
                Err(WidthMismatch::between(per_block, width).into())
            }
            _ => Ok(Some(requested)),
        }
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "map {}", self.child)
    }
}

impl Node {
    /// Wraps `child` in a combination node.
    pub fn combine(op: CombineOp, child: Node, truncate: Option<usize>) -> Result<Node> {
        if truncate == Some(0) {
            return Err(InvalidOperand::ZeroFactor {
                what: "truncation width",
            }
            .into());
        }
        Ok(Node::from_kind(NodeKind::Combine(Combine {
            op,
            child,
            truncate,
        })))
    }

    /// XOR against `child`.
    pub fn xor(child: Node, truncate: Option<usize>) -> Result<Node> {
        Node::combine(CombineOp::Xor, child, truncate)
    }

    /// Modular addition with `child`.
    pub fn mod_add(child: Node, truncate: Option<usize>) -> Result<Node> {
        Node::combine(CombineOp::ModAdd, child, truncate)
    }

    /// Modular multiplication with `child`.
    pub fn mod_mul(child: Node, truncate: Option<usize>) -> Result<Node> {
        Node::combine(CombineOp::ModMul, child, truncate)
    }

    /// Replicates `child` over `blocks` blocks, learned later when `None`.
    pub fn map(child: Node, blocks: Option<usize>) -> Result<Node> {
        if blocks == Some(0) {
            return Err(InvalidOperand::ZeroFactor { what: "block count" }.into());
        }
        Ok(Node::from_kind(NodeKind::Map(Map {
            child,
            blocks: Deferred::new("map block count", blocks),
        })))
    }
}
