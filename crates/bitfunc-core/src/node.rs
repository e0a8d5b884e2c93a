//! The shared node handle and width-resolution dispatch.

use core::fmt;
use std::sync::Arc;

use crate::combine::{Combine, Map};
use crate::compose::{Cat, Seq};
use crate::error::Result;
use crate::leaf::{Const, Perm, Sbox, Slice};

/// Every kind of node in an expression tree.
#[derive(Debug)]
pub enum NodeKind {
    /// Fixed constant.
    Const(Const),
    /// Substitution table.
    Sbox(Sbox),
    /// Slot permutation with a possibly deferred block factor.
    Perm(Perm),
    /// Fixed bit range.
    Slice(Slice),
    /// Block-replicated child with a possibly deferred block count.
    Map(Map),
    /// Sequential pipeline.
    Seq(Seq),
    /// Parallel concatenation.
    Cat(Cat),
    /// XOR, modular addition or modular multiplication wrapper.
    Combine(Combine),
}

/// Handle to an immutable expression node.
///
/// Cloning is cheap and shares the node: a subtree reused in several places
/// is resolved once, and a block factor learned through one use holds for
/// all of them. Nodes are `Send + Sync`.
#[derive(Clone)]
pub struct Node(Arc<NodeKind>);

impl Node {
    pub(crate) fn from_kind(kind: NodeKind) -> Self {
        Self(Arc::new(kind))
    }

    /// The node's variant.
    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.0
    }

    /// Checks or derives the node's width.
    ///
    /// With a `hint`, the node either confirms it, learns any deferred block
    /// parameter from it (at most once), or fails with a
    /// [`WidthMismatch`](crate::WidthMismatch). Without a hint, returns the
    /// width if it is determined and `None` otherwise.
    pub fn resolve(&self, hint: Option<usize>) -> Result<Option<usize>> {
        match self.kind() {
            NodeKind::Const(node) => node.resolve(hint),
            NodeKind::Sbox(node) => node.resolve(hint),
            NodeKind::Perm(node) => node.resolve(hint),
            NodeKind::Slice(node) => node.resolve(hint),
            NodeKind::Map(node) => node.resolve(hint),
            NodeKind::Seq(node) => node.resolve(hint),
            NodeKind::Cat(node) => node.resolve(hint),
            NodeKind::Combine(node) => node.resolve(hint),
        }
    }

    /// Width without an external hint.
    #[inline]
    pub fn width(&self) -> Result<Option<usize>> {
        self.resolve(None)
    }

    /// Whether two handles refer to the same node.
    pub fn ptr_eq(a: &Node, b: &Node) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.kind(), f)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            NodeKind::Const(node) => fmt::Display::fmt(node, f),
            NodeKind::Sbox(node) => fmt::Display::fmt(node, f),
            NodeKind::Perm(node) => fmt::Display::fmt(node, f),
            NodeKind::Slice(node) => fmt::Display::fmt(node, f),
            NodeKind::Map(node) => fmt::Display::fmt(node, f),
            NodeKind::Seq(node) => fmt::Display::fmt(node, f),
            NodeKind::Cat(node) => fmt::Display::fmt(node, f),
            NodeKind::Combine(node) => fmt::Display::fmt(node, f),
        }
    }
}
