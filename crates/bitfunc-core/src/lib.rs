//! An algebra of fixed-width bit-transformation expressions.
//!
//! Leaf nodes (constants, substitution tables, permutations, slices) are
//! composed into pipelines, concatenations, block maps and two-input
//! combinations. A node's width may be unknown when it is built; calling
//! [`Node::resolve`] on the root walks the tree once, propagating hints
//! downward and computed widths upward, and fixes every deferred block
//! parameter at most once.
//!
//! Nothing here evaluates a tree on data. The crate only builds trees and
//! checks that their widths are consistent.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod combine;
mod compose;
mod deferred;
mod error;
mod leaf;
mod node;

pub use crate::combine::{Combine, CombineOp, Map};
pub use crate::compose::{Cat, Seq};
pub use crate::error::{Error, InvalidOperand, Result, WidthMismatch};
pub use crate::leaf::{Const, Perm, Sbox, Slice};
pub use crate::node::{Node, NodeKind};
