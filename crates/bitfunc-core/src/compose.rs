//! Sequential pipelines and parallel concatenations.
//!
//! Both keep their children in a flat, canonical list: composing two
//! pipelines yields one pipeline holding both stage lists, and likewise for
//! concatenations. Nested same-kind nodes never appear.

use core::fmt;

use log::trace;

use crate::error::{Result, WidthMismatch};
use crate::leaf::check_fixed;
use crate::node::{Node, NodeKind};

/// Pipeline whose stages all share one width.
#[derive(Debug)]
pub struct Seq {
    stages: Box<[Node]>,
}

impl Seq {
    /// Stages in pipeline order.
    pub fn stages(&self) -> &[Node] {
        &self.stages
    }

    pub(crate) fn resolve(&self, hint: Option<usize>) -> Result<Option<usize>> {
        let mut width = hint;
        for stage in self.stages.iter() {
            let found = stage.resolve(width)?;
            match (width, found) {
                (None, _) => width = found,
                (Some(current), Some(found)) if current != found => {
                    return Err(WidthMismatch::between(current, found).into());
                }
                _ => {}
            }
        }
        match (hint, width) {
            // Stages that ran before the width surfaced still need it.
            (None, Some(found)) => {
                trace!("pipeline of {} stages settles on {found}", self.stages.len());
                self.resolve(Some(found))
            }
            _ => Ok(width),
        }
    }
}

impl fmt::Display for Seq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{stage}")?;
        }
        f.write_str("]")
    }
}

/// Lanes laid side by side; total width is the sum of lane widths.
#[derive(Debug)]
pub struct Cat {
    lanes: Box<[Node]>,
}

impl Cat {
    /// Lanes, lowest bits first.
    pub fn lanes(&self) -> &[Node] {
        &self.lanes
    }

    pub(crate) fn resolve(&self, hint: Option<usize>) -> Result<Option<usize>> {
        let widths = self
            .lanes
            .iter()
            .map(Node::width)
            .collect::<Result<Vec<_>>>()?;
        let Some(requested) = hint else {
            if widths.contains(&None) {
                return Ok(None);
            }
            return Ok(Some(checked_sum(widths.iter().flatten())?));
        };

        let known = checked_sum(widths.iter().flatten())?;
        let missing: Vec<usize> = widths
            .iter()
            .enumerate()
            .filter_map(|(i, w)| w.is_none().then_some(i))
            .collect();
        match missing.as_slice() {
            [] => check_fixed(known, hint),
            &[lane] => {
                if known > requested {
                    return Err(WidthMismatch::between(requested, known).into());
                }
                let rest = requested - known;
                trace!("solving lane {lane} of {} for width {rest}", self.lanes.len());
                match self.lanes[lane].resolve(Some(rest))? {
                    Some(found) if found != rest => {
                        Err(WidthMismatch::between(rest, found).into())
                    }
                    _ => Ok(Some(requested)),
                }
            }
            _ => Err(WidthMismatch::Underdetermined {
                unresolved: missing.len(),
            }
            .into()),
        }
    }
}

fn checked_sum<'a>(mut widths: impl Iterator<Item = &'a usize>) -> Result<usize> {
    widths
        .try_fold(0usize, |total, &w| total.checked_add(w))
        .ok_or_else(|| WidthMismatch::Overflow.into())
}

impl fmt::Display for Cat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, lane) in self.lanes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ++ ")?;
            }
            write!(f, "{lane}")?;
        }
        Ok(())
    }
}

impl Node {
    /// Pipeline running `self` then `next`.
    pub fn then(&self, next: &Node) -> Node {
        let mut stages = self.stage_list();
        stages.extend(next.stage_list());
        Node::from_seq(stages)
    }

    /// Pipeline running `before` then `self`.
    pub fn prepend(&self, before: &Node) -> Node {
        before.then(self)
    }

    /// Concatenation of `self` followed by `next`.
    pub fn concat(&self, next: &Node) -> Node {
        let mut lanes = self.lane_list();
        lanes.extend(next.lane_list());
        Node::from_cat(lanes)
    }

    /// Pipeline of `stages`, flattening nested pipelines.
    pub fn seq(stages: impl IntoIterator<Item = Node>) -> Node {
        Node::from_seq(stages.into_iter().flat_map(|n| n.stage_list()).collect())
    }

    /// Concatenation of `lanes`, flattening nested concatenations.
    pub fn cat(lanes: impl IntoIterator<Item = Node>) -> Node {
        Node::from_cat(lanes.into_iter().flat_map(|n| n.lane_list()).collect())
    }

    fn from_seq(stages: Vec<Node>) -> Node {
        Node::from_kind(NodeKind::Seq(Seq {
            stages: stages.into_boxed_slice(),
        }))
    }

    fn from_cat(lanes: Vec<Node>) -> Node {
        Node::from_kind(NodeKind::Cat(Cat {
            lanes: lanes.into_boxed_slice(),
        }))
    }

    fn stage_list(&self) -> Vec<Node> {
        match self.kind() {
            NodeKind::Seq(seq) => seq.stages.to_vec(),
            _ => vec![self.clone()],
        }
    }

    fn lane_list(&self) -> Vec<Node> {
        match self.kind() {
            NodeKind::Cat(cat) => cat.lanes.to_vec(),
            _ => vec![self.clone()],
        }
    }
}
