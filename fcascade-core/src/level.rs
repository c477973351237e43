//! Construction of one cascading level.
//!
//! A level combines a base list (kept whole, unpromoted) with a sample of
//! the adjacent richer list (a raw base list for the deepest level, a
//! promoted list everywhere else):
//!
//! 1. **Sample**: take richer positions `0, d, 2d, ...` as promoted copies
//! 2. **Merge**: two-pointer merge by key, base element first on ties
//! 3. **Drain**: append whatever is left of either side
//! 4. **Wire**: point every node at its nearest neighbours of the other
//!    promotion status
//!
//! Sampling by position rather than by value is what keeps promoted list
//! sizes geometric across levels: list `i` holds `n + ceil(len(i+1) / d)`
//! nodes, so every list stays below `n * d / (d - 1)`.

use crate::error::CascadeError;
use crate::node::{CascadeNode, NodeIndex};
use anyhow::Result;

/// Builds promoted lists with a fixed promotion stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelBuilder {
    unit_frac_den: usize,
}

impl LevelBuilder {
    /// Create a builder promoting one in every `unit_frac_den` richer nodes.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::InvalidFraction`] if `unit_frac_den <= 1`.
    pub fn new(unit_frac_den: usize) -> Result<Self> {
        if unit_frac_den <= 1 {
            anyhow::bail!(CascadeError::InvalidFraction(unit_frac_den));
        }
        Ok(Self { unit_frac_den })
    }

    /// Promotion stride
    #[inline]
    #[must_use]
    pub const fn unit_frac_den(&self) -> usize {
        self.unit_frac_den
    }

    /// Number of nodes promoted out of a richer list of `richer_len` nodes
    #[inline]
    #[must_use]
    pub const fn promoted_count(&self, richer_len: usize) -> usize {
        richer_len.div_ceil(self.unit_frac_den)
    }

    /// Sample every `unit_frac_den`-th richer node as a promoted copy.
    #[must_use]
    pub fn sample_promoted(&self, richer: &[CascadeNode]) -> Vec<CascadeNode> {
        richer
            .iter()
            .enumerate()
            .step_by(self.unit_frac_den)
            .map(|(source, node)| node.copy_promoted(source))
            .collect()
    }

    /// Build the promoted list for one level and wire its cascade pointers.
    ///
    /// The result holds every `base` node as an original copy plus
    /// [`Self::promoted_count`] promoted copies of `richer`, sorted by key.
    #[must_use]
    pub fn build(&self, base: &[CascadeNode], richer: &[CascadeNode]) -> Vec<CascadeNode> {
        let promoted = self.sample_promoted(richer);
        let mut list = Vec::with_capacity(base.len() + promoted.len());

        let mut b = base.iter().peekable();
        let mut p = promoted.into_iter().peekable();

        // Merge
        while let (Some(base_node), Some(promoted_node)) = (b.peek(), p.peek()) {
            if base_node.key() <= promoted_node.key() {
                list.push(base_node.copy_original());
                b.next();
            } else {
                list.push(*promoted_node);
                p.next();
            }
        }

        // Drain
        list.extend(b.map(CascadeNode::copy_original));
        list.extend(p);

        wire_pointers(&mut list);

        tracing::trace!(
            base = base.len(),
            richer = richer.len(),
            size = list.len(),
            "built promoted list"
        );

        list
    }
}

/// Set cascade pointers on a freshly merged promoted list.
///
/// Each node's `prev` becomes the nearest earlier node whose promotion
/// status differs from its own, `next` the nearest later one. Nodes with
/// no such neighbour on a side keep `None` there. Every node is marked
/// prime.
pub fn wire_pointers(list: &mut [CascadeNode]) {
    // Last seen index of each status, indexed by `is_promoted() as usize`
    let mut last: [Option<NodeIndex>; 2] = [None, None];
    for (i, node) in list.iter_mut().enumerate() {
        let status = usize::from(node.is_promoted());
        node.set_prime();
        node.set_prev(last[1 - status]);
        last[status] = Some(i);
    }

    let mut last: [Option<NodeIndex>; 2] = [None, None];
    for (i, node) in list.iter_mut().enumerate().rev() {
        let status = usize::from(node.is_promoted());
        node.set_next(last[1 - status]);
        last[status] = Some(i);
    }
}
