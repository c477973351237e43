//! The cascading index: k sorted lists, k-1 promoted lists, one search.
//!
//! # Layout
//!
//! ```text
//! base[0]   base[1]   ...   base[k-2]   base[k-1]
//!    \         \                \          /
//!  prime[0] <- prime[1] <- ... <- prime[k-2]
//! ```
//!
//! `prime[k-2]` merges two raw base lists. Every other `prime[i]` merges
//! `base[i]` with a sample of `prime[i+1]`. Levels are built back to front
//! because each one reads the finished level after it.
//!
//! # Query Protocol
//!
//! One binary search in `prime[0]` yields a lower-bound position `p`. Then,
//! for each level `i`:
//!
//! - the first original node at or after `p` gives the answer in `base[i]`
//! - the first promoted node at or after `p` names a position in the
//!   richer list, which is at most `d - 1` steps past the answer there
//!
//! Both "first node at or after `p`" lookups are either node `p` itself or
//! its `next` pointer, so each level costs O(d) and the whole query
//! O(log n + k * d).

use crate::CascadeOptions;
use crate::element::{Attribute, Element, Key};
use crate::error::CascadeError;
use crate::level::LevelBuilder;
use crate::node::CascadeNode;
use crate::search::{locate_first, lower_bound};
use anyhow::Result;

/// Fractional cascading index over `k` equally sized sorted lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeIndex {
    /// Input lists as nodes tagged with level and origin; the only copy
    /// of the supplied elements
    base_nodes: Vec<Vec<CascadeNode>>,

    /// Promoted lists, `prime[i]` built from `base[i]` and level `i + 1`
    prime: Vec<Vec<CascadeNode>>,

    /// Elements per base list
    n: usize,

    /// Promotion stride
    unit_frac_den: usize,
}

impl CascadeIndex {
    /// Build an index with default options.
    ///
    /// # Errors
    ///
    /// See [`CascadeIndex::build`].
    pub fn new(lists: Vec<Vec<Element>>) -> Result<Self> {
        Self::build(lists, CascadeOptions::default())
    }

    /// Build an index from `k` base lists, each sorted ascending by key.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `options.unit_frac_den <= 1` (checked before anything else)
    /// - no lists are supplied
    /// - a list is empty, or lengths differ
    /// - a list is not sorted by key
    pub fn build(lists: Vec<Vec<Element>>, options: CascadeOptions) -> Result<Self> {
        let builder = LevelBuilder::new(options.unit_frac_den)?;
        let n = validate_lists(&lists)?;
        let k = lists.len();

        tracing::debug!(
            dimensions = k,
            list_len = n,
            unit_frac_den = options.unit_frac_den,
            "building cascade index"
        );

        let base_nodes: Vec<Vec<CascadeNode>> = lists
            .into_iter()
            .enumerate()
            .map(|(dim, list)| {
                list.into_iter()
                    .enumerate()
                    .map(|(pos, element)| CascadeNode::new(element, dim + 1, pos))
                    .collect()
            })
            .collect();

        let prime = build_levels(&builder, &base_nodes);

        Ok(Self { base_nodes, prime, n, unit_frac_den: options.unit_frac_den })
    }

    /// Number of lists (k)
    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.base_nodes.len()
    }

    /// Number of elements in each base list (n)
    #[inline]
    #[must_use]
    pub fn list_len(&self) -> usize {
        self.n
    }

    /// Promotion stride the index was built with
    #[inline]
    #[must_use]
    pub fn unit_frac_den(&self) -> usize {
        self.unit_frac_den
    }

    /// Copy of the base lists, as supplied
    #[must_use]
    pub fn base_lists(&self) -> Vec<Vec<Element>> {
        self.base_nodes.iter().map(|nodes| nodes.iter().map(|n| *n.element()).collect()).collect()
    }

    /// Elements of one base list in order, if `dimension < k`
    #[must_use]
    pub fn base_list(&self, dimension: usize) -> Option<impl ExactSizeIterator<Item = &Element>> {
        self.base_nodes.get(dimension).map(|nodes| nodes.iter().map(CascadeNode::element))
    }

    /// Element at `pos` of base list `dimension`
    #[must_use]
    pub fn element(&self, dimension: usize, pos: usize) -> Option<&Element> {
        self.base_nodes.get(dimension)?.get(pos).map(CascadeNode::element)
    }

    /// The base lists as nodes tagged with level (1-based) and origin
    #[must_use]
    pub fn base_nodes(&self) -> &[Vec<CascadeNode>] {
        &self.base_nodes
    }

    /// All `k - 1` promoted lists, entry point first
    #[must_use]
    pub fn promoted_lists(&self) -> &[Vec<CascadeNode>] {
        &self.prime
    }

    /// The promoted list for `level`
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::LevelOutOfRange`] if `level >= k - 1`.
    pub fn promoted_list(&self, level: usize) -> Result<&[CascadeNode]> {
        match self.prime.get(level) {
            Some(list) => Ok(list.as_slice()),
            None => anyhow::bail!(CascadeError::LevelOutOfRange { level, levels: self.prime.len() }),
        }
    }

    /// Total nodes across all promoted lists
    #[must_use]
    pub fn total_promoted_len(&self) -> usize {
        self.prime.iter().map(Vec::len).sum()
    }

    /// Locate `key` in every base list.
    ///
    /// Performs one exact binary search in the first promoted list, then
    /// follows cascade pointers down the hierarchy. Returns the position of
    /// `key` in each of the `k` lists (the first one, if a list repeats it).
    ///
    /// # Errors
    ///
    /// - [`CascadeError::NotFound`] if `key` is absent from the first promoted list
    /// - [`CascadeError::MissingInDimension`] if some base list lacks `key`
    pub fn locate(&self, key: Key) -> Result<Vec<usize>> {
        let positions = match self.prime.first() {
            Some(entry) => {
                let start = locate_first(entry, key, Attribute::Key)?;
                self.cascade(key, start)
            }
            None => vec![locate_first(&self.base_nodes[0], key, Attribute::Key)?],
        };

        for (dimension, &pos) in positions.iter().enumerate() {
            let hit = self.element(dimension, pos).is_some_and(|e| e.key() == key);
            if !hit {
                anyhow::bail!(CascadeError::MissingInDimension { value: key, dimension });
            }
        }

        Ok(positions)
    }

    /// Position of the first element with key `>= key` in every base list.
    ///
    /// A position equal to [`Self::list_len`] means every element of that
    /// list is smaller than `key`. Uses the same single search and cascade
    /// as [`Self::locate`], so absent keys are fine.
    #[must_use]
    pub fn successors(&self, key: Key) -> Vec<usize> {
        match self.prime.first() {
            Some(entry) => self.cascade(key, lower_bound(entry, key, Attribute::Key)),
            None => vec![lower_bound(&self.base_nodes[0], key, Attribute::Key)],
        }
    }

    /// Walk from lower-bound position `start` in `prime[0]` down every level.
    fn cascade(&self, key: Key, start: usize) -> Vec<usize> {
        let k = self.dimensions();
        let mut positions = Vec::with_capacity(k);
        let mut p = start;

        for (i, list) in self.prime.iter().enumerate() {
            // Answer in base[i]: first original node at or after p
            let original = first_with_status(list, p, false).map_or(self.n, CascadeNode::origin);
            positions.push(original);

            // Richer list: base[k-1] for the deepest level, prime[i+1] otherwise
            let richer: &[CascadeNode] = match self.prime.get(i + 1) {
                Some(next) => next.as_slice(),
                None => self.base_nodes[k - 1].as_slice(),
            };

            let mut j = first_with_status(list, p, true)
                .and_then(CascadeNode::promoted_from)
                .unwrap_or(richer.len());

            // At most d - 1 steps back to the richer lower bound
            while j > 0 && richer[j - 1].key() >= key {
                j -= 1;
            }
            p = j;
        }

        // p now indexes base[k-1]
        positions.push(p);
        positions
    }
}

/// First node at or after `p` whose promotion status is `promoted`.
///
/// Either node `p` itself or the node its `next` pointer names.
#[inline]
fn first_with_status(list: &[CascadeNode], p: usize, promoted: bool) -> Option<&CascadeNode> {
    let node = list.get(p)?;
    if node.is_promoted() == promoted {
        Some(node)
    } else {
        node.next().and_then(|next| list.get(next))
    }
}

/// Build `prime[k-2]` down to `prime[0]`.
fn build_levels(builder: &LevelBuilder, base: &[Vec<CascadeNode>]) -> Vec<Vec<CascadeNode>> {
    let k = base.len();
    if k < 2 {
        return Vec::new();
    }

    // Built back to front, reversed at the end
    let mut built: Vec<Vec<CascadeNode>> = Vec::with_capacity(k - 1);
    for i in (0..k - 1).rev() {
        let richer = match built.last() {
            Some(previous) => previous.as_slice(),
            None => base[k - 1].as_slice(),
        };
        let list = builder.build(&base[i], richer);

        tracing::debug!(level = i, size = list.len(), "built promoted level");
        built.push(list);
    }

    built.reverse();
    built
}

/// Check list shape and order, returning the common length.
fn validate_lists(lists: &[Vec<Element>]) -> Result<usize> {
    let Some(first) = lists.first() else {
        anyhow::bail!(CascadeError::NoDimensions);
    };
    let n = first.len();

    for (dimension, list) in lists.iter().enumerate() {
        if list.is_empty() {
            anyhow::bail!(CascadeError::EmptyList { dimension });
        }
        if list.len() != n {
            anyhow::bail!(CascadeError::LengthMismatch { dimension, expected: n, actual: list.len() });
        }
        if let Some(w) = list.windows(2).position(|w| w[1].key() < w[0].key()) {
            anyhow::bail!(CascadeError::Unsorted { dimension, position: w + 1 });
        }
    }

    Ok(n)
}
