//! fcascade - Fractional cascading over many sorted lists
//!
//! Given `k` lists of `n` sorted elements each, fcascade builds an auxiliary
//! hierarchy of promoted lists so that one key can be located in all `k`
//! lists with a single binary search plus `k - 1` pointer hops, i.e. in
//! O(log n + k) instead of O(k log n).
//!
//! # Features
//!
//! - Bottom-up construction with positional sampling (geometric growth)
//! - Arena-style nodes: cascade pointers are plain indices
//! - Exact `locate` and insertion-point `successors` queries
//! - Immutable after construction, so queries can run from any thread
//!
//! # Example
//!
//! ```
//! use fcascade_core::{CascadeIndex, CascadeOptions, Element};
//!
//! # fn main() -> anyhow::Result<()> {
//! let lists = vec![
//!     vec![Element::new(1, 0), Element::new(5, 0), Element::new(9, 0)],
//!     vec![Element::new(2, 0), Element::new(5, 0), Element::new(7, 0)],
//!     vec![Element::new(5, 0), Element::new(6, 0), Element::new(8, 0)],
//! ];
//!
//! let index = CascadeIndex::build(lists, CascadeOptions { unit_frac_den: 2 })?;
//!
//! // Position of key 5 in each of the three lists
//! assert_eq!(index.locate(5)?, vec![1, 1, 0]);
//!
//! // First element >= 6 in each list
//! assert_eq!(index.successors(6), vec![2, 2, 1]);
//! # Ok(())
//! # }
//! ```
//!
//! # Scope
//!
//! The index is built once from a fixed snapshot. It does not support
//! insertion or deletion, and it is not persisted. Range trees and other
//! consumers sit on top of it and are left to the application.

pub mod element;
pub mod error;
mod index;
#[cfg(feature = "internals")]
pub mod level;
#[cfg(not(feature = "internals"))]
pub(crate) mod level;
mod node;
pub mod search;

pub use element::{Attribute, Attributed, Element, Key};
pub use error::CascadeError;
pub use index::CascadeIndex;
pub use level::LevelBuilder;
pub use node::{CascadeNode, NodeIndex};

/// Configuration options for [`CascadeIndex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeOptions {
    /// Denominator of the promoted fraction: one in every `unit_frac_den`
    /// nodes of a richer list is copied up. Must be greater than 1.
    pub unit_frac_den: usize,
}

impl Default for CascadeOptions {
    fn default() -> Self {
        Self { unit_frac_den: 2 }
    }
}
