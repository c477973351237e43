//! Cascading nodes: elements annotated with their place in the hierarchy.
//!
//! # Arena Layout
//!
//! Nodes live in plain per-list vectors. Cascade pointers are indices into
//! the same list as the node holding them, so they never own anything and
//! never outlive the list. Promotion copies a node by value; copies in
//! different lists share no state.
//!
//! # Pointer Invariant
//!
//! `prev`/`next` always reference the nearest node of the *opposite*
//! promotion status. A promoted node points at the nearest original nodes,
//! an original node points at the nearest promoted nodes. Both are written
//! once while a list is wired and are read-only afterwards.

use crate::element::{Attribute, Attributed, Element, Key};

/// Index of a node inside one list
pub type NodeIndex = usize;

/// One element of a base or promoted list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeNode {
    /// The wrapped record
    element: Element,

    /// Dimension this node logically belongs to (1-based)
    level: usize,

    /// Index within its source base list
    origin: usize,

    /// Source index in the richer list, if this copy was promoted
    promoted_from: Option<NodeIndex>,

    /// Whether the node sits in a promoted list
    prime: bool,

    /// Nearest earlier node of opposite promotion status
    prev: Option<NodeIndex>,

    /// Nearest later node of opposite promotion status
    next: Option<NodeIndex>,
}

impl CascadeNode {
    /// Create a base-list node for `element` at `origin` in dimension `level`
    #[must_use]
    pub const fn new(element: Element, level: usize, origin: usize) -> Self {
        Self { element, level, origin, promoted_from: None, prime: false, prev: None, next: None }
    }

    /// Copy this node as an original (non-promoted) member of a new list.
    ///
    /// Pointers are cleared; they belong to the list being built.
    #[must_use]
    pub(crate) fn copy_original(&self) -> Self {
        Self { promoted_from: None, prev: None, next: None, ..*self }
    }

    /// Copy this node as a promoted member sampled from `source` in the richer list.
    #[must_use]
    pub(crate) fn copy_promoted(&self, source: NodeIndex) -> Self {
        Self { promoted_from: Some(source), prev: None, next: None, ..*self }
    }

    /// The wrapped element
    #[inline]
    #[must_use]
    pub const fn element(&self) -> &Element {
        &self.element
    }

    /// Ordering key
    #[inline]
    #[must_use]
    pub const fn key(&self) -> Key {
        self.element.key()
    }

    /// Dimension this node belongs to (1-based)
    #[inline]
    #[must_use]
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Position in its source base list
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> usize {
        self.origin
    }

    /// Whether this copy was sampled from the richer list
    #[inline]
    #[must_use]
    pub const fn is_promoted(&self) -> bool {
        self.promoted_from.is_some()
    }

    /// Index in the richer list this copy was sampled from
    #[inline]
    #[must_use]
    pub const fn promoted_from(&self) -> Option<NodeIndex> {
        self.promoted_from
    }

    /// Whether the node lives in a promoted list
    #[inline]
    #[must_use]
    pub const fn is_prime(&self) -> bool {
        self.prime
    }

    /// Nearest earlier node with opposite promotion status
    #[inline]
    #[must_use]
    pub const fn prev(&self) -> Option<NodeIndex> {
        self.prev
    }

    /// Nearest later node with opposite promotion status
    #[inline]
    #[must_use]
    pub const fn next(&self) -> Option<NodeIndex> {
        self.next
    }

    pub(crate) fn set_prime(&mut self) {
        self.prime = true;
    }

    pub(crate) fn set_prev(&mut self, prev: Option<NodeIndex>) {
        self.prev = prev;
    }

    pub(crate) fn set_next(&mut self, next: Option<NodeIndex>) {
        self.next = next;
    }
}

impl Attributed for CascadeNode {
    #[inline]
    fn attribute(&self, attr: Attribute) -> Key {
        self.element.attribute(attr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_is_original() {
        let node = CascadeNode::new(Element::new(5, 50), 2, 3);

        assert_eq!(node.key(), 5);
        assert_eq!(node.level(), 2);
        assert_eq!(node.origin(), 3);
        assert!(!node.is_promoted());
        assert!(!node.is_prime());
        assert_eq!(node.prev(), None);
        assert_eq!(node.next(), None);
    }

    #[test]
    fn test_promoted_copy_is_independent() {
        let mut original = CascadeNode::new(Element::new(5, 50), 2, 3);
        original.set_prev(Some(1));

        let copy = original.copy_promoted(6);
        original.set_next(Some(9));

        assert!(copy.is_promoted());
        assert_eq!(copy.promoted_from(), Some(6));
        assert_eq!(copy.origin(), 3);
        assert_eq!(copy.prev(), None);
        assert_eq!(copy.next(), None);
    }

    #[test]
    fn test_original_copy_clears_promotion() {
        let promoted = CascadeNode::new(Element::new(5, 50), 2, 3).copy_promoted(4);
        let copy = promoted.copy_original();

        assert!(!copy.is_promoted());
        assert_eq!(copy.level(), 2);
    }
}
