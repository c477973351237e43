//! Attribute binary search over arrays sorted by a chosen attribute.
//!
//! [`locate`] is an exact-match search meant for values the caller knows are
//! present: cascading sentinels and keys pulled from the lists themselves.
//! When the search range collapses it re-checks index `right` once before
//! giving up. There is no scan fallback beyond that single check.
//!
//! [`lower_bound`] is the insertion-point variant used by successor queries,
//! where the key need not be present at all.

use crate::element::{Attribute, Attributed, Key};
use crate::error::CascadeError;
use anyhow::Result;
use std::cmp::Ordering;

/// Locate `target` in `items`, which must be sorted ascending by `attr`.
///
/// Returns the index of an element whose attribute equals `target`. With
/// duplicates, any matching index may be returned; see [`locate_first`].
///
/// # Errors
///
/// - [`CascadeError::EmptyInput`] if `items` is empty
/// - [`CascadeError::NotFound`] if the range collapses and index `right`
///   does not hold `target`
pub fn locate<T: Attributed>(items: &[T], target: Key, attr: Attribute) -> Result<usize> {
    if items.is_empty() {
        anyhow::bail!(CascadeError::EmptyInput);
    }

    let mut left: isize = 0;
    let mut right: isize = items.len() as isize - 1;

    loop {
        if right < 1 || left > right {
            // Last resort: the collapsed range may still sit on the value
            let last = usize::try_from(right).ok().and_then(|r| items.get(r));
            if let Some(item) = last {
                if item.attribute(attr) == target {
                    return Ok(right as usize);
                }
            }
            anyhow::bail!(CascadeError::NotFound { value: target, left, right });
        }

        let mid = left + (right - left) / 2;
        let value = items[mid as usize].attribute(attr);

        match target.cmp(&value) {
            Ordering::Equal => return Ok(mid as usize),
            Ordering::Less => right = mid - 1,
            Ordering::Greater => left = mid + 1,
        }
    }
}

/// Like [`locate`], but returns the first of a run of equal values.
///
/// The run start is found by a second binary search over `items[..=pos]`,
/// so long runs of duplicates stay O(log n).
///
/// # Errors
///
/// Same as [`locate`].
pub fn locate_first<T: Attributed>(items: &[T], target: Key, attr: Attribute) -> Result<usize> {
    let pos = locate(items, target, attr)?;
    Ok(lower_bound(items.get(..=pos).unwrap_or_default(), target, attr))
}

/// Index of the first element whose attribute is `>= target`.
///
/// Returns `items.len()` when every element is smaller. Never fails, and an
/// empty slice yields 0.
#[inline]
pub fn lower_bound<T: Attributed>(items: &[T], target: Key, attr: Attribute) -> usize {
    items.partition_point(|item| item.attribute(attr) < target)
}
