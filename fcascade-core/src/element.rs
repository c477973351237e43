//! Ordered elements: the records stored in every base list.
//!
//! An element carries the key every list is ordered by, plus one auxiliary
//! attribute (typically a spatial coordinate) that rides along for whatever
//! structure consumes the index. The auxiliary value plays no part in ordering.

use crate::error::CascadeError;

/// Key type shared by all lists
pub type Key = i64;

/// Attribute selector used by [`crate::search::locate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Attribute {
    /// The ordering key (code 0)
    Key = 0,
    /// The auxiliary value (code 1)
    Auxiliary = 1,
}

impl Attribute {
    /// Numeric attribute code
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Attribute {
    type Error = CascadeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Key),
            1 => Ok(Self::Auxiliary),
            other => Err(CascadeError::InvalidAttribute(other)),
        }
    }
}

/// Anything that can be searched by attribute.
pub trait Attributed {
    /// Returns the value of `attr` for this record
    fn attribute(&self, attr: Attribute) -> Key;
}

/// Immutable comparable record with a key and an auxiliary attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Element {
    key: Key,
    auxiliary: Key,
}

impl Element {
    /// Create a new element
    #[must_use]
    pub const fn new(key: Key, auxiliary: Key) -> Self {
        Self { key, auxiliary }
    }

    /// Ordering key
    #[inline]
    #[must_use]
    pub const fn key(&self) -> Key {
        self.key
    }

    /// Auxiliary attribute
    #[inline]
    #[must_use]
    pub const fn auxiliary(&self) -> Key {
        self.auxiliary
    }
}

impl Attributed for Element {
    #[inline]
    fn attribute(&self, attr: Attribute) -> Key {
        match attr {
            Attribute::Key => self.key,
            Attribute::Auxiliary => self.auxiliary,
        }
    }
}

impl From<(Key, Key)> for Element {
    fn from((key, auxiliary): (Key, Key)) -> Self {
        Self::new(key, auxiliary)
    }
}
