//! # Name - Opaque Identifier Type
//!
//! ## Purpose
//!
//! Every realm, community, trust router, APC and filter field is keyed by a
//! `Name`: an owned, immutable byte string with an explicit length. Names are
//! duplicated rather than shared when stored, so two holders never alias the
//! same buffer.
//!
//! ## Matching
//!
//! - **Exact**: byte-for-byte equality (`==`)
//! - **Prefix wildcard**: a pattern whose last byte is `*` matches any value
//!   that starts with the bytes before the `*`. `"example.*"` matches
//!   `"example.org"`, and `"*"` matches everything. An empty pattern
//!   matches nothing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;

/// Marker byte that turns a pattern into a prefix match.
pub const WILDCARD: u8 = b'*';

/// Immutable, length-delimited identifier.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Name(Box<[u8]>);

impl Name {
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        Self(bytes.as_ref().into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// UTF-8 view, replacing invalid sequences. Used for logs and JSON.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    /// Exact comparison against a string literal.
    pub fn eq_str(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }

    /// True when this name ends with the wildcard marker.
    pub fn is_wildcard(&self) -> bool {
        self.0.last() == Some(&WILDCARD)
    }

    /// Match this value against `pattern`.
    ///
    /// ```
    /// use types::Name;
    ///
    /// let pattern = Name::from("example.*");
    /// assert!(Name::from("example.org").prefix_wildcard_match(&pattern));
    /// assert!(!Name::from("other.org").prefix_wildcard_match(&pattern));
    /// ```
    pub fn prefix_wildcard_match(&self, pattern: &Name) -> bool {
        match pattern.as_bytes().split_last() {
            None => false,
            Some((&WILDCARD, prefix)) => self.as_bytes().starts_with(prefix),
            Some(_) => self == pattern,
        }
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", self.to_string_lossy())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Self(value.into_bytes().into_boxed_slice())
    }
}

impl From<&String> for Name {
    fn from(value: &String) -> Self {
        Self::new(value)
    }
}

impl From<&[u8]> for Name {
    fn from(value: &[u8]) -> Self {
        Self::new(value)
    }
}

impl AsRef<[u8]> for Name {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_lossy())
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Name::from)
    }
}
