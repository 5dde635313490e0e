//! Pet resource identifiers and URI-to-operation routing.
//!
//! # Responsibility
//! - Build and carry content URIs for the pet collection and single rows.
//! - Resolve a URI into one of the two registered operation shapes.
//!
//! # Invariants
//! - `resolve` is a total, pure function: every input maps to exactly one
//!   of `Collection`, `Item` or `NoMatch`.
//! - The pattern set is closed and known at build time; nothing registers
//!   patterns at runtime.

use crate::schema::{AUTHORITY, PATH_PETS, SCHEME};
use std::fmt::{Display, Formatter};

/// Opaque resource identifier naming the pet collection or one pet row.
///
/// Construction never validates; routing validity is decided by
/// [`resolve`], so callers can carry arbitrary URIs and get a uniform
/// `NoMatch` answer for foreign ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentUri(String);

impl ContentUri {
    /// Wraps a raw URI string without validating it.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// URI naming the whole pet collection.
    pub fn collection() -> Self {
        Self(format!("{SCHEME}://{AUTHORITY}/{PATH_PETS}"))
    }

    /// URI naming the single pet row with the given id.
    pub fn item(id: i64) -> Self {
        Self::collection().with_appended_id(id)
    }

    /// Returns this URI with a numeric id appended as a new path segment.
    ///
    /// Used by insert to turn the collection URI it was called with into
    /// the item URI of the newly assigned row.
    pub fn with_appended_id(&self, id: i64) -> Self {
        Self(format!("{}/{id}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Segment-boundary prefix test used for change delivery.
    ///
    /// True when `self` equals `other` or names one of its ancestors:
    /// the collection URI is a prefix of every item URI under it, but
    /// `.../pets` is not a prefix of `.../petshop`.
    pub fn is_prefix_of(&self, other: &ContentUri) -> bool {
        other.0 == self.0
            || (other.0.len() > self.0.len()
                && other.0.starts_with(&self.0)
                && other.0.as_bytes()[self.0.len()] == b'/')
    }
}

impl Display for ContentUri {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentUri {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Outcome of routing a URI against the two registered patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriMatch {
    /// `content://<authority>/pets` — the whole record collection.
    Collection,
    /// `content://<authority>/pets/<id>` — one record by numeric id.
    Item(i64),
    /// Anything else. Downstream operations treat this as a routing
    /// failure.
    NoMatch,
}

/// Routes a URI to its operation shape.
///
/// The trailing id segment must be plain decimal digits that fit a
/// non-negative `i64`; signs, blanks and overflow all yield `NoMatch`.
pub fn resolve(uri: &ContentUri) -> UriMatch {
    let prefix = format!("{SCHEME}://");
    let Some(rest) = uri.as_str().strip_prefix(&prefix) else {
        return UriMatch::NoMatch;
    };

    let mut segments = rest.split('/');
    if segments.next() != Some(AUTHORITY) {
        return UriMatch::NoMatch;
    }
    if segments.next() != Some(PATH_PETS) {
        return UriMatch::NoMatch;
    }

    match segments.next() {
        None => UriMatch::Collection,
        Some(id_segment) => {
            if segments.next().is_some() {
                return UriMatch::NoMatch;
            }
            parse_id_segment(id_segment).map_or(UriMatch::NoMatch, UriMatch::Item)
        }
    }
}

fn parse_id_segment(segment: &str) -> Option<i64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse::<i64>().ok()
}
