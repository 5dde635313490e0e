//! Pet table contract: names, MIME types and the gender domain.
//!
//! # Responsibility
//! - Define the authority/path constants that make up pet content URIs.
//! - Define the `pets` table and column names used by persistence.
//! - Define the closed gender enumeration and its storage codes.
//!
//! # Invariants
//! - Constants here are fixed configuration; nothing is registered at
//!   runtime.
//! - Gender storage codes are stable: 0=unknown, 1=male, 2=female.

use serde::{Deserialize, Serialize};

/// Content authority for all pet resource identifiers.
pub const AUTHORITY: &str = "com.petbook.app";

/// Path segment naming the pet collection.
pub const PATH_PETS: &str = "pets";

/// URI scheme for pet resource identifiers.
pub const SCHEME: &str = "content";

/// SQLite table holding pet rows.
pub const TABLE_PETS: &str = "pets";

/// Primary key column, assigned by the storage engine on insert.
pub const COL_ID: &str = "_id";
/// Pet name column. NOT NULL.
pub const COL_NAME: &str = "name";
/// Pet breed column. Nullable, unconstrained.
pub const COL_BREED: &str = "breed";
/// Pet gender column. NOT NULL, stores a `Gender` code.
pub const COL_GENDER: &str = "gender";
/// Pet weight column. NOT NULL, defaults to 0.
pub const COL_WEIGHT: &str = "weight";

/// MIME type for a cursor over the whole pet collection.
pub const CONTENT_TYPE_LIST: &str = "vnd.android.cursor.dir/com.petbook.app.pets";

/// MIME type for a cursor over a single pet row.
pub const CONTENT_TYPE_ITEM: &str = "vnd.android.cursor.item/com.petbook.app.pets";

/// Default database file name used by app-facing callers.
pub const DB_FILE_NAME: &str = "petbook.sqlite3";

/// Closed gender domain for pet records.
///
/// Persisted as an integer code; any code outside the enumeration is
/// invalid input and must be rejected before it reaches storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    /// Gender not specified by the owner.
    Unknown,
    Male,
    Female,
}

impl Gender {
    /// Returns the stable storage code for this gender.
    pub fn code(self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::Male => 1,
            Self::Female => 2,
        }
    }

    /// Maps a storage code back into the enumeration.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Unknown),
            1 => Some(Self::Male),
            2 => Some(Self::Female),
            _ => None,
        }
    }

    /// Membership predicate used by insert/update validation.
    pub fn is_valid_code(code: i64) -> bool {
        Self::from_code(code).is_some()
    }
}
