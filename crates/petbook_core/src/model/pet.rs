//! Pet record, partial-record patch and validation rules.
//!
//! # Responsibility
//! - Define the full `Pet` read model and the `PetPatch` write model.
//! - Validate patches before any storage mutation is attempted.
//!
//! # Invariants
//! - Validation is ordered and fail-fast; the first violated rule wins.
//! - A patch field that is absent is never rejected on update.
//! - Validation never touches storage; it completes before any write.

use crate::schema::Gender;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One persisted row of the pet table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    /// Row id assigned by the storage engine on insert. Immutable.
    pub id: i64,
    /// Display name. Never empty.
    pub name: String,
    /// Free-form breed text. Unconstrained, may be absent.
    pub breed: Option<String>,
    pub gender: Gender,
    /// Weight in whole units. Never negative; 0 means unspecified.
    pub weight: i64,
}

/// Partial pet record for insert and update operations.
///
/// Every field carries its own presence flag so validation can tell
/// "absent" apart from "present but invalid". Gender and weight are kept
/// as raw integers here: out-of-domain input must be representable so it
/// can be rejected with a precise error instead of failing type
/// conversion upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetPatch {
    pub name: Option<String>,
    pub breed: Option<String>,
    /// Raw gender code; validated against `Gender::is_valid_code`.
    pub gender: Option<i64>,
    /// Raw weight; validated non-negative.
    pub weight: Option<i64>,
}

impl PetPatch {
    /// Returns true when no field is present.
    ///
    /// An empty patch short-circuits update to zero rows affected
    /// without a storage call.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.breed.is_none() && self.gender.is_none() && self.weight.is_none()
    }

    /// Validates this patch as a full insert payload.
    ///
    /// Rule order matches the write path contract: name first, then
    /// gender, then weight. Breed is never validated.
    pub fn validate_for_insert(&self) -> Result<(), PetValidationError> {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => {}
            _ => return Err(PetValidationError::NameRequired),
        }
        match self.gender {
            Some(code) if Gender::is_valid_code(code) => {}
            Some(code) => return Err(PetValidationError::GenderOutOfRange(code)),
            None => return Err(PetValidationError::GenderRequired),
        }
        if let Some(weight) = self.weight {
            if weight < 0 {
                return Err(PetValidationError::WeightNegative(weight));
            }
        }
        Ok(())
    }

    /// Validates this patch as a partial update payload.
    ///
    /// Only present fields are checked, with the same rules as insert.
    pub fn validate_for_update(&self) -> Result<(), PetValidationError> {
        if let Some(name) = self.name.as_deref() {
            if name.trim().is_empty() {
                return Err(PetValidationError::NameRequired);
            }
        }
        if let Some(code) = self.gender {
            if !Gender::is_valid_code(code) {
                return Err(PetValidationError::GenderOutOfRange(code));
            }
        }
        if let Some(weight) = self.weight {
            if weight < 0 {
                return Err(PetValidationError::WeightNegative(weight));
            }
        }
        Ok(())
    }
}

/// Field-level constraint violation detected before any write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetValidationError {
    /// Name absent or empty where a name is mandatory.
    NameRequired,
    /// Gender absent on insert.
    GenderRequired,
    /// Gender code supplied but outside the closed enumeration.
    GenderOutOfRange(i64),
    /// Weight supplied but negative.
    WeightNegative(i64),
}

impl Display for PetValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameRequired => write!(f, "pet requires a name"),
            Self::GenderRequired => write!(f, "pet requires a valid gender"),
            Self::GenderOutOfRange(code) => {
                write!(f, "pet requires a valid gender, got code {code}")
            }
            Self::WeightNegative(weight) => {
                write!(f, "pet requires a valid weight, got {weight}")
            }
        }
    }
}

impl Error for PetValidationError {}

#[cfg(test)]
mod tests {
    use super::{PetPatch, PetValidationError};

    fn full_patch() -> PetPatch {
        PetPatch {
            name: Some("Rex".to_string()),
            breed: Some("Labrador".to_string()),
            gender: Some(1),
            weight: Some(10),
        }
    }

    #[test]
    fn full_patch_passes_insert_validation() {
        assert_eq!(full_patch().validate_for_insert(), Ok(()));
    }

    #[test]
    fn insert_requires_name_first() {
        // Name is checked before gender, so a patch missing both
        // reports the name violation.
        let patch = PetPatch::default();
        assert_eq!(
            patch.validate_for_insert(),
            Err(PetValidationError::NameRequired)
        );
    }

    #[test]
    fn insert_rejects_blank_name() {
        let mut patch = full_patch();
        patch.name = Some("   ".to_string());
        assert_eq!(
            patch.validate_for_insert(),
            Err(PetValidationError::NameRequired)
        );
    }

    #[test]
    fn insert_rejects_out_of_domain_gender() {
        let mut patch = full_patch();
        patch.gender = Some(5);
        assert_eq!(
            patch.validate_for_insert(),
            Err(PetValidationError::GenderOutOfRange(5))
        );
    }

    #[test]
    fn insert_allows_absent_weight_and_breed() {
        let patch = PetPatch {
            name: Some("Mia".to_string()),
            breed: None,
            gender: Some(2),
            weight: None,
        };
        assert_eq!(patch.validate_for_insert(), Ok(()));
    }

    #[test]
    fn update_skips_absent_fields() {
        let patch = PetPatch {
            weight: Some(4),
            ..PetPatch::default()
        };
        assert_eq!(patch.validate_for_update(), Ok(()));
    }

    #[test]
    fn update_rejects_negative_weight() {
        let patch = PetPatch {
            weight: Some(-1),
            ..PetPatch::default()
        };
        assert_eq!(
            patch.validate_for_update(),
            Err(PetValidationError::WeightNegative(-1))
        );
    }

    #[test]
    fn empty_patch_is_empty() {
        assert!(PetPatch::default().is_empty());
        assert!(!full_patch().is_empty());
    }
}
