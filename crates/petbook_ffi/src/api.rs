//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level pet CRUD functions to Dart via FRB.
//! - Keep error semantics simple for UI integration: envelopes, never
//!   exceptions.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - One process-wide database path, resolved once.

use petbook_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    resolve, ContentUri, Gender, PetGateway, PetPatch, UriMatch,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const PET_LIST_DEFAULT_LIMIT: u32 = 25;
const PET_LIST_LIMIT_MAX: u32 = 100;
const PET_DB_FILE_NAME: &str = petbook_core::schema::DB_FILE_NAME;
static PET_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One pet row shaped for list display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetListItem {
    pub id: i64,
    pub name: String,
    pub breed: Option<String>,
    /// Gender label (`unknown|male|female`).
    pub gender: String,
    pub weight: i64,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetListResponse {
    /// Pets newest-first (empty when the store is empty or on failure).
    pub items: Vec<PetListItem>,
    /// Human-readable response message for diagnostics.
    pub message: String,
    /// Effective applied list limit.
    pub applied_limit: u32,
}

/// Generic action response envelope for pet mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Row id the operation touched or created.
    pub pet_id: Option<i64>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl PetActionResponse {
    fn success(message: impl Into<String>, pet_id: i64) -> Self {
        Self {
            ok: true,
            pet_id: Some(pet_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            pet_id: None,
            message: message.into(),
        }
    }
}

/// Lists stored pets up to a normalized limit.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; failures surface in `message` with empty items.
#[flutter_rust_bridge::frb(sync)]
pub fn list_pets(limit: Option<u32>) -> PetListResponse {
    let applied_limit = normalize_list_limit(limit);
    let listed = with_gateway(|gateway| {
        let cursor = gateway.query(&ContentUri::collection(), None, None, &[], Some("_id DESC"))?;
        cursor.to_pets()
    });

    match listed {
        Ok(pets) => {
            let mut items: Vec<PetListItem> = pets.into_iter().map(to_list_item).collect();
            items.truncate(applied_limit as usize);
            let message = if items.is_empty() {
                "No pets yet.".to_string()
            } else {
                format!("Found {} pet(s).", items.len())
            };
            PetListResponse {
                items,
                message,
                applied_limit,
            }
        }
        Err(err) => PetListResponse {
            items: Vec::new(),
            message: format!("list_pets failed: {err}"),
            applied_limit,
        },
    }
}

/// Records a new pet.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; validation failures return `ok=false` with the rule
///   message.
#[flutter_rust_bridge::frb(sync)]
pub fn add_pet(
    name: String,
    breed: Option<String>,
    gender_code: i64,
    weight: Option<i64>,
) -> PetActionResponse {
    let patch = PetPatch {
        name: Some(name.trim().to_string()),
        breed,
        gender: Some(gender_code),
        weight,
    };
    let inserted = with_gateway(|gateway| gateway.insert(&ContentUri::collection(), &patch));

    match inserted {
        Ok(item_uri) => match resolve(&item_uri) {
            UriMatch::Item(id) => PetActionResponse::success("Pet saved.", id),
            _ => PetActionResponse::failure(format!("unexpected insert result URI {item_uri}")),
        },
        Err(err) => PetActionResponse::failure(format!("add_pet failed: {err}")),
    }
}

/// Applies a partial update to one pet.
///
/// Absent fields are left untouched; present fields are validated with
/// the same rules as `add_pet`.
#[flutter_rust_bridge::frb(sync)]
pub fn update_pet(
    id: i64,
    name: Option<String>,
    breed: Option<String>,
    gender_code: Option<i64>,
    weight: Option<i64>,
) -> PetActionResponse {
    let patch = PetPatch {
        name,
        breed,
        gender: gender_code,
        weight,
    };
    match with_gateway(|gateway| gateway.update(&ContentUri::item(id), &patch, None, &[])) {
        Ok(changed) => PetActionResponse::success(format!("Updated {changed} pet(s)."), id),
        Err(err) => PetActionResponse::failure(format!("update_pet failed: {err}")),
    }
}

/// Deletes one pet by id. Deleting an absent id is not an error.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_pet(id: i64) -> PetActionResponse {
    match with_gateway(|gateway| gateway.delete(&ContentUri::item(id), None, &[])) {
        Ok(removed) => PetActionResponse::success(format!("Removed {removed} pet(s)."), id),
        Err(err) => PetActionResponse::failure(format!("delete_pet failed: {err}")),
    }
}

/// Resolves the MIME type of a pet URI, `None` for unrecognized ones.
///
/// Pure routing; never touches the database.
#[flutter_rust_bridge::frb(sync)]
pub fn pet_content_type(uri: String) -> Option<String> {
    match resolve(&ContentUri::new(uri)) {
        UriMatch::Collection => Some(petbook_core::schema::CONTENT_TYPE_LIST.to_string()),
        UriMatch::Item(_) => Some(petbook_core::schema::CONTENT_TYPE_ITEM.to_string()),
        UriMatch::NoMatch => None,
    }
}

fn normalize_list_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) => PET_LIST_DEFAULT_LIMIT,
        Some(value) if value > PET_LIST_LIMIT_MAX => PET_LIST_LIMIT_MAX,
        Some(value) => value,
        None => PET_LIST_DEFAULT_LIMIT,
    }
}

fn resolve_db_path() -> PathBuf {
    PET_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("PETBOOK_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(PET_DB_FILE_NAME)
        })
        .clone()
}

fn with_gateway<T>(
    f: impl FnOnce(&PetGateway) -> petbook_core::GatewayResult<T>,
) -> Result<T, String> {
    let db_path = resolve_db_path();
    let gateway = PetGateway::open(&db_path).map_err(|err| format!("pet DB open failed: {err}"))?;
    f(&gateway).map_err(|err| err.to_string())
}

fn to_list_item(pet: petbook_core::Pet) -> PetListItem {
    PetListItem {
        id: pet.id,
        name: pet.name,
        breed: pet.breed,
        gender: gender_label(pet.gender).to_string(),
        weight: pet.weight,
    }
}

fn gender_label(gender: Gender) -> &'static str {
    match gender {
        Gender::Unknown => "unknown",
        Gender::Male => "male",
        Gender::Female => "female",
    }
}
