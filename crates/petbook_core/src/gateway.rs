//! URI-routed CRUD gateway over the pet table.
//!
//! # Responsibility
//! - Resolve resource identifiers and dispatch query/insert/update/delete
//!   and content-type resolution against the pet table.
//! - Enforce field validation before any storage mutation.
//! - Publish change notifications for successful mutations.
//!
//! # Invariants
//! - Item-shaped URIs always bind the row id as a SQL parameter; caller
//!   selections are ignored on the item path.
//! - Validation completes fully before any write; a rejected call leaves
//!   storage untouched.
//! - Each successful mutating call publishes at most one notification.

use crate::db::DbError;
use crate::model::pet::{Pet, PetPatch, PetValidationError};
use crate::notify::{ChangeChannel, ChangeHub, Subscription};
use crate::schema::{
    Gender, COL_BREED, COL_GENDER, COL_ID, COL_NAME, COL_WEIGHT, CONTENT_TYPE_ITEM,
    CONTENT_TYPE_LIST, TABLE_PETS,
};
use crate::uri::{resolve, ContentUri, UriMatch};
use log::error;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::Arc;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failure taxonomy of the access gateway.
#[derive(Debug)]
pub enum GatewayError {
    /// URI matched neither registered pattern. Retrying with the same
    /// URI cannot succeed.
    Routing(ContentUri),
    /// Operation is not defined for the resolved URI shape.
    Unsupported {
        operation: &'static str,
        uri: ContentUri,
    },
    /// A field failed its domain constraint. Caller-fixable; no write
    /// occurred.
    Validation(PetValidationError),
    /// Storage reported failure distinct from "zero rows matched":
    /// an insert that assigned no row id.
    Persistence(ContentUri),
    /// Content-type resolution against an unrecognized URI. A
    /// programming or configuration error rather than bad input.
    IllegalState(ContentUri),
    /// A persisted row or cursor projection could not be decoded.
    InvalidData(String),
    /// Transport-level storage error.
    Db(DbError),
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Routing(uri) => write!(f, "unknown pet URI {uri}"),
            Self::Unsupported { operation, uri } => {
                write!(f, "{operation} is not supported for {uri}")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::Persistence(uri) => write!(f, "failed to insert row for {uri}"),
            Self::IllegalState(uri) => write!(f, "no content type for unknown URI {uri}"),
            Self::InvalidData(message) => write!(f, "invalid persisted pet data: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PetValidationError> for GatewayError {
    fn from(value: PetValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for GatewayError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for GatewayError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Result of a gateway query: the materialized rows plus the watcher
/// registered against the queried URI, so the caller learns when the
/// underlying data changes and can re-run the query.
#[derive(Debug)]
pub struct PetCursor {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    subscription: Subscription,
}

impl PetCursor {
    /// Column names in projection order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows in the cursor.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell value by row index and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|name| name == column)?;
        self.rows.get(row)?.get(index)
    }

    /// The change watcher registered when this cursor was produced.
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// URI whose changes invalidate this cursor.
    pub fn notification_uri(&self) -> &ContentUri {
        self.subscription.uri()
    }

    /// Decodes the cursor into typed records.
    ///
    /// Requires the projection to cover the full pet column set; a
    /// narrower projection yields `InvalidData`.
    pub fn to_pets(&self) -> GatewayResult<Vec<Pet>> {
        let index_of = |column: &str| {
            self.columns
                .iter()
                .position(|name| name == column)
                .ok_or_else(|| {
                    GatewayError::InvalidData(format!("cursor projection is missing `{column}`"))
                })
        };
        let id_at = index_of(COL_ID)?;
        let name_at = index_of(COL_NAME)?;
        let breed_at = index_of(COL_BREED)?;
        let gender_at = index_of(COL_GENDER)?;
        let weight_at = index_of(COL_WEIGHT)?;

        self.rows
            .iter()
            .map(|row| {
                let id = integer_cell(row, id_at, COL_ID)?;
                let name = match &row[name_at] {
                    Value::Text(text) => text.clone(),
                    other => {
                        return Err(invalid_cell(COL_NAME, other));
                    }
                };
                let breed = match &row[breed_at] {
                    Value::Text(text) => Some(text.clone()),
                    Value::Null => None,
                    other => {
                        return Err(invalid_cell(COL_BREED, other));
                    }
                };
                let gender_code = integer_cell(row, gender_at, COL_GENDER)?;
                let gender = Gender::from_code(gender_code).ok_or_else(|| {
                    GatewayError::InvalidData(format!(
                        "invalid gender code `{gender_code}` in {TABLE_PETS}.{COL_GENDER}"
                    ))
                })?;
                let weight = integer_cell(row, weight_at, COL_WEIGHT)?;

                Ok(Pet {
                    id,
                    name,
                    breed,
                    gender,
                    weight,
                })
            })
            .collect()
    }
}

fn integer_cell(row: &[Value], index: usize, column: &str) -> GatewayResult<i64> {
    match &row[index] {
        Value::Integer(value) => Ok(*value),
        other => Err(invalid_cell(column, other)),
    }
}

fn invalid_cell(column: &str, value: &Value) -> GatewayError {
    GatewayError::InvalidData(format!(
        "unexpected {value:?} in {TABLE_PETS}.{column}"
    ))
}

/// CRUD gateway owning the storage handle and the notification channel.
///
/// One gateway instance owns one connection for its whole lifetime;
/// read/write serialization is delegated to SQLite. All calls are
/// synchronous request/response with no internal retries.
pub struct PetGateway<C: ChangeChannel = ChangeHub> {
    conn: Connection,
    channel: Arc<C>,
}

impl PetGateway<ChangeHub> {
    /// Opens the database file and wires a fresh in-process hub.
    pub fn open(path: impl AsRef<Path>) -> GatewayResult<Self> {
        let conn = crate::db::open_db(path)?;
        Ok(Self::new(conn, Arc::new(ChangeHub::new())))
    }

    /// In-memory gateway with a fresh hub, for tests and throwaway use.
    pub fn open_in_memory() -> GatewayResult<Self> {
        let conn = crate::db::open_db_in_memory()?;
        Ok(Self::new(conn, Arc::new(ChangeHub::new())))
    }
}

impl<C: ChangeChannel> PetGateway<C> {
    /// Builds a gateway from an already-bootstrapped connection.
    pub fn new(conn: Connection, channel: Arc<C>) -> Self {
        Self { conn, channel }
    }

    /// The notification channel mutations publish to.
    pub fn channel(&self) -> &Arc<C> {
        &self.channel
    }

    /// Runs a filtered/sorted read against the resolved URI.
    ///
    /// Collection URIs apply `selection`/`selection_args`/`sort_order`
    /// as given. Item URIs force `_id = ?` with the URI's trailing id
    /// and ignore any caller-supplied selection. The returned cursor is
    /// subscribed to the queried URI.
    pub fn query(
        &self,
        uri: &ContentUri,
        projection: Option<&[&str]>,
        selection: Option<&str>,
        selection_args: &[Value],
        sort_order: Option<&str>,
    ) -> GatewayResult<PetCursor> {
        let (filter, binds) = match resolve(uri) {
            UriMatch::Collection => (
                selection.map(str::to_string),
                selection_args.to_vec(),
            ),
            UriMatch::Item(id) => (
                Some(format!("{COL_ID} = ?")),
                vec![Value::Integer(id)],
            ),
            UriMatch::NoMatch => return Err(GatewayError::Routing(uri.clone())),
        };

        let column_list = match projection {
            Some(columns) if !columns.is_empty() => columns.join(", "),
            _ => "*".to_string(),
        };

        let mut sql = format!("SELECT {column_list} FROM {TABLE_PETS}");
        if let Some(filter) = &filter {
            sql.push_str(" WHERE ");
            sql.push_str(filter);
        }
        if let Some(order) = sort_order {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let column_count = columns.len();

        let mut rows = Vec::new();
        let mut raw_rows = stmt.query(params_from_iter(binds))?;
        while let Some(row) = raw_rows.next()? {
            let mut record = Vec::with_capacity(column_count);
            for index in 0..column_count {
                record.push(row.get::<_, Value>(index)?);
            }
            rows.push(record);
        }

        Ok(PetCursor {
            columns,
            rows,
            subscription: self.channel.subscribe(uri),
        })
    }

    /// Inserts one pet through the collection URI.
    ///
    /// Item and unmatched URIs are rejected as unsupported. On success
    /// the collection URI is published and the new item URI returned.
    pub fn insert(&self, uri: &ContentUri, values: &PetPatch) -> GatewayResult<ContentUri> {
        match resolve(uri) {
            UriMatch::Collection => self.insert_pet(uri, values),
            UriMatch::Item(_) | UriMatch::NoMatch => Err(GatewayError::Unsupported {
                operation: "insert",
                uri: uri.clone(),
            }),
        }
    }

    fn insert_pet(&self, uri: &ContentUri, values: &PetPatch) -> GatewayResult<ContentUri> {
        values.validate_for_insert()?;
        let Some(name) = values.name.as_deref() else {
            return Err(PetValidationError::NameRequired.into());
        };
        let Some(gender) = values.gender else {
            return Err(PetValidationError::GenderRequired.into());
        };

        let mut columns = vec![COL_NAME, COL_GENDER];
        let mut binds = vec![Value::Text(name.to_string()), Value::Integer(gender)];
        if let Some(breed) = &values.breed {
            columns.push(COL_BREED);
            binds.push(Value::Text(breed.clone()));
        }
        // Absent weight falls through to the storage default of 0.
        if let Some(weight) = values.weight {
            columns.push(COL_WEIGHT);
            binds.push(Value::Integer(weight));
        }

        let placeholders = vec!["?"; binds.len()].join(", ");
        let sql = format!(
            "INSERT INTO {TABLE_PETS} ({}) VALUES ({placeholders});",
            columns.join(", ")
        );
        let changed = self.conn.execute(&sql, params_from_iter(binds))?;
        let id = self.conn.last_insert_rowid();
        if changed == 0 || id <= 0 {
            error!(
                "event=pet_insert module=gateway status=error error_code=row_id_unassigned uri={uri}"
            );
            return Err(GatewayError::Persistence(uri.clone()));
        }

        self.channel.publish(uri);
        Ok(uri.with_appended_id(id))
    }

    /// Applies a partial update to the resolved URI.
    ///
    /// Only fields present in `values` are validated and written. An
    /// empty patch returns 0 without touching storage. A positive row
    /// count publishes the URI exactly as the caller supplied it.
    pub fn update(
        &self,
        uri: &ContentUri,
        values: &PetPatch,
        selection: Option<&str>,
        selection_args: &[Value],
    ) -> GatewayResult<usize> {
        let (filter, filter_binds) = match resolve(uri) {
            UriMatch::Collection => (
                selection.map(str::to_string),
                selection_args.to_vec(),
            ),
            UriMatch::Item(id) => (
                Some(format!("{COL_ID} = ?")),
                vec![Value::Integer(id)],
            ),
            UriMatch::NoMatch => return Err(GatewayError::Routing(uri.clone())),
        };

        values.validate_for_update()?;

        if values.is_empty() {
            return Ok(0);
        }

        let mut assignments = Vec::new();
        let mut binds = Vec::new();
        if let Some(name) = &values.name {
            assignments.push(format!("{COL_NAME} = ?"));
            binds.push(Value::Text(name.clone()));
        }
        if let Some(breed) = &values.breed {
            assignments.push(format!("{COL_BREED} = ?"));
            binds.push(Value::Text(breed.clone()));
        }
        if let Some(gender) = values.gender {
            assignments.push(format!("{COL_GENDER} = ?"));
            binds.push(Value::Integer(gender));
        }
        if let Some(weight) = values.weight {
            assignments.push(format!("{COL_WEIGHT} = ?"));
            binds.push(Value::Integer(weight));
        }

        let mut sql = format!("UPDATE {TABLE_PETS} SET {}", assignments.join(", "));
        if let Some(filter) = &filter {
            sql.push_str(" WHERE ");
            sql.push_str(filter);
        }
        binds.extend(filter_binds);

        let changed = self.conn.execute(&sql, params_from_iter(binds))?;
        if changed > 0 {
            self.channel.publish(uri);
        }
        Ok(changed)
    }

    /// Deletes rows at the resolved URI.
    ///
    /// Item URIs force `_id = ?` and publish the item URI when rows were
    /// removed. Collection deletes apply the caller selection as given.
    pub fn delete(
        &self,
        uri: &ContentUri,
        selection: Option<&str>,
        selection_args: &[Value],
    ) -> GatewayResult<usize> {
        match resolve(uri) {
            UriMatch::Collection => {
                let mut sql = format!("DELETE FROM {TABLE_PETS}");
                if let Some(filter) = selection {
                    sql.push_str(" WHERE ");
                    sql.push_str(filter);
                }
                let changed = self
                    .conn
                    .execute(&sql, params_from_iter(selection_args.to_vec()))?;
                // TODO: bulk deletes do not wake collection watchers,
                // unlike item deletes; decide whether to publish here.
                Ok(changed)
            }
            UriMatch::Item(id) => {
                let changed = self.conn.execute(
                    &format!("DELETE FROM {TABLE_PETS} WHERE {COL_ID} = ?"),
                    [Value::Integer(id)],
                )?;
                if changed != 0 {
                    self.channel.publish(uri);
                }
                Ok(changed)
            }
            UriMatch::NoMatch => Err(GatewayError::Routing(uri.clone())),
        }
    }

    /// Resolves the MIME type for a URI shape.
    pub fn resolve_type(&self, uri: &ContentUri) -> GatewayResult<&'static str> {
        match resolve(uri) {
            UriMatch::Collection => Ok(CONTENT_TYPE_LIST),
            UriMatch::Item(_) => Ok(CONTENT_TYPE_ITEM),
            UriMatch::NoMatch => Err(GatewayError::IllegalState(uri.clone())),
        }
    }
}
