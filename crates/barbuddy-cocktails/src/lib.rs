//! Cocktail records for BarBuddy.
//!
//! Implements the cocktail model, its wire representation, and the CRUD
//! operations the HTTP layer runs inside a per-request transaction. All
//! functions take a plain `&Connection` so callers decide the transaction
//! boundary.

mod schema;

pub use schema::cocktail_schema;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors that can occur during cocktail operations.
#[derive(Debug, Error)]
pub enum CocktailError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("cocktail not found: {0}")]
    NotFound(i64),
}

/// A stored cocktail, serialized with every field (`author_id` as `null`
/// when unset).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cocktail {
    /// Store-assigned identifier; never changes after creation.
    pub id: i64,
    pub cocktailname: String,
    pub description: String,
    pub location: String,
    pub rating: i64,
    /// Owning user, if any. No endpoint sets this yet.
    pub author_id: Option<i64>,
}

/// The four mutable fields accepted on create and on full replacement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CocktailPayload {
    pub cocktailname: String,
    pub description: String,
    pub location: String,
    #[serde(deserialize_with = "whole_number")]
    pub rating: i64,
}

/// Reads an `i64` from any JSON number without a fractional part, so `5.0`
/// is accepted wherever the `"integer"` schema type accepts it.
fn whole_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(n) = number.as_i64() {
        return Ok(n);
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
        _ => Err(de::Error::custom(format!(
            "{number} is not a whole number in the supported range"
        ))),
    }
}

/// Optional substring filters for listing; all present filters must match.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct CocktailFilters {
    pub cocktailname_like: Option<String>,
    pub description_like: Option<String>,
    pub location_like: Option<String>,
}

impl CocktailFilters {
    /// Column/needle pairs for the filters that are set and non-empty.
    fn active(&self) -> Vec<(&'static str, &str)> {
        [
            ("cocktailname", self.cocktailname_like.as_deref()),
            ("description", self.description_like.as_deref()),
            ("location", self.location_like.as_deref()),
        ]
        .into_iter()
        .filter_map(|(column, needle)| match needle {
            Some(n) if !n.is_empty() => Some((column, n)),
            _ => None,
        })
        .collect()
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, cocktailname, description, location, rating, author_id FROM cocktails";

/// Inserts a new cocktail and returns it with its assigned id.
pub fn create_cocktail(
    conn: &Connection,
    payload: &CocktailPayload,
) -> Result<Cocktail, CocktailError> {
    conn.execute(
        "INSERT INTO cocktails (cocktailname, description, location, rating)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            payload.cocktailname,
            payload.description,
            payload.location,
            payload.rating,
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!(cocktail_id = id, "cocktail created");
    get_cocktail(conn, id)
}

/// Retrieves a cocktail by id.
pub fn get_cocktail(conn: &Connection, id: i64) -> Result<Cocktail, CocktailError> {
    conn.query_row(
        &format!("{SELECT_COLUMNS} WHERE id = ?1"),
        [id],
        map_row_to_cocktail,
    )
    .optional()?
    .ok_or(CocktailError::NotFound(id))
}

/// Lists cocktails matching `filters`, ordered by ascending id.
///
/// Matching is a plain substring test through SQLite `LIKE`, so its case
/// sensitivity is whatever the store provides (ASCII case-insensitive by
/// default). `%` and `_` in a needle match literally.
pub fn list_cocktails(
    conn: &Connection,
    filters: &CocktailFilters,
) -> Result<Vec<Cocktail>, CocktailError> {
    let active = filters.active();

    let mut sql = SELECT_COLUMNS.to_string();
    let mut patterns = Vec::with_capacity(active.len());
    for (idx, (column, needle)) in active.iter().enumerate() {
        sql.push_str(if idx == 0 { " WHERE " } else { " AND " });
        sql.push_str(&format!("{column} LIKE ?{} ESCAPE '\\'", idx + 1));
        patterns.push(format!("%{}%", escape_like(needle)));
    }
    sql.push_str(" ORDER BY id ASC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(patterns.iter()), map_row_to_cocktail)?;
    let mut cocktails = Vec::new();
    for row in rows {
        cocktails.push(row?);
    }
    Ok(cocktails)
}

/// Overwrites all four mutable fields of an existing cocktail.
///
/// Nothing from the previous version is kept; `id` and `author_id` are
/// untouched.
pub fn update_cocktail(
    conn: &Connection,
    id: i64,
    payload: &CocktailPayload,
) -> Result<Cocktail, CocktailError> {
    let count = conn.execute(
        "UPDATE cocktails
         SET cocktailname = ?1, description = ?2, location = ?3, rating = ?4
         WHERE id = ?5",
        params![
            payload.cocktailname,
            payload.description,
            payload.location,
            payload.rating,
            id,
        ],
    )?;
    if count == 0 {
        return Err(CocktailError::NotFound(id));
    }
    get_cocktail(conn, id)
}

/// Deletes a cocktail.
pub fn delete_cocktail(conn: &Connection, id: i64) -> Result<(), CocktailError> {
    let count = conn.execute("DELETE FROM cocktails WHERE id = ?1", [id])?;
    if count == 0 {
        return Err(CocktailError::NotFound(id));
    }
    tracing::debug!(cocktail_id = id, "cocktail deleted");
    Ok(())
}

fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn map_row_to_cocktail(row: &Row) -> rusqlite::Result<Cocktail> {
    Ok(Cocktail {
        id: row.get(0)?,
        cocktailname: row.get(1)?,
        description: row.get(2)?,
        location: row.get(3)?,
        rating: row.get(4)?,
        author_id: row.get(5)?,
    })
}
