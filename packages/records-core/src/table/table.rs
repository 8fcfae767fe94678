//! Table storage for one entity type.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DbError;
use crate::model::Entity;

/// Rows of one entity type, soft-deleted rows included.
///
/// Rows keep insertion order so list results are stable across calls and
/// across snapshot reloads.
#[derive(Debug, Clone)]
pub struct Table<T> {
    rows: Vec<T>,
    index: HashMap<Uuid, usize>,
}

impl<T: Entity> Table<T> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Rebuilds a table from persisted rows.
    ///
    /// # Errors
    /// `DbError::DataCorruption` when two rows share a guid.
    pub fn from_rows(rows: Vec<T>) -> Result<Self, DbError> {
        let mut index = HashMap::with_capacity(rows.len());
        for (position, row) in rows.iter().enumerate() {
            if index.insert(row.guid(), position).is_some() {
                return Err(DbError::DataCorruption(format!(
                    "duplicate guid {} in table '{}'",
                    row.guid(),
                    T::TABLE
                )));
            }
        }
        Ok(Self { rows, index })
    }

    pub fn name(&self) -> &'static str {
        T::TABLE
    }

    /// All rows including soft-deleted ones, in insertion order.
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Live rows in insertion order.
    pub fn iter_live(&self) -> impl Iterator<Item = &T> {
        self.rows.iter().filter(|row| !row.is_deleted())
    }

    pub fn live_count(&self) -> usize {
        self.iter_live().count()
    }

    /// Inserts a new row after validating it.
    ///
    /// # Errors
    /// - `DbError::Validation` when the row breaks a field invariant
    /// - `DbError::Conflict` when its unique key is taken by a live row
    pub fn insert(&mut self, row: T) -> Result<&T, DbError> {
        row.validate()?;
        self.ensure_unique(&row)?;
        if self.index.contains_key(&row.guid()) {
            return Err(DbError::Conflict {
                table: T::TABLE,
                field: "guid",
                value: row.guid().to_string(),
            });
        }
        let position = self.rows.len();
        self.index.insert(row.guid(), position);
        self.rows.push(row);
        Ok(&self.rows[position])
    }

    /// Returns a live row by guid.
    pub fn get(&self, guid: Uuid) -> Result<&T, DbError> {
        self.index
            .get(&guid)
            .map(|&position| &self.rows[position])
            .filter(|row| !row.is_deleted())
            .ok_or_else(|| DbError::not_found(T::TABLE, guid))
    }

    /// Returns the live row whose unique key matches `value` (ASCII case-insensitive).
    pub fn find_by_unique(&self, value: &str) -> Result<&T, DbError> {
        self.iter_live()
            .find(|row| {
                row.unique_key()
                    .is_some_and(|(_, key)| key.eq_ignore_ascii_case(value))
            })
            .ok_or_else(|| DbError::not_found(T::TABLE, value))
    }

    /// Applies `change` to a copy of a live row and commits it only if the
    /// result is valid and still unique. `updated_at` is bumped on commit.
    pub fn update<F>(&mut self, guid: Uuid, now: DateTime<Utc>, change: F) -> Result<&T, DbError>
    where
        F: FnOnce(&mut T) -> Result<(), DbError>,
    {
        let position = self.live_position(guid)?;
        let mut candidate = self.rows[position].clone();
        change(&mut candidate)?;
        candidate.validate()?;
        self.ensure_unique(&candidate)?;
        candidate.envelope_mut().touch(now);
        self.rows[position] = candidate;
        Ok(&self.rows[position])
    }

    /// Marks a live row deleted. Deleting twice yields `NotFound`.
    pub fn soft_delete(&mut self, guid: Uuid, now: DateTime<Utc>) -> Result<(), DbError> {
        let position = self.live_position(guid)?;
        let envelope = self.rows[position].envelope_mut();
        envelope.is_deleted = true;
        envelope.touch(now);
        Ok(())
    }

    fn live_position(&self, guid: Uuid) -> Result<usize, DbError> {
        match self.index.get(&guid) {
            Some(&position) if !self.rows[position].is_deleted() => Ok(position),
            _ => Err(DbError::not_found(T::TABLE, guid)),
        }
    }

    fn ensure_unique(&self, candidate: &T) -> Result<(), DbError> {
        let Some((field, value)) = candidate.unique_key() else {
            return Ok(());
        };
        let taken = self.iter_live().any(|row| {
            row.guid() != candidate.guid()
                && row
                    .unique_key()
                    .is_some_and(|(_, other)| other.eq_ignore_ascii_case(value))
        });
        if taken {
            return Err(DbError::Conflict {
                table: T::TABLE,
                field,
                value: value.to_string(),
            });
        }
        Ok(())
    }
}

impl<T: Entity> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}
