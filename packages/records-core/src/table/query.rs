//! Pagination over live rows.

use super::Table;
use crate::model::Entity;

/// Limit/offset window for list operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Maximum number of rows to return (`None` = all)
    pub limit: Option<usize>,
    /// Number of live rows to skip
    pub offset: usize,
}

impl<T: Entity> Table<T> {
    /// Lists live rows inside the window, in insertion order.
    pub fn list(&self, query: &ListQuery) -> Vec<&T> {
        self.list_where(query, |_| true)
    }

    /// Lists live rows matching `predicate`, then applies the window.
    pub fn list_where<P>(&self, query: &ListQuery, predicate: P) -> Vec<&T>
    where
        P: Fn(&T) -> bool,
    {
        let matching = self
            .iter_live()
            .filter(|row| predicate(row))
            .skip(query.offset);
        match query.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        }
    }
}
