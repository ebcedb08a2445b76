// UPDATE statements

use crate::{ComposeQuery, QueryError, columns_of};
use tagrule_core::Record;
use tracing::trace;

/// `UPDATE <tables> SET a = ?, b = ? WHERE <filter>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateQuery {
    assignments: Vec<String>,
    tables: String,
    filter: String,
}

impl UpdateQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// One `column = ?` assignment per column
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.assignments = columns
            .into_iter()
            .map(|c| format!("{} = ?", c.as_ref()))
            .collect();
        self
    }

    /// Columns declared by the record's `query` metadata; primary columns
    /// are left out
    pub fn columns_from(self, record: &dyn Record) -> Self {
        self.columns(columns_of(record))
    }

    pub fn tables(mut self, names: &[&str]) -> Self {
        self.tables = names.join(",");
        self
    }

    pub fn filter(mut self, clause: impl Into<String>) -> Self {
        self.filter = clause.into();
        self
    }
}

impl ComposeQuery for UpdateQuery {
    fn compose(&self) -> String {
        let mut query = format!("UPDATE {} SET {}", self.tables, self.assignments.join(", "));
        if !self.filter.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.filter);
        }
        trace!(query = %query, "composed update");
        query
    }

    fn check(&self) -> Result<(), QueryError> {
        if self.tables.is_empty() {
            return Err(QueryError::MissingTable("update"));
        }
        if self.assignments.is_empty() {
            return Err(QueryError::MissingColumns("update"));
        }
        if self.filter.is_empty() {
            return Err(QueryError::MissingFilter);
        }
        Ok(())
    }
}
