// INSERT statements

use crate::{ComposeQuery, QueryError, columns_of};
use tagrule_core::Record;
use tracing::trace;

/// `INSERT INTO <table>( a, b ) VALUES ( ?,? )`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertQuery {
    columns: Vec<String>,
    table: String,
}

impl InsertQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.columns = columns.into_iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    /// Columns declared by the record's `query` metadata; primary columns
    /// are left out
    pub fn columns_from(self, record: &dyn Record) -> Self {
        self.columns(columns_of(record))
    }

    pub fn table(mut self, name: impl Into<String>) -> Self {
        self.table = name.into();
        self
    }
}

impl ComposeQuery for InsertQuery {
    fn compose(&self) -> String {
        let placeholders = vec!["?"; self.columns.len()].join(",");
        let query = format!(
            "INSERT INTO {}( {} ) VALUES ( {} )",
            self.table,
            self.columns.join(", "),
            placeholders
        );
        trace!(query = %query, "composed insert");
        query
    }

    fn check(&self) -> Result<(), QueryError> {
        if self.table.is_empty() {
            return Err(QueryError::MissingTable("insert into"));
        }
        if self.columns.is_empty() {
            return Err(QueryError::MissingColumns("insert"));
        }
        Ok(())
    }
}
