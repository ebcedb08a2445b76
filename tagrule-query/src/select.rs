// SELECT statements

use crate::{ComposeQuery, QueryError, columns_of};
use tagrule_core::Record;
use tracing::trace;

/// `SELECT <columns> FROM <tables> WHERE <filter> ORDER BY <order> LIMIT n OFFSET m`
///
/// Clauses that were never set are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectQuery {
    columns: String,
    tables: String,
    filter: String,
    order: String,
    page: Option<(u64, u64)>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.columns = columns
            .into_iter()
            .map(|c| c.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        self
    }

    /// Columns declared by the record's `query` metadata
    pub fn columns_from(self, record: &dyn Record) -> Self {
        self.columns(columns_of(record))
    }

    /// Raw column clause, e.g. `count(*) AS total`
    pub fn column_clause(mut self, clause: impl Into<String>) -> Self {
        self.columns = clause.into();
        self
    }

    /// Tables joined as `FROM a, b`; an empty list is ignored
    pub fn tables(mut self, names: &[&str]) -> Self {
        if !names.is_empty() {
            self.tables = names.join(", ");
        }
        self
    }

    pub fn filter(mut self, clause: impl Into<String>) -> Self {
        self.filter = clause.into();
        self
    }

    pub fn order_by(mut self, clause: impl Into<String>) -> Self {
        self.order = clause.into();
        self
    }

    /// `LIMIT limit OFFSET (page - 1) * limit`; pages start at 1.
    ///
    /// An offset past `u64::MAX` is rejected by [`check`](ComposeQuery::check).
    pub fn paginate(mut self, page: u64, limit: u64) -> Self {
        self.page = Some((page, limit));
        self
    }

    fn offset(page: u64, limit: u64) -> Option<u64> {
        page.saturating_sub(1).checked_mul(limit)
    }
}

impl ComposeQuery for SelectQuery {
    fn compose(&self) -> String {
        let mut clauses = vec![format!("SELECT {}", self.columns)];
        if !self.tables.is_empty() {
            clauses.push(format!("FROM {}", self.tables));
        }
        if !self.filter.is_empty() {
            clauses.push(format!("WHERE {}", self.filter));
        }
        if !self.order.is_empty() {
            clauses.push(format!("ORDER BY {}", self.order));
        }
        if let Some((page, limit)) = self.page {
            let offset = Self::offset(page, limit).unwrap_or(u64::MAX);
            clauses.push(format!("LIMIT {} OFFSET {}", limit, offset));
        }

        let query = clauses.join(" ");
        trace!(query = %query, "composed select");
        query
    }

    fn check(&self) -> Result<(), QueryError> {
        if self.columns.is_empty() {
            return Err(QueryError::MissingColumns("select"));
        }
        if self.tables.is_empty() {
            return Err(QueryError::MissingTable("select from"));
        }
        if let Some((page, limit)) = self.page {
            Self::offset(page, limit).ok_or(QueryError::PageOutOfRange { page, limit })?;
        }
        Ok(())
    }
}
