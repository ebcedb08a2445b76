//! SQL statement composition for tagrule records
//!
//! Fields carry their column through `query` metadata (`column[,primary]`),
//! usually written with `#[query("...")]` on a `#[derive(Record)]` struct.
//! The builders here turn that metadata into `SELECT`, `INSERT` and `UPDATE`
//! statements with `?` placeholders.
//!
//! ```ignore
//! #[derive(Record)]
//! struct Agent {
//!     #[query("id,primary")]
//!     id: i64,
//!     #[query("name")]
//!     name: String,
//!     #[query("nis")]
//!     nis: String,
//! }
//!
//! let query = UpdateQuery::new()
//!     .columns_from(&agent)
//!     .tables(&["agents"])
//!     .filter("id=?")
//!     .compose();
//! assert_eq!(query, "UPDATE agents SET name = ?, nis = ? WHERE id=?");
//! ```

mod columns;
mod insert;
mod select;
mod update;

pub use columns::{columns_of, primary_columns_of};
pub use insert::InsertQuery;
pub use select::SelectQuery;
pub use update::UpdateQuery;

use thiserror::Error;

/// Reasons a statement cannot be composed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("no columns to {0}")]
    MissingColumns(&'static str),

    #[error("no table to {0}")]
    MissingTable(&'static str),

    #[error("UPDATE without a WHERE clause")]
    MissingFilter,

    #[error("page {page} of {limit} rows is past the largest offset")]
    PageOutOfRange { page: u64, limit: u64 },
}

/// Common behaviour of the statement builders
pub trait ComposeQuery {
    /// Render the statement
    fn compose(&self) -> String;

    /// Check the builder holds every clause its statement requires
    fn check(&self) -> Result<(), QueryError>;

    /// [`check`](ComposeQuery::check) then [`compose`](ComposeQuery::compose)
    fn try_compose(&self) -> Result<String, QueryError> {
        self.check()?;
        Ok(self.compose())
    }
}
