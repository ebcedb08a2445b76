// Column extraction from record query metadata

use tagrule_core::{FieldValue, Record};

const PRIMARY_MARKER: &str = "primary";

/// Column names declared by a record's `query` metadata, in field order.
///
/// Metadata has the form `column[,primary]`. Primary columns, fields without
/// metadata and nested record or list fields are left out.
pub fn columns_of(record: &dyn Record) -> Vec<&str> {
    record
        .fields()
        .into_iter()
        .filter(|field| !matches!(field.value, FieldValue::Record(_) | FieldValue::List(_)))
        .filter_map(|field| {
            if field.query.is_empty() {
                return None;
            }
            let mut parts = field.query.split(',');
            let column = parts.next()?;
            match parts.next() {
                Some(PRIMARY_MARKER) => None,
                _ => Some(column),
            }
        })
        .collect()
}

/// Primary columns declared by a record, in field order
pub fn primary_columns_of(record: &dyn Record) -> Vec<&str> {
    record
        .fields()
        .into_iter()
        .filter_map(|field| {
            let (column, marker) = field.query.split_once(',')?;
            (marker.split(',').next() == Some(PRIMARY_MARKER)).then_some(column)
        })
        .collect()
}
