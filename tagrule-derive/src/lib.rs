// Procedural macros for tagrule
// `#[derive(Record)]` turns field attributes into a tagrule_core::Record impl

use proc_macro::TokenStream;

mod record;
mod rule_check;

/// Derives `tagrule_core::Record` and `tagrule_core::AsFieldValue`
///
/// Field attributes:
/// - `#[valid("funcVal:Required;funcVal:Email")]` - rule metadata
/// - `#[query("column")]` / `#[query("column,primary")]` - query metadata
/// - `#[record(rename = "name")]` - external name used in error text
/// - `#[serde(rename = "name")]` - honoured when `record(rename)` is absent
/// - `#[record(skip)]` - leave the field out of the record
///
/// Container attribute `#[record(strict_rules)]` checks every rule string at
/// compile time.
#[proc_macro_derive(Record, attributes(valid, query, record))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    record::derive_record_impl(input)
}
