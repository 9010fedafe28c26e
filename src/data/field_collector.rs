use std::collections::BTreeSet;

use crate::data::record::Record;

/// Collect the union of field names across all records.
///
/// Output is sorted ascending and deduplicated so the column order is
/// stable for a given record set. Empty keys are skipped.
pub fn collect_fields(records: &[Record]) -> Vec<String> {
    let mut keys: BTreeSet<&str> = BTreeSet::new();
    for record in records {
        for key in record.fields.keys() {
            if !key.is_empty() {
                keys.insert(key.as_str());
            }
        }
    }

    let fields: Vec<String> = keys.into_iter().map(str::to_string).collect();
    tracing::debug!(target: "table", "Collected {} fields from {} records", fields.len(), records.len());
    fields
}
