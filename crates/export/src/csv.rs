use std::collections::HashSet;
use std::fs;
use std::path::Path;

use plateread_core::{NameplateRecord, PREFERRED_COLUMNS};

use crate::ExportError;

/// The fixed preferred columns first, then any extra keys in order of first
/// appearance across the records.
pub fn infer_columns(records: &[NameplateRecord]) -> Vec<String> {
    let mut columns: Vec<String> = PREFERRED_COLUMNS.iter().map(|c| c.to_string()).collect();
    let mut seen: HashSet<String> = columns.iter().cloned().collect();
    for record in records {
        for key in record.extra_keys() {
            if seen.insert(key.to_string()) {
                columns.push(key.to_string());
            }
        }
    }
    columns
}

/// Write one CSV row per record, with missing keys as empty fields.
pub fn write_csv_records(path: &Path, records: &[NameplateRecord]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let columns = infer_columns(records);
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&columns)?;
    for record in records {
        let row: Vec<&str> = columns
            .iter()
            .map(|col| record.get(col).unwrap_or(""))
            .collect();
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}
