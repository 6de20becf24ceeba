use std::fs;
use std::path::Path;

use plateread_core::NameplateRecord;

use crate::ExportError;

/// Write the records as a pretty-printed JSON array.
pub fn write_json_records(path: &Path, records: &[NameplateRecord]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extracted.json");

        let mut record = NameplateRecord {
            source_file: "tank.png".into(),
            manufacturer: "Ruud".into(),
            ..Default::default()
        };
        record.extra.insert("warranty".into(), "6 yr".into());

        write_json_records(&path, &[record.clone()]).unwrap();

        let data = fs::read_to_string(&path).unwrap();
        let back: Vec<NameplateRecord> = serde_json::from_str(&data).unwrap();
        assert_eq!(back, vec![record]);
    }

    #[test]
    fn empty_list_writes_an_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extracted.json");
        write_json_records(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }
}
