use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed CSV column order. Any extra keys a record carries are appended
/// after these, in first-appearance order.
pub const PREFERRED_COLUMNS: &[&str] = &[
    "source_file",
    "manufacturer",
    "model_number",
    "serial_number",
    "capacity",
    "date_of_manufacture",
    "ocr_confidence",
    "rotation_deg",
];

/// One extracted record per successfully processed image.
///
/// All values are strings, possibly empty — a field the extractor could not
/// find is `""`, never an error. `ocr_confidence` is formatted to three
/// decimals, or empty when the engine reported no confidence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NameplateRecord {
    pub source_file: String,
    pub manufacturer: String,
    pub model_number: String,
    pub serial_number: String,
    pub capacity: String,
    pub date_of_manufacture: String,
    pub ocr_confidence: String,
    pub rotation_deg: String,
    /// Additional keys beyond the fixed schema; flattened into JSON output.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl NameplateRecord {
    /// Look up a value by column name, covering both fixed and extra keys.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "source_file" => Some(&self.source_file),
            "manufacturer" => Some(&self.manufacturer),
            "model_number" => Some(&self.model_number),
            "serial_number" => Some(&self.serial_number),
            "capacity" => Some(&self.capacity),
            "date_of_manufacture" => Some(&self.date_of_manufacture),
            "ocr_confidence" => Some(&self.ocr_confidence),
            "rotation_deg" => Some(&self.rotation_deg),
            other => self.extra.get(other).map(String::as_str),
        }
    }

    /// Keys beyond the fixed schema, in map order.
    pub fn extra_keys(&self) -> impl Iterator<Item = &str> {
        self.extra.keys().map(String::as_str)
    }
}
