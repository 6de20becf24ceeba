use std::fs;
use std::path::Path;

use crate::ExportError;

/// Write a raw text companion file, creating parent directories as needed.
pub fn write_text(path: &Path, content: &str) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
