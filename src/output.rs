//! Lineage document writer
//!
//! The document is an ordered JSON array of records. It is staged in a
//! temporary file next to the destination and renamed into place, so a
//! reader never sees a half-written document.

use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{LineageError, Result};
use crate::lineage::LineageRecord;

/// JSON formatting for the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Compact,
    Pretty,
}

impl DocumentFormat {
    pub fn from_pretty(pretty: bool) -> Self {
        if pretty {
            DocumentFormat::Pretty
        } else {
            DocumentFormat::Compact
        }
    }
}

/// Write `records` to `path` atomically
pub fn write_document(records: &[LineageRecord], path: &Path, format: DocumentFormat) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| {
        LineageError::Output(format!("Cannot create {}: {}", dir.display(), e))
    })?;

    let staged = NamedTempFile::new_in(dir)
        .map_err(|e| LineageError::Output(format!("Cannot stage document: {}", e)))?;

    {
        let mut writer = BufWriter::new(staged.as_file());
        serialize_into(&mut writer, records, format)?;
        writer
            .flush()
            .map_err(|e| LineageError::Output(format!("Cannot flush document: {}", e)))?;
    }

    staged.persist(path).map_err(|e| {
        LineageError::Output(format!("Cannot write {}: {}", path.display(), e.error))
    })?;

    tracing::info!(path = %path.display(), records = records.len(), "Lineage document written");
    Ok(())
}

/// Render the document to a string
pub fn render_document(records: &[LineageRecord], format: DocumentFormat) -> Result<String> {
    let mut buffer = Vec::new();
    serialize_into(&mut buffer, records, format)?;
    String::from_utf8(buffer).map_err(|e| LineageError::Output(e.to_string()))
}

fn serialize_into<W: Write, T: Serialize + ?Sized>(
    writer: W,
    value: &T,
    format: DocumentFormat,
) -> Result<()> {
    let result = match format {
        DocumentFormat::Compact => serde_json::to_writer(writer, value),
        DocumentFormat::Pretty => serde_json::to_writer_pretty(writer, value),
    };
    result.map_err(|e| LineageError::Output(format!("Cannot serialize document: {}", e)))
}
