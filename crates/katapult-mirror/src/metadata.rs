//! Metadata table loaded from a CSV file
//!
//! Each row is `key,date,title,description`. The key is a file base name
//! (extension stripped) with `.` folded to `_`. Rows with an empty key or
//! fewer than two fields are dropped. Missing trailing fields read as empty.

use std::collections::HashMap;
use std::path::Path;

use katapult_core::domain::metadata::{normalize_key, strip_leading_zeros};
use katapult_core::domain::MetadataRecord;
use tracing::{debug, info};

use crate::MirrorError;

/// Splits delimited text into records
///
/// Fields may be wrapped in double quotes; inside quotes the delimiter and
/// line breaks are literal and `""` is an escaped quote.
pub(crate) fn parse_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

/// Metadata records keyed by normalized base name
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    records: HashMap<String, MetadataRecord>,
}

impl MetadataTable {
    /// Load a `.csv` metadata file
    ///
    /// # Errors
    /// Returns `MirrorError::Metadata` if the extension is not `.csv`, and
    /// `MirrorError::Io` if the file cannot be read
    pub fn load(path: &Path) -> Result<Self, MirrorError> {
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case("csv"));
        if !is_csv {
            return Err(MirrorError::Metadata(format!(
                "Metadata file must be in .csv format: {}",
                path.display()
            )));
        }

        let text = std::fs::read_to_string(path)?;
        let table = Self::parse(&text);
        info!(path = %path.display(), records = table.len(), "Loaded metadata table");
        Ok(table)
    }

    /// Build a table from CSV text
    pub fn parse(text: &str) -> Self {
        let mut records = HashMap::new();
        for row in parse_records(text) {
            if row.len() < 2 || row[0].is_empty() {
                debug!(?row, "Dropping metadata row");
                continue;
            }
            let field = |i: usize| row.get(i).cloned().unwrap_or_default();
            records.insert(
                normalize_key(&row[0]),
                MetadataRecord::new(field(1), field(2), field(3)),
            );
        }
        Self { records }
    }

    /// Record for a file, by base name then by the leading-zero-stripped key
    ///
    /// `2020_03_report.pdf` is tried as `2020_03_report` and then as
    /// `2020_3_report`.
    pub fn lookup(&self, file_name: &str) -> Option<&MetadataRecord> {
        let key = normalize_key(base_name(file_name));
        self.records.get(&key).or_else(|| {
            let fallback = strip_leading_zeros(&key);
            if fallback == key {
                None
            } else {
                self.records.get(&fallback)
            }
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// File name without its last extension (`a.tar.gz` -> `a.tar`)
fn base_name(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}
