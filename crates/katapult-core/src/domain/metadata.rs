//! Metadata records attached to uploaded files

use serde::{Deserialize, Serialize};

/// Descriptive metadata for one file, keyed by its normalized base name
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub date: String,
    pub title: String,
    pub description: String,
}

impl MetadataRecord {
    #[must_use]
    pub fn new(
        date: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            title: title.into(),
            description: description.into(),
        }
    }

    /// Render the record as the description text stored on the remote node
    #[must_use]
    pub fn render_description(&self) -> String {
        format!(
            "Date: {}\n\nTitle: {}\n\nDescription: {}",
            self.date, self.title, self.description
        )
    }
}

/// Normalize a file base name into a metadata key (`.` folded to `_`)
#[must_use]
pub fn normalize_key(name: &str) -> String {
    name.replace('.', "_")
}

/// Strip leading zeros from every numeric `_`-separated segment
///
/// `2020_03_report` becomes `2020_3_report`. A segment made only of zeros
/// keeps a single `0`.
#[must_use]
pub fn strip_leading_zeros(key: &str) -> String {
    key.split('_')
        .map(|segment| {
            if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()) {
                let trimmed = segment.trim_start_matches('0');
                if trimmed.is_empty() {
                    "0".to_string()
                } else {
                    trimmed.to_string()
                }
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("_")
}
