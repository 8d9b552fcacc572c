//! Folder color map
//!
//! A `name,color` file assigning a Drive folder color (such as `#fad165`)
//! to directories by name. Directories without an entry are created
//! without a color.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::metadata::parse_records;
use crate::MirrorError;

#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    colors: HashMap<String, String>,
}

impl ColorMap {
    /// Load a color map file
    pub fn load(path: &Path) -> Result<Self, MirrorError> {
        let text = std::fs::read_to_string(path)?;
        let map = Self::parse(&text);
        info!(path = %path.display(), entries = map.colors.len(), "Loaded color map");
        Ok(map)
    }

    /// Build a map from `name,color` text; malformed rows are skipped
    pub fn parse(text: &str) -> Self {
        let colors = parse_records(text)
            .into_iter()
            .filter_map(|row| match row.as_slice() {
                [name, color, ..] if !name.trim().is_empty() && !color.trim().is_empty() => {
                    Some((name.trim().to_string(), color.trim().to_string()))
                }
                _ => None,
            })
            .collect();
        Self { colors }
    }

    /// Color for a directory, if any
    pub fn color_for(&self, dir_name: &str) -> Option<&str> {
        let color = self.colors.get(dir_name).map(String::as_str);
        if color.is_none() {
            debug!(dir_name, "No color mapped");
        }
        color
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
