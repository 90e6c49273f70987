//! Elevation text reader.
//!
//! One grid row per line; samples separated by whitespace and/or commas.
//! Everything after `#` on a line is ignored, as are blank lines.
//!
//! ```text
//! # 3x2 grid
//! 0.0, 1.5, 2.0
//! 0.5  1.0  3.25
//! ```

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Parses elevation rows from text.
///
/// Row lengths are not checked here; the grid validation reports ragged
/// input with the row index.
pub fn parse_elevations(text: &str) -> Result<Vec<Vec<f64>>> {
    let mut rows = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let content = line.split('#').next().unwrap_or_default();
        let row = content
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<f64>()
                    .with_context(|| format!("line {}: invalid elevation '{token}'", number + 1))
            })
            .collect::<Result<Vec<f64>>>()?;
        if !row.is_empty() {
            rows.push(row);
        }
    }
    if rows.is_empty() {
        bail!("no elevation samples found");
    }
    Ok(rows)
}

/// Reads and parses an elevation file.
pub fn read_elevations(path: &Path) -> Result<Vec<Vec<f64>>> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parse_elevations(&text).with_context(|| format!("failed to parse {}", path.display()))
}
