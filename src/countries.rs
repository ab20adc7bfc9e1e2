use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONTINENT: &str = "Unknown";

/// One row of the input table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryRow {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub continent: Option<String>,
    #[serde(default)]
    pub flag: Option<String>,
}

impl CountryRow {
    /// Included only when the flag is exactly "Y" after trimming (any case).
    pub fn is_included(&self) -> bool {
        self.flag_value() == "Y"
    }

    /// Normalised flag for logging; a missing flag reads as "N".
    pub fn flag_value(&self) -> String {
        match self.flag.as_deref().map(str::trim) {
            Some(f) if !f.is_empty() => f.to_uppercase(),
            _ => "N".to_string(),
        }
    }

    pub fn name(&self) -> &str {
        self.country.trim()
    }

    /// Category folder; the table's value wins over anything the model says.
    pub fn continent(&self) -> &str {
        match self.continent.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => DEFAULT_CONTINENT,
        }
    }
}

/// Read every row of the input CSV. Columns beyond country/continent/flag are ignored.
pub fn read_rows(path: &Path) -> Result<Vec<CountryRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}
