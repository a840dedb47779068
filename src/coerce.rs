use crate::data::FieldValue;

/// Columns holding dock-availability counts. Their raw values are unreliable,
/// so they are always stored as numbers.
pub const DEFAULT_DOCK_COLUMNS: [&str; 3] = [
    "Docks in Service",
    "Docks in Service_start",
    "Docks in Service_end",
];

/// Per-column numeric normalization applied while parsing
#[derive(Debug, Clone, PartialEq)]
pub struct CoercionPolicy {
    columns: Vec<String>,
}

impl Default for CoercionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_DOCK_COLUMNS.iter().map(|c| c.to_string()).collect())
    }
}

impl CoercionPolicy {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn applies_to(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Normalize one raw field.
    ///
    /// `raw` is `None` when the line was too short to reach this column.
    /// Returns `None` only for a missing value in a column outside the allow-list.
    pub fn coerce(&self, column: &str, raw: Option<&str>) -> Option<FieldValue> {
        if self.applies_to(column) {
            Some(FieldValue::Number(parse_count(raw.unwrap_or(""))))
        } else {
            raw.map(|v| FieldValue::Text(v.to_string()))
        }
    }
}

/// Missing, blank, non-numeric, NaN and infinite values all collapse to zero
fn parse_count(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}
