use std::collections::HashSet;

use crate::domain::entities::query::FileId;

pub mod csv;
pub mod xlsx;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResult {
    pub dataset_id: FileId,
    pub name: String,
    pub row_count: i64,
}

/// Makes header names non-empty and unique: blanks become `Column N`,
/// repeats get ` (2)`, ` (3)`, ... suffixes.
pub fn normalize_headers<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut headers = Vec::with_capacity(raw.len());
    for (idx, name) in raw.iter().enumerate() {
        let trimmed = name.as_ref().trim();
        let base = if trimmed.is_empty() {
            format!("Column {}", idx + 1)
        } else {
            trimmed.to_string()
        };

        let mut candidate = base.clone();
        let mut suffix = 2;
        while !seen.insert(candidate.clone()) {
            candidate = format!("{base} ({suffix})");
            suffix += 1;
        }
        headers.push(candidate);
    }
    headers
}

/// Pads short rows with `""` and truncates long ones to `width`.
pub fn fit_row(mut row: Vec<String>, width: usize) -> Vec<String> {
    row.resize(width, String::new());
    row
}
