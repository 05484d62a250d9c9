use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub i64);

impl From<i64> for FileId {
    fn from(value: i64) -> Self {
        FileId(value)
    }
}

impl From<FileId> for i64 {
    fn from(value: FileId) -> Self {
        value.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Free-text search over every cell. Empty text matches all rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSpec {
    pub text: String,
}

impl SearchSpec {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Per-column substring patterns. Entries with an empty pattern are inactive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    patterns: BTreeMap<String, String>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.set(column, pattern);
        self
    }

    pub fn set(&mut self, column: impl Into<String>, pattern: impl Into<String>) {
        self.patterns.insert(column.into(), pattern.into());
    }

    pub fn remove(&mut self, column: &str) -> Option<String> {
        self.patterns.remove(column)
    }

    pub fn clear(&mut self) {
        self.patterns.clear();
    }

    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.patterns
            .iter()
            .filter(|(_, pattern)| !pattern.is_empty())
            .map(|(column, pattern)| (column.as_str(), pattern.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }
}

/// 1-based page over the matched rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    pub page: usize,
    pub page_size: NonZeroUsize,
}

impl PageSpec {
    pub fn new(page: usize, page_size: NonZeroUsize) -> Self {
        Self { page, page_size }
    }

    pub fn first(page_size: NonZeroUsize) -> Self {
        Self { page: 1, page_size }
    }

    /// Half-open row range of this page; page 0 is treated as page 1.
    pub fn bounds(&self) -> (usize, usize) {
        let size = self.page_size.get();
        let start = self.page.max(1).saturating_sub(1).saturating_mul(size);
        (start, start.saturating_add(size))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow {
    pub original_index: usize,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewResult {
    pub rows: Vec<ViewRow>,
    pub total_matches: usize,
}

impl ViewResult {
    pub fn page_count(&self, page_size: NonZeroUsize) -> usize {
        self.total_matches.div_ceil(page_size.get()).max(1)
    }

    pub fn original_indices(&self) -> Vec<usize> {
        self.rows.iter().map(|row| row.original_index).collect()
    }
}
