use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::usecase::services::edit_session::SupersedePolicy;
use crate::usecase::services::history::HistoryCapacity;

pub const DEFAULT_PAGE_SIZE: usize = 50;

pub const ENV_HISTORY_LIMIT: &str = "GRIDEDIT_HISTORY_LIMIT";
pub const ENV_SUPERSEDE: &str = "GRIDEDIT_SUPERSEDE";
pub const ENV_PAGE_SIZE: &str = "GRIDEDIT_PAGE_SIZE";
pub const ENV_DB: &str = "GRIDEDIT_DB";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub history: HistoryCapacity,
    pub supersede: SupersedePolicy,
    /// Rows per displayed page.
    pub page_size: NonZeroUsize,
    /// Rows per remote load; the default loads the whole stored file.
    pub load_page_size: NonZeroUsize,
    pub db_path: PathBuf,
}

impl EngineConfig {
    pub fn with_db_path(db_path: PathBuf) -> Self {
        Self {
            history: HistoryCapacity::Unbounded,
            supersede: SupersedePolicy::Commit,
            page_size: NonZeroUsize::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN),
            load_page_size: NonZeroUsize::MAX,
            db_path,
        }
    }

    pub fn load() -> Result<Self> {
        let db_path = default_db_path()?;
        Self::with_db_path(db_path).overlay(|key| std::env::var(key).ok())
    }

    /// Applies `GRIDEDIT_*` overrides read through `lookup`.
    pub fn overlay<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_HISTORY_LIMIT) {
            self.history = parse_history_limit(&raw)
                .with_context(|| format!("invalid {ENV_HISTORY_LIMIT}: {raw}"))?;
        }
        if let Some(raw) = lookup(ENV_SUPERSEDE) {
            self.supersede = raw
                .parse()
                .map_err(|err: String| anyhow!(err))
                .with_context(|| format!("invalid {ENV_SUPERSEDE}"))?;
        }
        if let Some(raw) = lookup(ENV_PAGE_SIZE) {
            self.page_size = parse_non_zero(&raw)
                .with_context(|| format!("invalid {ENV_PAGE_SIZE}: {raw}"))?;
        }
        if let Some(raw) = lookup(ENV_DB) {
            if !raw.trim().is_empty() {
                self.db_path = PathBuf::from(raw);
            }
        }
        Ok(self)
    }
}

/// `0`, empty or `unbounded` mean no cap.
pub fn parse_history_limit(raw: &str) -> Result<HistoryCapacity> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("unbounded") {
        return Ok(HistoryCapacity::Unbounded);
    }
    let limit: usize = raw.parse().context("history limit must be a number")?;
    Ok(match NonZeroUsize::new(limit) {
        Some(max) => HistoryCapacity::MaxEntries(max),
        None => HistoryCapacity::Unbounded,
    })
}

pub fn parse_non_zero(raw: &str) -> Result<NonZeroUsize> {
    let value: usize = raw.trim().parse().context("expected a number")?;
    NonZeroUsize::new(value).ok_or_else(|| anyhow!("must be greater than zero"))
}

pub fn default_db_path() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("com", "gridedit", "gridedit")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))?;
    Ok(project_dirs.data_local_dir().join("datasets.sqlite"))
}
