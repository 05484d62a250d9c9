//! Review-and-edit engine for tabular data pulled from uploaded spreadsheets.
//!
//! The core is [`GridStore`] (canonical grid plus snapshot history),
//! [`EditSession`] (one pending cell edit) and [`compute_view`] (search, filter,
//! sort and pagination over a snapshot). [`GridViewer`] ties them to a
//! [`PersistenceGateway`]; `infra` holds a SQLite-backed gateway and the
//! CSV/XLSX importers and exporters.

pub mod config;
pub mod domain;
pub mod infra;
pub mod logging;
pub mod usecase;

pub use config::EngineConfig;
pub use domain::entities::grid::{GridSnapshot, Row, SharedSnapshot};
pub use domain::entities::query::{
    FileId, FilterSpec, PageSpec, SearchSpec, SortDirection, SortSpec, ViewResult, ViewRow,
};
pub use domain::errors::GridError;
pub use usecase::ports::gateway::{
    ExportFormat, GatewayError, LoadedPage, PersistenceGateway, SaveAck, TabularData,
};
pub use usecase::services::edit_session::{EditSession, SupersedePolicy};
pub use usecase::services::grid_store::GridStore;
pub use usecase::services::history::{HistoryCapacity, HistoryManager};
pub use usecase::services::view_pipeline::compute_view;
pub use usecase::services::viewer::{GridViewer, PendingSave, ViewerError};
