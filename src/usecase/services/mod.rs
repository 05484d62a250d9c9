pub mod edit_session;
pub mod grid_store;
pub mod history;
pub mod import_service;
pub mod view_pipeline;
pub mod viewer;
