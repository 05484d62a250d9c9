pub mod edit;
pub mod grid;
pub mod query;
