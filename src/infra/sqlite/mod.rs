pub mod gateway;
pub mod queries;
pub mod schema;
