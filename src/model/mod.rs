pub mod collection;
pub mod config;
pub mod project;
pub mod schema;
pub mod task;

pub use collection::*;
pub use config::*;
pub use project::*;
pub use schema::SchemaError;
pub use task::*;
