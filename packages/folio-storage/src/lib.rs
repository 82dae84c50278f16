pub mod chunks;
pub mod conversation;
pub mod db;
pub mod documents;
pub mod models;
pub mod query_log;
pub mod schema;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
