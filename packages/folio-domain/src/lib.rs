pub mod document;
pub mod intent;

pub use document::{DeclaredFormat, DocumentStatus, Role};
pub use intent::QueryIntent;
