//! Connected-user directory storage (SQLite)

pub mod manager;
pub mod user_directory;

pub use manager::*;
pub use user_directory::*;
