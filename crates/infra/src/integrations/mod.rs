//! External service integrations

pub mod chat;
pub mod graph;
