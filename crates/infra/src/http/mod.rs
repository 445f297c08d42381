//! Shared HTTP plumbing for the remote adapters

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
