//! Client for the remote StudyMate backend.

mod client;
mod config;
pub mod types;

pub use client::ApiClient;
pub use config::{ApiConfig, DEFAULT_API_BASE_URL};
pub use types::ApiResponse;
