// Library root for the Version API

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod router;
pub mod service;

// Re-export commonly used types
pub use db::Database;
pub use error::{ApiError, ApiResult};
pub use models::{NewVersion, Version, VersionResponse};
pub use repository::VersionRepository;
pub use router::create_router;
pub use service::VersionService;
