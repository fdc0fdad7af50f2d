// Models module

pub mod version;

// Re-export commonly used types
pub use version::{NewVersion, Version, VersionResponse, DEFAULT_VERSION_NUMBER};
