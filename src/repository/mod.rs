//! Storage seam for the `versions` table.
//!
//! `Database` (PostgreSQL) is the production implementation; `memory` holds an
//! in-process implementation used by tests that do not have a database.

pub mod memory;

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::models::{NewVersion, Version};

pub use memory::InMemoryVersionRepository;

/// Name of the partial unique index that allows at most one active row.
pub const UNIQUE_ACTIVE_INDEX: &str = "idx_unique_active_version";

#[async_trait]
pub trait VersionRepository: Send + Sync {
    /// Create the `versions` table, or add any columns an older table is missing.
    async fn ensure_schema(&self) -> ApiResult<()>;

    /// Create the partial unique index over `active` where `active = true`.
    /// Idempotent.
    async fn ensure_unique_active_constraint(&self) -> ApiResult<()>;

    async fn count_active_versions(&self) -> ApiResult<i64>;

    /// Insert a row. Inserting a second active row fails with `ApiError::Conflict`
    /// once the unique active constraint exists.
    async fn insert_version(&self, version: NewVersion) -> ApiResult<Version>;

    /// First active row by id, if any.
    async fn find_active_version(&self) -> ApiResult<Option<Version>>;
}
