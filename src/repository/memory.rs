//! In-memory `VersionRepository` for tests.
//!
//! Mirrors the PostgreSQL behaviour that matters to callers: the table must be
//! created before it is queried, and once the unique active constraint exists a
//! second active row is rejected with `ApiError::Conflict`. Failures can be
//! switched on to exercise error paths.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{VersionRepository, UNIQUE_ACTIVE_INDEX};
use crate::error::{ApiError, ApiResult};
use crate::models::{NewVersion, Version};

#[derive(Debug)]
pub struct InMemoryVersionRepository {
    rows: Mutex<Vec<Version>>,
    schema_ready: AtomicBool,
    unique_active: AtomicBool,
    fail_queries: AtomicBool,
    fail_constraint: AtomicBool,
    next_id: AtomicI64,
}

impl InMemoryVersionRepository {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            schema_ready: AtomicBool::new(false),
            unique_active: AtomicBool::new(false),
            fail_queries: AtomicBool::new(false),
            fail_constraint: AtomicBool::new(false),
            next_id: AtomicI64::new(1),
        }
    }

    /// Every query fails with `ApiError::Database` while set.
    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    /// Index creation fails while set, leaving the table unconstrained.
    pub fn set_fail_constraint(&self, fail: bool) {
        self.fail_constraint.store(fail, Ordering::SeqCst);
    }

    pub fn has_unique_active_constraint(&self) -> bool {
        self.unique_active.load(Ordering::SeqCst)
    }

    /// Snapshot of all rows in insertion order.
    pub fn versions(&self) -> Vec<Version> {
        self.rows.lock().map(|rows| rows.clone()).unwrap_or_default()
    }

    fn table(&self) -> ApiResult<MutexGuard<'_, Vec<Version>>> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(ApiError::Database("simulated storage failure".to_string()));
        }
        if !self.schema_ready.load(Ordering::SeqCst) {
            return Err(ApiError::Database("relation \"versions\" does not exist".to_string()));
        }
        self.rows
            .lock()
            .map_err(|_| ApiError::Internal(anyhow::anyhow!("version table lock poisoned")))
    }
}

impl Default for InMemoryVersionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VersionRepository for InMemoryVersionRepository {
    async fn ensure_schema(&self) -> ApiResult<()> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(ApiError::Database("simulated storage failure".to_string()));
        }
        self.schema_ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn ensure_unique_active_constraint(&self) -> ApiResult<()> {
        if self.fail_constraint.load(Ordering::SeqCst) {
            return Err(ApiError::Database(format!(
                "could not create unique index \"{}\"",
                UNIQUE_ACTIVE_INDEX
            )));
        }
        let rows = self.table()?;
        if rows.iter().filter(|v| v.active).count() > 1 {
            return Err(ApiError::Database(format!(
                "could not create unique index \"{}\": key (active)=(t) is duplicated",
                UNIQUE_ACTIVE_INDEX
            )));
        }
        self.unique_active.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn count_active_versions(&self) -> ApiResult<i64> {
        let rows = self.table()?;
        Ok(rows.iter().filter(|v| v.active).count() as i64)
    }

    async fn insert_version(&self, version: NewVersion) -> ApiResult<Version> {
        let mut rows = self.table()?;
        if version.active
            && self.unique_active.load(Ordering::SeqCst)
            && rows.iter().any(|v| v.active)
        {
            return Err(ApiError::conflict("An active version already exists"));
        }

        let now = Utc::now();
        let created = Version {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            version_number: version.version_number,
            active: version.active,
            created_at: now,
            updated_at: now,
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn find_active_version(&self) -> ApiResult<Option<Version>> {
        let rows = self.table()?;
        Ok(rows.iter().filter(|v| v.active).min_by_key(|v| v.id).cloned())
    }
}
