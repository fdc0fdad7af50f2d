// Version service
// Startup migration/seed and the active-version lookup, on top of any `VersionRepository`

use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult},
    models::{NewVersion, Version, VersionResponse},
    repository::VersionRepository,
};

/// Message returned to clients when no row is flagged active.
pub const NO_ACTIVE_VERSION: &str = "No active version found";

#[derive(Clone)]
pub struct VersionService {
    repository: Arc<dyn VersionRepository>,
}

impl VersionService {
    pub fn new(repository: Arc<dyn VersionRepository>) -> Self {
        Self { repository }
    }

    /// Schema, unique active index, then seed.
    /// A failed index creation is only logged; every other failure is returned.
    pub async fn initialize_database(&self) -> ApiResult<()> {
        self.repository.ensure_schema().await?;

        if let Err(e) = self.repository.ensure_unique_active_constraint().await {
            warn!("Failed to create unique index for active version: {}", e);
        }

        self.seed_if_empty().await?;
        Ok(())
    }

    /// Inserts the default active version when none is active.
    /// Returns whether a row was inserted.
    ///
    /// Count-then-insert is not atomic. If another process seeds in between, the
    /// unique active index rejects our insert and that is treated as a no-op.
    pub async fn seed_if_empty(&self) -> ApiResult<bool> {
        let active = self.repository.count_active_versions().await?;
        if active > 0 {
            info!("Active version already present ({} row), skipping seed", active);
            return Ok(false);
        }

        match self.repository.insert_version(NewVersion::initial()).await {
            Ok(version) => {
                info!("Initial version {} inserted successfully", version.version_number);
                Ok(true)
            }
            Err(e) if e.is_conflict() => {
                info!("Active version was seeded concurrently, skipping seed");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn get_active_version(&self) -> ApiResult<Version> {
        self.repository
            .find_active_version()
            .await?
            .ok_or_else(|| ApiError::not_found(NO_ACTIVE_VERSION))
    }

    pub async fn get_current_version(&self) -> ApiResult<VersionResponse> {
        let version = self.get_active_version().await?;
        Ok(VersionResponse::from(version))
    }
}
