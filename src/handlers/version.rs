// Version handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;

use crate::{error::ApiError, service::VersionService};

/// Currently active version label
/// GET /api/lastVersion
pub async fn get_last_version(
    State(service): State<Arc<VersionService>>,
) -> Result<impl IntoResponse, ApiError> {
    let response = service.get_current_version().await?;

    info!("Serving active version {}", response.version);
    Ok((StatusCode::OK, Json(response)))
}
