use axum::{middleware::from_fn, routing::get, Router};
use std::sync::Arc;

use crate::{
    handlers::{health_check, version::get_last_version},
    middleware::{cors, create_middleware_stack},
    service::VersionService,
};

pub const PATH_HEALTH: &str = "/health";
pub const PATH_LAST_VERSION: &str = "/api/lastVersion";

/// Create the Axum router with all endpoints and middleware
pub fn create_router(service: Arc<VersionService>) -> Router {
    Router::new()
        .route(PATH_HEALTH, get(health_check))
        .route(PATH_LAST_VERSION, get(get_last_version))
        .with_state(service)
        .layer(create_middleware_stack())
        // Outermost so responses produced by the stack (e.g. 408) carry CORS headers too
        .layer(from_fn(cors))
}
