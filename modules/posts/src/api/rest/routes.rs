use std::sync::Arc;

use axum::routing::get;
use axum::{Extension, Router, middleware};
use svckit::{AuthState, require_auth};

use super::handlers;
use crate::domain::service::Service;

/// `/post` routes, all behind bearer authentication.
#[must_use]
pub fn router(service: Arc<Service>, auth: AuthState) -> Router {
    Router::new()
        .route(
            "/post",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/post/{id}",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .route_layer(middleware::from_fn_with_state(auth, require_auth))
        .layer(Extension(service))
}
