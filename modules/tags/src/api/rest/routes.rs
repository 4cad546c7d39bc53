use std::sync::Arc;

use axum::routing::get;
use axum::{Extension, Router, middleware};
use svckit::{AuthState, require_auth};

use super::handlers;
use crate::domain::service::Service;

/// `/tag` routes, all behind bearer authentication.
#[must_use]
pub fn router(service: Arc<Service>, auth: AuthState) -> Router {
    Router::new()
        .route("/tag", get(handlers::list_tags).post(handlers::create_tag))
        .route(
            "/tag/post",
            get(handlers::post_tags)
                .post(handlers::assign_tags)
                .delete(handlers::remove_tags),
        )
        .route(
            "/tag/{id}",
            get(handlers::get_tag)
                .put(handlers::rename_tag)
                .delete(handlers::delete_tag),
        )
        .route_layer(middleware::from_fn_with_state(auth, require_auth))
        .layer(Extension(service))
}
