//! Router assembly and the serve loop.

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use posts::PostsModule;
use serde_json::json;
use svckit::{
    AuthState, DbHandle, HttpPostDirectory, HttpTokenVerifier, HttpUserDirectory, RemoteClient,
};
use tags::TagsModule;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::shutdown::shutdown_signal;

/// Everything the listener serves, plus the pools to close afterwards.
pub struct App {
    pub router: Router,
    pub databases: Vec<DbHandle>,
}

/// Connect databases, migrate and mount every enabled module.
///
/// # Errors
/// Fails when a database can't be opened or migrated, or the services
/// base URL is invalid.
pub async fn build(config: &AppConfig) -> anyhow::Result<App> {
    let client = Arc::new(RemoteClient::new(&config.services)?);
    let auth = AuthState::new(Arc::new(HttpTokenVerifier::new(client.clone())));

    let mut router =
        Router::new().route("/health", get(|| async { Json(json!({"status": "ok"})) }));
    let mut databases = Vec::new();

    let posts_cfg = &config.modules.posts;
    if posts_cfg.enabled {
        let db = DbHandle::connect(config.database_for(posts_cfg.database.as_ref())).await?;
        let users = Arc::new(HttpUserDirectory::new(client.clone()));
        let module = PostsModule::init(&db, users).await?;
        router = router.merge(module.router(auth.clone()));
        databases.push(db);
    } else {
        info!("posts module disabled");
    }

    let tags_cfg = &config.modules.tags;
    if tags_cfg.enabled {
        let db = DbHandle::connect(config.database_for(tags_cfg.database.as_ref())).await?;
        let posts = Arc::new(HttpPostDirectory::new(client.clone()));
        let module = TagsModule::init(&db, posts).await?;
        router = router.merge(module.router(auth));
        databases.push(db);
    } else {
        info!("tags module disabled");
    }

    Ok(App {
        router: router.layer(TraceLayer::new_for_http()),
        databases,
    })
}

/// Serve until a shutdown signal, then close every database.
///
/// # Errors
/// Fails when startup fails or the listener can't be bound.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let App { router, databases } = build(&config).await?;

    let listener = TcpListener::bind(config.server.bind_addr).await?;
    info!(addr = %listener.local_addr()?, "postboard server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    for db in databases {
        if let Err(e) = db.close().await {
            warn!(error = %e, "failed to close database");
        }
    }
    info!("postboard server stopped");
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use svckit::DatabaseConfig;
    use tower::ServiceExt;

    fn in_memory() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.database = DatabaseConfig {
            dsn: "sqlite::memory:".to_owned(),
            max_conns: None,
            acquire_timeout: None,
        };
        cfg
    }

    async fn get(router: &Router, uri: &str) -> StatusCode {
        router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn mounts_enabled_modules() {
        let app = build(&in_memory()).await.unwrap();

        assert_eq!(app.databases.len(), 2);
        assert_eq!(get(&app.router, "/health").await, StatusCode::OK);
        assert_eq!(get(&app.router, "/post").await, StatusCode::UNAUTHORIZED);
        assert_eq!(get(&app.router, "/tag").await, StatusCode::UNAUTHORIZED);

        for db in app.databases {
            db.close().await.unwrap();
        }
    }

    #[tokio::test]
    async fn disabled_module_is_not_routed() {
        let mut cfg = in_memory();
        cfg.modules.tags.enabled = false;

        let app = build(&cfg).await.unwrap();

        assert_eq!(app.databases.len(), 1);
        assert_eq!(get(&app.router, "/tag").await, StatusCode::NOT_FOUND);
    }
}
