//! Posts module wiring.

use std::sync::Arc;

use axum::Router;
use sea_orm_migration::MigratorTrait;
use svckit::{AuthState, DbHandle, UserDirectory};
use tracing::info;

use crate::api::rest::routes;
use crate::domain::repo::PostsRepository;
use crate::domain::service::Service;
use crate::infra::storage::SeaOrmPostsRepository;
use crate::infra::storage::migrations::Migrator;

/// Posts module: owns the `posts` table and the `/post` routes.
pub struct PostsModule {
    service: Arc<Service>,
}

impl PostsModule {
    /// Run pending migrations and wire the service.
    ///
    /// # Errors
    /// Returns an error when a migration fails.
    pub async fn init(db: &DbHandle, users: Arc<dyn UserDirectory>) -> anyhow::Result<Self> {
        info!(dsn = %db.dsn(), "Initializing posts module");

        Migrator::up(db.conn(), None).await?;

        let repo: Arc<dyn PostsRepository> =
            Arc::new(SeaOrmPostsRepository::new(db.conn().clone()));
        let service = Arc::new(Service::new(repo, users));

        Ok(Self { service })
    }

    #[must_use]
    pub fn router(&self, auth: AuthState) -> Router {
        routes::router(self.service.clone(), auth)
    }
}
