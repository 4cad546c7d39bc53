//! Tags module wiring.

use std::sync::Arc;

use axum::Router;
use sea_orm_migration::MigratorTrait;
use svckit::{AuthState, DbHandle, PostDirectory};
use tracing::info;

use crate::api::rest::routes;
use crate::domain::repo::TagsRepository;
use crate::domain::service::Service;
use crate::infra::storage::SeaOrmTagsRepository;
use crate::infra::storage::migrations::Migrator;

/// Tags module: owns the `tags` and `post_tags` tables and the `/tag` routes.
pub struct TagsModule {
    service: Arc<Service>,
}

impl TagsModule {
    /// Run pending migrations and wire the service.
    ///
    /// # Errors
    /// Returns an error when a migration fails.
    pub async fn init(db: &DbHandle, posts: Arc<dyn PostDirectory>) -> anyhow::Result<Self> {
        info!(dsn = %db.dsn(), "Initializing tags module");

        Migrator::up(db.conn(), None).await?;

        let repo: Arc<dyn TagsRepository> = Arc::new(SeaOrmTagsRepository::new(db.conn().clone()));
        let service = Arc::new(Service::new(repo, posts));

        Ok(Self { service })
    }

    #[must_use]
    pub fn router(&self, auth: AuthState) -> Router {
        routes::router(self.service.clone(), auth)
    }
}
