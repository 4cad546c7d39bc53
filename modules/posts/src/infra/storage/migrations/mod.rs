//! Schema migrations for the posts store.

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_posts;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250101_000001_create_posts::Migration)]
    }

    // Own bookkeeping table, so posts and tags can share one database.
    fn migration_table_name() -> DynIden {
        Alias::new("posts_migrations").into_iden()
    }
}
