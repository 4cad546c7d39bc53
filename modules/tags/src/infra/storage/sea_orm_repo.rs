//! `SeaORM` implementation of `TagsRepository`.

use anyhow::anyhow;
use async_trait::async_trait;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, TransactionTrait,
};
use shape::PostTagRow;
use svckit::FilterBuilder;
use time::OffsetDateTime;

use super::entity::{post_tag, tag};
use super::mapper::to_post_tag_row;
use crate::domain::model::{PostTag, Tag, TagFilter};
use crate::domain::repo::TagsRepository;

pub struct SeaOrmTagsRepository {
    conn: DatabaseConnection,
}

impl SeaOrmTagsRepository {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl TagsRepository for SeaOrmTagsRepository {
    async fn find(&self, id: i32) -> anyhow::Result<Option<Tag>> {
        let found = tag::Entity::find_by_id(id).one(&self.conn).await?;
        Ok(found.map(Tag::from))
    }

    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Tag>> {
        let found = tag::Entity::find()
            .filter(tag::Column::Name.eq(name))
            .one(&self.conn)
            .await?;
        Ok(found.map(Tag::from))
    }

    async fn list(&self, filter: &TagFilter) -> anyhow::Result<Vec<Tag>> {
        let cond = FilterBuilder::new()
            .with(filter.search.as_deref(), |q| tag::Column::Name.contains(q))
            .with(filter.ids.clone(), |ids| tag::Column::Id.is_in(ids))
            .build();

        let rows = tag::Entity::find()
            .filter(cond)
            .order_by_asc(tag::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn find_or_create(&self, name: &str) -> anyhow::Result<Tag> {
        let model = tag::ActiveModel {
            id: NotSet,
            name: Set(name.to_owned()),
        };
        tag::Entity::insert(model)
            .on_conflict(
                OnConflict::column(tag::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        self.find_by_name(name)
            .await?
            .ok_or_else(|| anyhow!("tag '{name}' missing right after insert"))
    }

    async fn rename(&self, id: i32, name: String) -> anyhow::Result<Option<Tag>> {
        let Some(existing) = tag::Entity::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active = existing.into_active_model();
        active.name = Set(name);
        let model = active.update(&self.conn).await?;

        Ok(Some(model.into()))
    }

    async fn delete(&self, id: i32) -> anyhow::Result<Option<Tag>> {
        let txn = self.conn.begin().await?;

        let Some(existing) = tag::Entity::find_by_id(id).one(&txn).await? else {
            txn.rollback().await?;
            return Ok(None);
        };

        post_tag::Entity::delete_many()
            .filter(post_tag::Column::TagId.eq(id))
            .exec(&txn)
            .await?;
        tag::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(Some(existing.into()))
    }

    async fn links_for_tag(&self, tag_id: i32) -> anyhow::Result<Vec<PostTag>> {
        let rows = post_tag::Entity::find()
            .filter(post_tag::Column::TagId.eq(tag_id))
            .order_by_asc(post_tag::Column::CreatedAt)
            .order_by_asc(post_tag::Column::PostId)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(PostTag::from).collect())
    }

    async fn tags_for_post(&self, post_id: i32) -> anyhow::Result<Vec<PostTagRow>> {
        let rows = post_tag::Entity::find()
            .filter(post_tag::Column::PostId.eq(post_id))
            .find_also_related(tag::Entity)
            .order_by_asc(post_tag::Column::CreatedAt)
            .order_by_asc(post_tag::Column::TagId)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(link, tag)| tag.map(|tag| to_post_tag_row(&link, tag)))
            .collect())
    }

    async fn attach(&self, post_id: i32, tag_ids: &[i32]) -> anyhow::Result<()> {
        if tag_ids.is_empty() {
            return Ok(());
        }

        let now = OffsetDateTime::now_utc();
        let links = tag_ids.iter().map(|&tag_id| post_tag::ActiveModel {
            post_id: Set(post_id),
            tag_id: Set(tag_id),
            created_at: Set(now),
        });

        let txn = self.conn.begin().await?;
        post_tag::Entity::insert_many(links)
            .on_conflict(
                OnConflict::columns([post_tag::Column::PostId, post_tag::Column::TagId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
        txn.commit().await?;

        Ok(())
    }

    async fn detach(&self, post_id: i32, tag_ids: &[i32]) -> anyhow::Result<()> {
        let txn = self.conn.begin().await?;
        post_tag::Entity::delete_many()
            .filter(post_tag::Column::PostId.eq(post_id))
            .filter(post_tag::Column::TagId.is_in(tag_ids.iter().copied()))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        Ok(())
    }
}
