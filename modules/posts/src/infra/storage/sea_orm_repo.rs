//! `SeaORM` implementation of `PostsRepository`.

use async_trait::async_trait;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder,
};
use svckit::FilterBuilder;
use time::OffsetDateTime;

use super::entity::post;
use super::mapper::new_post_to_active_model;
use crate::domain::model::{NewPost, Post, PostFilter, PostWithChildren};
use crate::domain::repo::PostsRepository;

pub struct SeaOrmPostsRepository {
    conn: DatabaseConnection,
}

impl SeaOrmPostsRepository {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl PostsRepository for SeaOrmPostsRepository {
    async fn find(&self, id: i32) -> anyhow::Result<Option<Post>> {
        let found = post::Entity::find_by_id(id).one(&self.conn).await?;
        Ok(found.map(Post::from))
    }

    async fn find_with_children(&self, id: i32) -> anyhow::Result<Option<PostWithChildren>> {
        let Some(parent) = post::Entity::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let children = post::Entity::find()
            .filter(post::Column::ParentId.eq(id))
            .order_by_asc(post::Column::CreatedAt)
            .order_by_asc(post::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(Some(PostWithChildren {
            post: parent.into(),
            children: children.into_iter().map(Post::from).collect(),
        }))
    }

    async fn list(&self, filter: &PostFilter) -> anyhow::Result<Vec<Post>> {
        let cond = FilterBuilder::new()
            .with(filter.search.as_deref(), |q| post::Column::Content.contains(q))
            .with(filter.ids.clone(), |ids| post::Column::Id.is_in(ids))
            .with(filter.user_id, |user_id| post::Column::UserId.eq(user_id))
            .build();

        let rows = post::Entity::find()
            .filter(cond)
            .order_by_asc(post::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn insert(&self, new_post: NewPost) -> anyhow::Result<Post> {
        let model = new_post_to_active_model(new_post, OffsetDateTime::now_utc())
            .insert(&self.conn)
            .await?;
        Ok(model.into())
    }

    async fn update_content(&self, id: i32, content: String) -> anyhow::Result<Option<Post>> {
        let Some(existing) = post::Entity::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active = existing.into_active_model();
        active.content = Set(content);
        active.updated_at = Set(OffsetDateTime::now_utc());
        let model = active.update(&self.conn).await?;

        Ok(Some(model.into()))
    }

    async fn delete(&self, id: i32) -> anyhow::Result<Option<Post>> {
        let Some(existing) = post::Entity::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        post::Entity::delete_by_id(id).exec(&self.conn).await?;
        Ok(Some(existing.into()))
    }
}
