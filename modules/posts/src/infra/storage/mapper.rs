//! Entity to domain model mappers.

use sea_orm::ActiveValue::{NotSet, Set};
use time::OffsetDateTime;

use super::entity::post;
use crate::domain::model::{NewPost, Post};

impl From<post::Model> for Post {
    fn from(model: post::Model) -> Self {
        Self {
            id: model.id,
            content: model.content,
            user_id: model.user_id,
            parent_id: model.parent_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Active model for an insert; the store assigns the id.
#[must_use]
pub fn new_post_to_active_model(new_post: NewPost, now: OffsetDateTime) -> post::ActiveModel {
    post::ActiveModel {
        id: NotSet,
        content: Set(new_post.content),
        user_id: Set(new_post.user_id),
        parent_id: Set(new_post.parent_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
}
