use serde::{Deserialize, Serialize};
use shape::Ref;
use svckit::RemoteUser;
use time::OffsetDateTime;

use crate::domain::model::{AuthoredPost, Post, PostThread};

/// A post as stored, `userId` still a key. Returned by writes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecordDto {
    pub id: i32,
    pub content: String,
    pub user_id: i32,
    pub parent_id: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A post with `userId` replaced by the author record. When the user service
/// didn't know the author, `user` is absent and the raw `userId` stays.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDto {
    pub id: i32,
    pub content: String,
    pub parent_id: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i32>,
    #[serde(skip_serializing_if = "Ref::is_unresolved")]
    pub user: Ref<i32, RemoteUser>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostThreadDto {
    #[serde(flatten)]
    pub post: PostDto,
    pub children: Vec<PostDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub content: String,
}

/// `GET /post` query string. Kept as raw strings so every bad field can be
/// reported at once.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsQuery {
    pub query: Option<String>,
    pub id: Option<String>,
    pub user_id: Option<String>,
}

impl From<Post> for PostRecordDto {
    fn from(p: Post) -> Self {
        Self {
            id: p.id,
            content: p.content,
            user_id: p.user_id,
            parent_id: p.parent_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<AuthoredPost> for PostDto {
    fn from(AuthoredPost { post, user }: AuthoredPost) -> Self {
        Self {
            id: post.id,
            content: post.content,
            parent_id: post.parent_id,
            created_at: post.created_at,
            updated_at: post.updated_at,
            user_id: user.is_unresolved().then_some(post.user_id),
            user,
        }
    }
}

impl From<PostThread> for PostThreadDto {
    fn from(thread: PostThread) -> Self {
        Self {
            post: thread.post.into(),
            children: thread.children.into_iter().map(PostDto::from).collect(),
        }
    }
}
