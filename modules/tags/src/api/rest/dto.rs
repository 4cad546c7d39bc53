use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::model::{Tag, TagWithPosts};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagDto {
    pub id: i32,
    pub name: String,
}

/// A tag with the posts it labels under `post`.
#[derive(Debug, Clone, Serialize)]
pub struct TagWithPostsDto {
    pub id: i32,
    pub name: String,
    pub post: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagNameRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTagsQuery {
    pub query: Option<String>,
    pub id: Option<String>,
}

/// `POST /tag/post`: label a post with tags by name.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignTagsRequest {
    pub post_id: i32,
    pub tags: Vec<String>,
}

/// `DELETE /tag/post`: remove tags from a post by id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveTagsRequest {
    pub post_id: i32,
    pub tags: Vec<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostTagsQuery {
    pub post_id: Option<String>,
}

impl From<Tag> for TagDto {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

impl From<TagWithPosts> for TagWithPostsDto {
    fn from(TagWithPosts { tag, posts }: TagWithPosts) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            post: posts,
        }
    }
}
