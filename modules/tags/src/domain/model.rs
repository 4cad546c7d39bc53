use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

/// A tag. Names are unique across the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: i32,
    pub name: String,
}

/// A post/tag association row as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostTag {
    pub post_id: i32,
    pub tag_id: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// List filters; every present field narrows the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    /// Substring of `name`.
    pub search: Option<String>,
    pub ids: Option<Vec<i32>>,
}

/// A tag with the posts it labels, as the post service returned them.
/// Posts the post service no longer knows are left out.
#[derive(Debug, Clone)]
pub struct TagWithPosts {
    pub tag: Tag,
    pub posts: Vec<Value>,
}
