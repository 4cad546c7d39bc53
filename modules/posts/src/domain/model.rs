use shape::Ref;
use svckit::RemoteUser;
use time::OffsetDateTime;

/// A stored post. `parent_id` links a reply to the post it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: i32,
    pub content: String,
    pub user_id: i32,
    pub parent_id: Option<i32>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub content: String,
    pub user_id: i32,
    pub parent_id: Option<i32>,
}

/// List filters; every present field narrows the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Substring of `content`.
    pub search: Option<String>,
    pub ids: Option<Vec<i32>>,
    pub user_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct PostWithChildren {
    pub post: Post,
    pub children: Vec<Post>,
}

/// A post whose author has been looked up in the user service.
#[derive(Debug, Clone)]
pub struct AuthoredPost {
    pub post: Post,
    pub user: Ref<i32, RemoteUser>,
}

/// A post with its direct replies, all authors resolved.
#[derive(Debug, Clone)]
pub struct PostThread {
    pub post: AuthoredPost,
    pub children: Vec<AuthoredPost>,
}
