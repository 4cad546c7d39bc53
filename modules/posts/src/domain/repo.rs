use async_trait::async_trait;

use super::model::{NewPost, Post, PostFilter, PostWithChildren};

/// Persistence port for posts.
#[async_trait]
pub trait PostsRepository: Send + Sync {
    async fn find(&self, id: i32) -> anyhow::Result<Option<Post>>;

    /// The post plus its direct replies, oldest first.
    async fn find_with_children(&self, id: i32) -> anyhow::Result<Option<PostWithChildren>>;

    /// Posts matching every present filter, ordered by id.
    async fn list(&self, filter: &PostFilter) -> anyhow::Result<Vec<Post>>;

    async fn insert(&self, new_post: NewPost) -> anyhow::Result<Post>;

    /// `None` when the post doesn't exist.
    async fn update_content(&self, id: i32, content: String) -> anyhow::Result<Option<Post>>;

    /// Returns the deleted post; replies go with it.
    async fn delete(&self, id: i32) -> anyhow::Result<Option<Post>>;
}
