use async_trait::async_trait;
use shape::PostTagRow;

use super::model::{PostTag, Tag, TagFilter};

/// Persistence port for tags and their post associations.
#[async_trait]
pub trait TagsRepository: Send + Sync {
    async fn find(&self, id: i32) -> anyhow::Result<Option<Tag>>;

    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Tag>>;

    /// Tags matching every present filter, ordered by id.
    async fn list(&self, filter: &TagFilter) -> anyhow::Result<Vec<Tag>>;

    /// The tag called `name`, created first if needed. Safe to race.
    async fn find_or_create(&self, name: &str) -> anyhow::Result<Tag>;

    /// `None` when the tag doesn't exist.
    async fn rename(&self, id: i32, name: String) -> anyhow::Result<Option<Tag>>;

    /// Removes the tag and its associations together.
    async fn delete(&self, id: i32) -> anyhow::Result<Option<Tag>>;

    /// Association rows labelled with `tag_id`, oldest first.
    async fn links_for_tag(&self, tag_id: i32) -> anyhow::Result<Vec<PostTag>>;

    /// Associations of `post_id` with their tag inflated, oldest first.
    async fn tags_for_post(&self, post_id: i32) -> anyhow::Result<Vec<PostTagRow>>;

    /// Associate every tag with the post in one transaction. Existing pairs
    /// are left alone.
    async fn attach(&self, post_id: i32, tag_ids: &[i32]) -> anyhow::Result<()>;

    /// Drop the listed associations in one transaction.
    async fn detach(&self, post_id: i32, tag_ids: &[i32]) -> anyhow::Result<()>;
}
