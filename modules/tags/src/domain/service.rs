use std::sync::Arc;

use serde_json::Value;
use shape::{
    PostTags, Record, aggregate_tags_by_post, dedupe_by_identity, delete_field,
    extract_unique_by, extract_unique_key, is_alphanumeric_with_hyphen, map_concurrently,
    rename_field_in_array, substitute_matching_reference_in_array, to_records,
};
use svckit::{AuthUser, PostDirectory};
use tracing::{debug, info, instrument};

use super::error::DomainError;
use super::model::{Tag, TagFilter, TagWithPosts};
use super::repo::TagsRepository;

/// Tags use cases. Posts are owned by the post service; ownership checks and
/// post bodies go through [`PostDirectory`].
pub struct Service {
    repo: Arc<dyn TagsRepository>,
    posts: Arc<dyn PostDirectory>,
}

impl Service {
    #[must_use]
    pub fn new(repo: Arc<dyn TagsRepository>, posts: Arc<dyn PostDirectory>) -> Self {
        Self { repo, posts }
    }

    /// The tag called `name`, created if it doesn't exist yet.
    ///
    /// # Errors
    /// Validation error for a bad name, or a database error.
    #[instrument(skip(self))]
    pub async fn create_tag(&self, name: &str) -> Result<Tag, DomainError> {
        let name = require_name("name", name)?;
        let tag = self
            .repo
            .find_or_create(name)
            .await
            .map_err(DomainError::database)?;
        info!(tag_id = tag.id, "tag ready");
        Ok(tag)
    }

    /// # Errors
    /// Database error.
    #[instrument(skip(self))]
    pub async fn list_tags(&self, filter: &TagFilter) -> Result<Vec<Tag>, DomainError> {
        self.repo.list(filter).await.map_err(DomainError::database)
    }

    /// A tag with every post it labels. Association rows are joined with
    /// the post service's records in memory; each post appears once.
    ///
    /// # Errors
    /// [`DomainError::TagNotFound`], a database error, or
    /// [`DomainError::Upstream`] when the post service fails.
    #[instrument(skip(self, caller))]
    pub async fn get_tag(&self, caller: &AuthUser, id: i32) -> Result<TagWithPosts, DomainError> {
        let tag = self
            .repo
            .find(id)
            .await
            .map_err(DomainError::database)?
            .ok_or(DomainError::TagNotFound { id })?;

        let links = self
            .repo
            .links_for_tag(id)
            .await
            .map_err(DomainError::database)?;
        if links.is_empty() {
            return Ok(TagWithPosts {
                tag,
                posts: Vec::new(),
            });
        }

        let rows = to_records(&links).map_err(DomainError::database)?;
        let rows = rename_field_in_array(&rows, "postId", "post");

        let post_ids: Vec<i32> = extract_unique_key("post", &rows)
            .iter()
            .filter_map(Value::as_i64)
            .filter_map(|id| i32::try_from(id).ok())
            .collect();
        let posts = self
            .posts
            .get_posts(&post_ids, &caller.authorization)
            .await?;
        debug!(requested = post_ids.len(), found = posts.len(), "posts resolved");

        let joined = substitute_matching_reference_in_array(&rows, "post", &posts, "id");
        let joined = delete_field(&joined, "tagId");

        Ok(TagWithPosts {
            tag,
            posts: dedupe_by_identity(&joined, "post"),
        })
    }

    /// # Errors
    /// Validation error, [`DomainError::NameTaken`],
    /// [`DomainError::TagNotFound`] or a database error.
    #[instrument(skip(self))]
    pub async fn rename_tag(&self, id: i32, name: &str) -> Result<Tag, DomainError> {
        let name = require_name("name", name)?;

        let holder = self
            .repo
            .find_by_name(name)
            .await
            .map_err(DomainError::database)?;
        if holder.is_some_and(|t| t.id != id) {
            return Err(DomainError::NameTaken {
                name: name.to_owned(),
            });
        }

        let tag = self
            .repo
            .rename(id, name.to_owned())
            .await
            .map_err(DomainError::database)?
            .ok_or(DomainError::TagNotFound { id })?;

        info!(tag_id = id, "tag renamed");
        Ok(tag)
    }

    /// # Errors
    /// [`DomainError::TagNotFound`] or a database error.
    #[instrument(skip(self))]
    pub async fn delete_tag(&self, id: i32) -> Result<Tag, DomainError> {
        let tag = self
            .repo
            .delete(id)
            .await
            .map_err(DomainError::database)?
            .ok_or(DomainError::TagNotFound { id })?;

        info!(tag_id = id, "tag deleted");
        Ok(tag)
    }

    /// Label a post with tags by name, creating missing tags.
    ///
    /// Names are resolved concurrently. Associations are written in one
    /// transaction and pairs that already exist are kept as they are.
    ///
    /// # Errors
    /// Validation error, [`DomainError::PostNotFound`],
    /// [`DomainError::NotOwner`], [`DomainError::Upstream`] or a database
    /// error.
    #[instrument(skip(self, caller, names), fields(user_id = caller.id, count = names.len()))]
    pub async fn assign_tags(
        &self,
        caller: &AuthUser,
        post_id: i32,
        names: &[String],
    ) -> Result<PostTags, DomainError> {
        if names.is_empty() {
            return Err(DomainError::validation("tags", "At least one tag is required"));
        }
        for name in names {
            require_name("tags", name)?;
        }
        self.require_owner(caller, post_id).await?;

        let names = extract_unique_by(names, |n| n.trim().to_owned());
        let tags = map_concurrently(&names, |name| self.repo.find_or_create(name))
            .await
            .map_err(DomainError::database)?;

        let tag_ids: Vec<i32> = tags.iter().map(|t| t.id).collect();
        self.repo
            .attach(post_id, &tag_ids)
            .await
            .map_err(DomainError::database)?;

        info!(post_id, "tags assigned");
        self.tags_of(post_id).await
    }

    /// Tags of every listed post, one entry per post that has any.
    ///
    /// # Errors
    /// Database error.
    #[instrument(skip(self))]
    pub async fn post_tags(&self, post_ids: &[i32]) -> Result<Vec<PostTags>, DomainError> {
        let groups = map_concurrently(post_ids, |&id| self.repo.tags_for_post(id))
            .await
            .map_err(DomainError::database)?;
        Ok(aggregate_tags_by_post(&groups))
    }

    /// Remove tags from a post.
    ///
    /// # Errors
    /// Validation error, [`DomainError::PostNotFound`],
    /// [`DomainError::NotOwner`], [`DomainError::Upstream`] or a database
    /// error.
    #[instrument(skip(self, caller), fields(user_id = caller.id))]
    pub async fn remove_tags(
        &self,
        caller: &AuthUser,
        post_id: i32,
        tag_ids: &[i32],
    ) -> Result<PostTags, DomainError> {
        if tag_ids.is_empty() {
            return Err(DomainError::validation("tags", "At least one tag is required"));
        }
        self.require_owner(caller, post_id).await?;

        self.repo
            .detach(post_id, tag_ids)
            .await
            .map_err(DomainError::database)?;

        info!(post_id, "tags removed");
        self.tags_of(post_id).await
    }

    async fn tags_of(&self, post_id: i32) -> Result<PostTags, DomainError> {
        let rows = self
            .repo
            .tags_for_post(post_id)
            .await
            .map_err(DomainError::database)?;

        Ok(aggregate_tags_by_post(&[rows])
            .into_iter()
            .next()
            .unwrap_or(PostTags {
                post_id,
                tag: Vec::new(),
            }))
    }

    async fn require_owner(&self, caller: &AuthUser, post_id: i32) -> Result<(), DomainError> {
        let post = self
            .posts
            .get_post_by_id(post_id, &caller.authorization)
            .await?
            .ok_or(DomainError::PostNotFound { id: post_id })?;

        if owner_of(&post) != Some(caller.id) {
            return Err(DomainError::NotOwner { id: post_id });
        }
        Ok(())
    }
}

/// Author of a post record: `user.id` once resolved, `userId` otherwise.
fn owner_of(post: &Record) -> Option<i32> {
    post.get("user")
        .and_then(|u| u.get("id"))
        .or_else(|| post.get("userId"))
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())
}

fn require_name<'a>(field: &str, name: &'a str) -> Result<&'a str, DomainError> {
    let name = name.trim();
    if name.is_empty() || !is_alphanumeric_with_hyphen(name) {
        return Err(DomainError::validation(field, "Valid tag name required"));
    }
    Ok(name)
}
