use std::iter;
use std::sync::Arc;

use shape::{Ref, ReferenceIndex, extract_unique_by, resolve_all};
use svckit::{AuthUser, RemoteUser, UserDirectory};
use tracing::{debug, info, instrument};

use super::error::DomainError;
use super::model::{AuthoredPost, NewPost, Post, PostFilter, PostThread, PostWithChildren};
use super::repo::PostsRepository;

/// Posts use cases. Authors are resolved through the user service, one
/// batched call per request.
pub struct Service {
    repo: Arc<dyn PostsRepository>,
    users: Arc<dyn UserDirectory>,
}

impl Service {
    #[must_use]
    pub fn new(repo: Arc<dyn PostsRepository>, users: Arc<dyn UserDirectory>) -> Self {
        Self { repo, users }
    }

    /// Create a post owned by the caller.
    ///
    /// # Errors
    /// Validation error for empty content, [`DomainError::ParentNotFound`]
    /// when `parent_id` names no post, or a database error.
    #[instrument(skip(self, caller, content), fields(user_id = caller.id))]
    pub async fn create_post(
        &self,
        caller: &AuthUser,
        content: String,
        parent_id: Option<i32>,
    ) -> Result<Post, DomainError> {
        require_content(&content)?;

        if let Some(parent) = parent_id {
            let found = self.repo.find(parent).await.map_err(DomainError::database)?;
            if found.is_none() {
                return Err(DomainError::ParentNotFound { id: parent });
            }
        }

        let post = self
            .repo
            .insert(NewPost {
                content,
                user_id: caller.id,
                parent_id,
            })
            .await
            .map_err(DomainError::database)?;

        info!(post_id = post.id, "post created");
        Ok(post)
    }

    /// Posts matching `filter`, each with its author.
    ///
    /// # Errors
    /// Database error, or [`DomainError::Upstream`] when the user service fails.
    #[instrument(skip(self, caller))]
    pub async fn list_posts(
        &self,
        caller: &AuthUser,
        filter: &PostFilter,
    ) -> Result<Vec<AuthoredPost>, DomainError> {
        let posts = self.repo.list(filter).await.map_err(DomainError::database)?;

        let user_ids = extract_unique_by(&posts, |p| p.user_id);
        let users = self.lookup_users(&user_ids, caller).await?;

        Ok(with_authors(posts, &users))
    }

    /// One post with its replies. The author and every distinct reply author
    /// are fetched together.
    ///
    /// # Errors
    /// [`DomainError::PostNotFound`], a database error, or
    /// [`DomainError::Upstream`].
    #[instrument(skip(self, caller))]
    pub async fn get_post(&self, caller: &AuthUser, id: i32) -> Result<PostThread, DomainError> {
        let PostWithChildren { post, children } = self
            .repo
            .find_with_children(id)
            .await
            .map_err(DomainError::database)?
            .ok_or(DomainError::PostNotFound { id })?;

        let everyone: Vec<&Post> = iter::once(&post).chain(children.iter()).collect();
        let user_ids = extract_unique_by(&everyone, |p| p.user_id);
        let users = self.lookup_users(&user_ids, caller).await?;

        Ok(PostThread {
            post: authored(post, &users),
            children: with_authors(children, &users),
        })
    }

    /// # Errors
    /// Validation error, [`DomainError::PostNotFound`],
    /// [`DomainError::NotOwner`] or a database error.
    #[instrument(skip(self, caller, content), fields(user_id = caller.id))]
    pub async fn update_post(
        &self,
        caller: &AuthUser,
        id: i32,
        content: String,
    ) -> Result<Post, DomainError> {
        require_content(&content)?;
        self.owned(caller, id).await?;

        let post = self
            .repo
            .update_content(id, content)
            .await
            .map_err(DomainError::database)?
            .ok_or(DomainError::PostNotFound { id })?;

        info!(post_id = id, "post updated");
        Ok(post)
    }

    /// # Errors
    /// [`DomainError::PostNotFound`], [`DomainError::NotOwner`] or a
    /// database error.
    #[instrument(skip(self, caller), fields(user_id = caller.id))]
    pub async fn delete_post(&self, caller: &AuthUser, id: i32) -> Result<Post, DomainError> {
        self.owned(caller, id).await?;

        let post = self
            .repo
            .delete(id)
            .await
            .map_err(DomainError::database)?
            .ok_or(DomainError::PostNotFound { id })?;

        info!(post_id = id, "post deleted");
        Ok(post)
    }

    async fn owned(&self, caller: &AuthUser, id: i32) -> Result<Post, DomainError> {
        let post = self
            .repo
            .find(id)
            .await
            .map_err(DomainError::database)?
            .ok_or(DomainError::PostNotFound { id })?;

        if post.user_id != caller.id {
            return Err(DomainError::NotOwner { id });
        }
        Ok(post)
    }

    async fn lookup_users(
        &self,
        ids: &[i32],
        caller: &AuthUser,
    ) -> Result<ReferenceIndex<i32, RemoteUser>, DomainError> {
        if ids.is_empty() {
            return Ok(ReferenceIndex::default());
        }
        let users = self.users.get_users(ids, &caller.authorization).await?;
        debug!(requested = ids.len(), found = users.len(), "authors resolved");
        Ok(ReferenceIndex::new(users))
    }
}

fn require_content(content: &str) -> Result<(), DomainError> {
    if content.is_empty() {
        return Err(DomainError::validation("content", "Valid content required"));
    }
    Ok(())
}

fn authored(post: Post, users: &ReferenceIndex<i32, RemoteUser>) -> AuthoredPost {
    let user = Ref::Unresolved(post.user_id).resolve(users);
    AuthoredPost { post, user }
}

fn with_authors(posts: Vec<Post>, users: &ReferenceIndex<i32, RemoteUser>) -> Vec<AuthoredPost> {
    let authors = resolve_all(posts.iter().map(|p| Ref::Unresolved(p.user_id)), users);
    posts
        .into_iter()
        .zip(authors)
        .map(|(post, user)| AuthoredPost { post, user })
        .collect()
}
