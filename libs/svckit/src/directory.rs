//! Ports for the user and post sibling services, plus their HTTP adapters.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shape::{Identified, Record};
use tracing::instrument;

use crate::remote::{RemoteClient, RemoteError};

/// User record as the user service returns it. Only `id` is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub id: i32,
    #[serde(flatten)]
    pub attributes: Record,
}

impl Identified for RemoteUser {
    type Id = i32;

    fn id(&self) -> i32 {
        self.id
    }
}

/// Batched lookups against the user service.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Users for `ids`. Unknown ids are simply missing from the result.
    async fn get_users(&self, ids: &[i32], authorization: &str)
    -> Result<Vec<RemoteUser>, RemoteError>;
}

/// Lookups against the post service.
#[async_trait]
pub trait PostDirectory: Send + Sync {
    async fn get_posts(&self, ids: &[i32], authorization: &str) -> Result<Vec<Record>, RemoteError>;

    /// `None` when the post service doesn't know the id.
    async fn get_post_by_id(
        &self,
        id: i32,
        authorization: &str,
    ) -> Result<Option<Record>, RemoteError>;
}

fn join_ids(ids: &[i32]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// `GET {base}/user?id=1,2`
pub struct HttpUserDirectory {
    client: Arc<RemoteClient>,
}

impl HttpUserDirectory {
    #[must_use]
    pub fn new(client: Arc<RemoteClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    #[instrument(skip_all, fields(base = %self.client.base_url(), count = ids.len()))]
    async fn get_users(
        &self,
        ids: &[i32],
        authorization: &str,
    ) -> Result<Vec<RemoteUser>, RemoteError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = join_ids(ids);
        self.client
            .get_json(&["user"], &[("id", ids.as_str())], Some(authorization))
            .await
    }
}

/// `GET {base}/post?id=1,2` and `GET {base}/post/{id}`
pub struct HttpPostDirectory {
    client: Arc<RemoteClient>,
}

impl HttpPostDirectory {
    #[must_use]
    pub fn new(client: Arc<RemoteClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PostDirectory for HttpPostDirectory {
    #[instrument(skip_all, fields(base = %self.client.base_url(), count = ids.len()))]
    async fn get_posts(
        &self,
        ids: &[i32],
        authorization: &str,
    ) -> Result<Vec<Record>, RemoteError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = join_ids(ids);
        self.client
            .get_json(&["post"], &[("id", ids.as_str())], Some(authorization))
            .await
    }

    #[instrument(skip_all, fields(base = %self.client.base_url(), post_id = id))]
    async fn get_post_by_id(
        &self,
        id: i32,
        authorization: &str,
    ) -> Result<Option<Record>, RemoteError> {
        let id = id.to_string();
        self.client
            .get_json_opt(&["post", id.as_str()], &[], Some(authorization))
            .await
    }
}
