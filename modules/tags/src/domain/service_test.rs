#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use shape::{PostTagRow, Record, TagRef};
use svckit::{AuthUser, PostDirectory, RemoteError};
use time::OffsetDateTime;

use super::error::DomainError;
use super::model::{PostTag, Tag, TagFilter};
use super::repo::TagsRepository;
use super::service::Service;

#[derive(Default)]
struct MemoryRepo {
    tags: Mutex<Vec<Tag>>,
    links: Mutex<Vec<PostTag>>,
}

impl MemoryRepo {
    fn tag_named(&self, name: &str) -> Option<Tag> {
        self.tags.lock().unwrap().iter().find(|t| t.name == name).cloned()
    }
}

#[async_trait]
impl TagsRepository for MemoryRepo {
    async fn find(&self, id: i32) -> anyhow::Result<Option<Tag>> {
        Ok(self.tags.lock().unwrap().iter().find(|t| t.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Tag>> {
        Ok(self.tag_named(name))
    }

    async fn list(&self, filter: &TagFilter) -> anyhow::Result<Vec<Tag>> {
        Ok(self
            .tags
            .lock()
            .unwrap()
            .iter()
            .filter(|t| filter.ids.as_ref().is_none_or(|ids| ids.contains(&t.id)))
            .filter(|t| {
                filter
                    .search
                    .as_ref()
                    .is_none_or(|q| t.name.contains(q.as_str()))
            })
            .cloned()
            .collect())
    }

    async fn find_or_create(&self, name: &str) -> anyhow::Result<Tag> {
        let mut tags = self.tags.lock().unwrap();
        if let Some(found) = tags.iter().find(|t| t.name == name) {
            return Ok(found.clone());
        }
        let tag = Tag {
            id: tags.iter().map(|t| t.id).max().unwrap_or(0) + 1,
            name: name.to_owned(),
        };
        tags.push(tag.clone());
        Ok(tag)
    }

    async fn rename(&self, id: i32, name: String) -> anyhow::Result<Option<Tag>> {
        let mut tags = self.tags.lock().unwrap();
        Ok(tags.iter_mut().find(|t| t.id == id).map(|t| {
            t.name = name;
            t.clone()
        }))
    }

    async fn delete(&self, id: i32) -> anyhow::Result<Option<Tag>> {
        let mut tags = self.tags.lock().unwrap();
        let Some(pos) = tags.iter().position(|t| t.id == id) else {
            return Ok(None);
        };
        self.links.lock().unwrap().retain(|l| l.tag_id != id);
        Ok(Some(tags.remove(pos)))
    }

    async fn links_for_tag(&self, tag_id: i32) -> anyhow::Result<Vec<PostTag>> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.tag_id == tag_id)
            .cloned()
            .collect())
    }

    async fn tags_for_post(&self, post_id: i32) -> anyhow::Result<Vec<PostTagRow>> {
        let tags = self.tags.lock().unwrap();
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.post_id == post_id)
            .filter_map(|l| {
                tags.iter().find(|t| t.id == l.tag_id).map(|t| PostTagRow {
                    post_id,
                    tag: TagRef {
                        id: t.id,
                        name: t.name.clone(),
                    },
                })
            })
            .collect())
    }

    async fn attach(&self, post_id: i32, tag_ids: &[i32]) -> anyhow::Result<()> {
        let mut links = self.links.lock().unwrap();
        for &tag_id in tag_ids {
            if !links.iter().any(|l| l.post_id == post_id && l.tag_id == tag_id) {
                links.push(PostTag {
                    post_id,
                    tag_id,
                    created_at: OffsetDateTime::now_utc(),
                });
            }
        }
        Ok(())
    }

    async fn detach(&self, post_id: i32, tag_ids: &[i32]) -> anyhow::Result<()> {
        self.links
            .lock()
            .unwrap()
            .retain(|l| l.post_id != post_id || !tag_ids.contains(&l.tag_id));
        Ok(())
    }
}

/// Post 1 belongs to user 5 (resolved author), post 2 to user 7 (raw
/// `userId`); every other id is unknown.
#[derive(Default)]
struct StubPosts {
    batch_calls: AtomicUsize,
}

fn remote_post(id: i32) -> Option<Record> {
    let value = match id {
        1 => json!({"id": 1, "content": "one", "user": {"id": 5}}),
        2 => json!({"id": 2, "content": "two", "userId": 7}),
        _ => return None,
    };
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

#[async_trait]
impl PostDirectory for StubPosts {
    async fn get_posts(
        &self,
        ids: &[i32],
        _authorization: &str,
    ) -> Result<Vec<Record>, RemoteError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ids.iter().filter_map(|&id| remote_post(id)).collect())
    }

    async fn get_post_by_id(
        &self,
        id: i32,
        _authorization: &str,
    ) -> Result<Option<Record>, RemoteError> {
        Ok(remote_post(id))
    }
}

fn caller(id: i32) -> AuthUser {
    AuthUser {
        id,
        authorization: "Bearer t".to_owned(),
    }
}

fn service() -> (Service, Arc<MemoryRepo>, Arc<StubPosts>) {
    let repo = Arc::new(MemoryRepo::default());
    let posts = Arc::new(StubPosts::default());
    (Service::new(repo.clone(), posts.clone()), repo, posts)
}

#[tokio::test]
async fn assigning_twice_does_not_duplicate() {
    let (svc, repo, _) = service();
    let names = vec!["rust".to_owned(), "async".to_owned(), "rust".to_owned()];

    svc.assign_tags(&caller(5), 1, &names).await.unwrap();
    let out = svc.assign_tags(&caller(5), 1, &names).await.unwrap();

    assert_eq!(out.post_id, 1);
    let tag_names: Vec<&str> = out.tag.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tag_names, vec!["rust", "async"]);
    assert_eq!(repo.links.lock().unwrap().len(), 2);
    assert_eq!(repo.tags.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn only_the_post_owner_may_tag_it() {
    let (svc, _, _) = service();
    let names = vec!["rust".to_owned()];

    let err = svc.assign_tags(&caller(7), 1, &names).await.unwrap_err();
    assert!(matches!(err, DomainError::NotOwner { id: 1 }));

    let err = svc.assign_tags(&caller(5), 3, &names).await.unwrap_err();
    assert!(matches!(err, DomainError::PostNotFound { id: 3 }));

    let out = svc.assign_tags(&caller(7), 2, &names).await.unwrap();
    assert_eq!(out.tag.len(), 1);
}

#[tokio::test]
async fn bad_tag_names_are_rejected_before_any_lookup() {
    let (svc, repo, _) = service();

    let err = svc
        .assign_tags(&caller(5), 1, &["ok".to_owned(), "not ok".to_owned()])
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "tags"));
    assert!(repo.tags.lock().unwrap().is_empty());
}

#[tokio::test]
async fn post_tags_groups_rows_per_post() {
    let (svc, _, _) = service();
    svc.assign_tags(&caller(5), 1, &["rust".to_owned(), "web".to_owned()])
        .await
        .unwrap();
    svc.assign_tags(&caller(7), 2, &["rust".to_owned()])
        .await
        .unwrap();

    let out = svc.post_tags(&[2, 1, 9]).await.unwrap();

    let ids: Vec<i32> = out.iter().map(|p| p.post_id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert_eq!(out[1].tag.len(), 2);
}

#[tokio::test]
async fn tag_lists_each_known_post_once() {
    let (svc, repo, posts) = service();
    let rust = repo.find_or_create("rust").await.unwrap();
    repo.attach(1, &[rust.id]).await.unwrap();
    repo.attach(2, &[rust.id]).await.unwrap();
    repo.attach(8, &[rust.id]).await.unwrap();

    let out = svc.get_tag(&caller(5), rust.id).await.unwrap();

    assert_eq!(out.tag, rust);
    assert_eq!(posts.batch_calls.load(Ordering::SeqCst), 1);
    let ids: Vec<&Value> = out.posts.iter().map(|p| &p["id"]).collect();
    assert_eq!(ids, vec![&json!(1), &json!(2)]);
}

#[tokio::test]
async fn untagged_tag_skips_the_post_service() {
    let (svc, repo, posts) = service();
    let tag = repo.find_or_create("lonely").await.unwrap();

    let out = svc.get_tag(&caller(5), tag.id).await.unwrap();

    assert!(out.posts.is_empty());
    assert_eq!(posts.batch_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn removing_tags_returns_what_is_left() {
    let (svc, _, _) = service();
    let out = svc
        .assign_tags(&caller(5), 1, &["rust".to_owned(), "web".to_owned()])
        .await
        .unwrap();
    let rust_id = out.tag[0].id;

    let left = svc.remove_tags(&caller(5), 1, &[rust_id]).await.unwrap();
    assert_eq!(left.tag.len(), 1);
    assert_eq!(left.tag[0].name, "web");

    let left = svc
        .remove_tags(&caller(5), 1, &[left.tag[0].id])
        .await
        .unwrap();
    assert_eq!(left.post_id, 1);
    assert!(left.tag.is_empty());

    let err = svc.remove_tags(&caller(7), 1, &[rust_id]).await.unwrap_err();
    assert!(matches!(err, DomainError::NotOwner { id: 1 }));
}

#[tokio::test]
async fn rename_refuses_a_taken_name() {
    let (svc, _, _) = service();
    let rust = svc.create_tag("rust").await.unwrap();
    svc.create_tag("go").await.unwrap();

    let err = svc.rename_tag(rust.id, "go").await.unwrap_err();
    assert!(matches!(err, DomainError::NameTaken { .. }));

    let same = svc.rename_tag(rust.id, "rust").await.unwrap();
    assert_eq!(same.name, "rust");

    let err = svc.rename_tag(42, "new").await.unwrap_err();
    assert!(matches!(err, DomainError::TagNotFound { id: 42 }));
}

#[tokio::test]
async fn delete_drops_the_tag_from_every_post() {
    let (svc, _, _) = service();
    let out = svc
        .assign_tags(&caller(5), 1, &["rust".to_owned()])
        .await
        .unwrap();

    svc.delete_tag(out.tag[0].id).await.unwrap();

    assert!(svc.post_tags(&[1]).await.unwrap().is_empty());
    let err = svc.delete_tag(out.tag[0].id).await.unwrap_err();
    assert!(matches!(err, DomainError::TagNotFound { .. }));
}
