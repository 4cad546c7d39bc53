//! Grouping of post/tag join rows into one entry per post.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Tag reference embedded in a join row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub id: i32,
    pub name: String,
}

/// One post/tag association with its tag inflated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostTagRow {
    pub post_id: i32,
    pub tag: TagRef,
}

/// All tags of one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostTags {
    pub post_id: i32,
    pub tag: Vec<TagRef>,
}

/// Merge join rows from every group into one [`PostTags`] per distinct post.
///
/// Posts and tags keep first-seen order. A tag already listed for a post is
/// skipped, and a post only appears if at least one row names it.
#[must_use]
pub fn aggregate_tags_by_post(groups: &[Vec<PostTagRow>]) -> Vec<PostTags> {
    let mut out: Vec<PostTags> = Vec::new();
    let mut slots: HashMap<i32, usize> = HashMap::new();

    for row in groups.iter().flatten() {
        let slot = *slots.entry(row.post_id).or_insert_with(|| {
            out.push(PostTags {
                post_id: row.post_id,
                tag: Vec::new(),
            });
            out.len() - 1
        });

        let tags = &mut out[slot].tag;
        if !tags.iter().any(|t| t.id == row.tag.id) {
            tags.push(row.tag.clone());
        }
    }

    out
}
