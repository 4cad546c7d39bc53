//! Entity to domain model mappers.

use shape::{PostTagRow, TagRef};

use super::entity::{post_tag, tag};
use crate::domain::model::{PostTag, Tag};

impl From<tag::Model> for Tag {
    fn from(model: tag::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

impl From<post_tag::Model> for PostTag {
    fn from(model: post_tag::Model) -> Self {
        Self {
            post_id: model.post_id,
            tag_id: model.tag_id,
            created_at: model.created_at,
        }
    }
}

/// Join row with its tag inflated.
#[must_use]
pub fn to_post_tag_row(link: &post_tag::Model, tag: tag::Model) -> PostTagRow {
    PostTagRow {
        post_id: link.post_id,
        tag: TagRef {
            id: tag.id,
            name: tag.name,
        },
    }
}
