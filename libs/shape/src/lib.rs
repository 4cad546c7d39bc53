#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Response shaping helpers shared by the postboard services.
//!
//! Subject records come from the local store, reference records come from a
//! sibling service over HTTP, so they can't be joined in SQL. This crate does
//! the in-memory left outer join and the reshaping that happens right before
//! a payload is serialized:
//!
//! - [`record`] - key extraction, renaming, deletion and deduplication on loose JSON records
//! - [`join`] - substitution of a foreign key with its matching reference record
//! - [`reference`] - the typed form of the same join (`Ref::Unresolved` / `Ref::Resolved`)
//! - [`aggregate`] - grouping post/tag join rows into one entry per post
//! - [`batch`] - concurrent lookups collected in input order
//! - [`validate`] - input checks used by the request layer

pub mod aggregate;
pub mod batch;
pub mod join;
pub mod record;
pub mod reference;
pub mod validate;

pub use aggregate::{PostTagRow, PostTags, TagRef, aggregate_tags_by_post};
pub use batch::{map_concurrently, map_concurrently_compact};
pub use join::{substitute_matching_reference, substitute_matching_reference_in_array};
pub use record::{
    Record, ShapeError, dedupe_by_identity, delete_field, extract_unique_by, extract_unique_key,
    rename_field, rename_field_in_array, to_records,
};
pub use reference::{Identified, Ref, ReferenceIndex, resolve_all};
pub use validate::{ParseIdListError, is_alphanumeric_with_hyphen, parse_id_list};
