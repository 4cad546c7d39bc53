#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Tags service.
//!
//! Tags and post/tag associations live in the local store; the posts they
//! label live in the post service and are fetched on read.

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;
mod module;

pub use config::TagsConfig;
pub use module::TagsModule;
