#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Posts service.
//!
//! Posts live in the local store; their authors live in the user service.
//! Every read resolves `userId` into a `user` record in one batched remote
//! call per request.

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;
mod module;

pub use config::PostsConfig;
pub use module::PostsModule;
