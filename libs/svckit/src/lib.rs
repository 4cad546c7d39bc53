#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Runtime pieces shared by the postboard service modules.

pub mod auth;
pub mod db;
pub mod directory;
pub mod filter;
pub mod logging;
pub mod problem;
pub mod remote;

pub use auth::{
    AuthError, AuthState, AuthUser, Authz, HttpTokenVerifier, TokenVerifier, require_auth,
};
pub use db::{DatabaseConfig, DbEngine, DbError, DbHandle};
pub use directory::{HttpPostDirectory, HttpUserDirectory, PostDirectory, RemoteUser, UserDirectory};
pub use filter::FilterBuilder;
pub use logging::{LogFormat, LoggingConfig, init_logging};
pub use problem::{ApiResult, Problem, ValidationViolation, parse_path_id};
pub use remote::{RemoteClient, RemoteError, ServicesConfig};
