use svckit::RemoteError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Tag not found: {id}")]
    TagNotFound { id: i32 },

    #[error("Tag name already taken: {name}")]
    NameTaken { name: String },

    #[error("Post not found: {id}")]
    PostNotFound { id: i32 },

    #[error("Post {id} belongs to another user")]
    NotOwner { id: i32 },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Post service lookup failed: {0}")]
    Upstream(#[from] RemoteError),

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn database(e: impl std::fmt::Display) -> Self {
        Self::Database {
            message: e.to_string(),
        }
    }
}
