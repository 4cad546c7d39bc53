use svckit::Problem;

use crate::domain::error::DomainError;

impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::PostNotFound { id } => Problem::not_found(format!("Post not found: {id}")),
            DomainError::ParentNotFound { id } => {
                Problem::invalid_field("parentId", format!("Parent post {id} does not exist"))
            }
            DomainError::NotOwner { id } => {
                Problem::forbidden(format!("Post {id} belongs to another user"))
            }
            DomainError::Validation { field, message } => Problem::invalid_field(field, message),
            DomainError::Upstream(err) => {
                tracing::warn!(error = %err, "user service lookup failed");
                Problem::bad_gateway("Could not resolve post authors")
            }
            DomainError::Database { message } => {
                tracing::error!(error = %message, "database error");
                Problem::internal()
            }
        }
    }
}
