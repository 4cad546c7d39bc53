use svckit::Problem;

use crate::domain::error::DomainError;

impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::TagNotFound { id } => Problem::not_found(format!("Tag not found: {id}")),
            DomainError::NameTaken { name } => {
                Problem::invalid_field("name", format!("Tag name '{name}' is already taken"))
            }
            DomainError::PostNotFound { id } => {
                Problem::not_found(format!("Post not found: {id}"))
            }
            DomainError::NotOwner { id } => {
                Problem::forbidden(format!("Post {id} belongs to another user"))
            }
            DomainError::Validation { field, message } => Problem::invalid_field(field, message),
            DomainError::Upstream(err) => {
                tracing::warn!(error = %err, "post service lookup failed");
                Problem::bad_gateway("Could not reach the post service")
            }
            DomainError::Database { message } => {
                tracing::error!(error = %message, "database error");
                Problem::internal()
            }
        }
    }
}
