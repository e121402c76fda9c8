use crate::types::DbId;
use crate::validation::FieldViolation;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// One entry per failing field constraint, never empty.
    #[error("Validation failed for {} field constraint(s)", .0.len())]
    InvalidFields(Vec<FieldViolation>),

    #[error("Internal error: {0}")]
    Internal(String),
}
