use crate::application::observation_repository::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Fountain {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateName(_) => {
                ServiceError::Invalid("Fountain name already exists.".to_string())
            }
            RepositoryError::UnknownFountain(id) => ServiceError::NotFound(id),
            RepositoryError::Backend(e) => ServiceError::Internal(e),
        }
    }
}
