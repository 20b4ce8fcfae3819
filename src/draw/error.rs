use crate::draw::model::EntityId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("no entity with id {0}")]
    NotFound(EntityId),
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),
}

impl EditorError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn precondition(msg: impl Into<String>) -> Self {
        Self::PreconditionViolation(msg.into())
    }
}

pub type EditorResult<T> = std::result::Result<T, EditorError>;
