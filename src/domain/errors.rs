use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Order {order_number} is already {status}")]
    TerminalStatus { order_number: String, status: String },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        DomainError::NotFound { entity, id }
    }
}
