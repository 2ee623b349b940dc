use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure of a remote function call (stock reservation, payment gateway).
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never produced a usable response.
    #[error("transport error: {0}")]
    Transport(String),
    /// The remote function answered but refused the request.
    #[error("rejected: {0}")]
    Rejected(String),
}

const DUPLICATE_KEY: &str = "Există deja o înregistrare cu aceste date.";
const NOT_NULL: &str = "Completează toate câmpurile obligatorii.";
const PERMISSION: &str = "Nu ai permisiunea de a efectua această operațiune.";
const FOREIGN_KEY: &str =
    "Înregistrarea este folosită în altă parte și nu poate fi modificată sau ștearsă.";

/// Translate a raw Postgres error message into a domain error carrying a
/// Romanian message for the known failure shapes.
pub fn classify_database_message(raw: &str) -> DomainError {
    if raw.contains("duplicate key") {
        DomainError::Conflict(DUPLICATE_KEY.to_string())
    } else if raw.contains("not-null constraint") {
        DomainError::InvalidInput(NOT_NULL.to_string())
    } else if raw.contains("permission denied") {
        DomainError::PermissionDenied(PERMISSION.to_string())
    } else if raw.contains("foreign key constraint") {
        DomainError::Conflict(FOREIGN_KEY.to_string())
    } else {
        DomainError::Internal(raw.to_string())
    }
}
