use thiserror::Error;

/// Every way an access-control decision or account transition can fail.
///
/// Guard failures are raised before any write, so an `Err` never leaves a
/// partial state change behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("This role is not allowed to sign in")]
    RoleForbidden,

    #[error("Account is awaiting administrator approval")]
    PendingApproval,

    #[error("Account is disabled")]
    AccountInactive,

    #[error("Sign-in is not allowed at this time of day")]
    OutsideAllowedHours,

    #[error("Session is no longer valid")]
    SessionRevoked,

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Protected: {0}")]
    ProtectedResource(String),

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Crypto error: {0}")]
    Crypto(String),
}

impl AccessError {
    /// Stable machine-readable code, surfaced next to the message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::RoleForbidden => "role_forbidden",
            Self::PendingApproval => "pending_approval",
            Self::AccountInactive => "account_inactive",
            Self::OutsideAllowedHours => "outside_allowed_hours",
            Self::SessionRevoked => "session_revoked",
            Self::Validation(_) => "validation_error",
            Self::Conflict(_) => "conflict_error",
            Self::ProtectedResource(_) => "protected_resource_error",
            Self::NotFound { .. } => "not_found_error",
            Self::Storage(_) => "storage_error",
            Self::Crypto(_) => "crypto_error",
        }
    }

    pub fn user_not_found(id: &str) -> Self {
        Self::NotFound {
            entity: "User",
            field: "id",
            value: id.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl From<InfraError> for AccessError {
    fn from(e: InfraError) -> Self {
        match e {
            InfraError::Database(db) => AccessError::Storage(db.to_string()),
        }
    }
}

/// Result type for access-control operations
pub type AccessResult<T> = Result<T, AccessError>;
