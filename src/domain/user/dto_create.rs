use super::UserRole;

/// Fully-resolved insert: the secret is already hashed and the
/// approval flags are decided by the caller.
#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub identifier: String,
    pub name: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_approved: bool,
    pub is_active: bool,
}
