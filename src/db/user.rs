//! User model for blogo.

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Login name (unique).
    pub name: String,
    /// Account creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}
