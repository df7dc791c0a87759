//! User repository for blogo.

use super::{DbPool, User};
use crate::{BlogoError, Result};

/// Repository for user operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Register a new user.
    ///
    /// Fails with a validation error if the name is empty or already taken.
    pub async fn create(&self, name: &str) -> Result<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BlogoError::Validation("user name must not be empty".into()));
        }
        if self.exists(name).await? {
            return Err(BlogoError::Validation(format!(
                "user \"{name}\" already exists"
            )));
        }

        let result = sqlx::query("INSERT INTO users (name) VALUES (?)")
            .bind(name)
            .execute(self.pool)
            .await?;

        self.get_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| BlogoError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, created_at, updated_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by name.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, created_at, updated_at FROM users WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Check whether a user with this name exists.
    pub async fn exists(&self, name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE name = ?)")
            .bind(name)
            .fetch_one(self.pool)
            .await?;
        Ok(exists)
    }

    /// List all users in registration order.
    pub async fn list_all(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, created_at, updated_at FROM users ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        let user = repo.create("alice").await.unwrap();
        assert!(user.id > 0);
        assert_eq!(user.name, "alice");

        let by_id = repo.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id, user);

        let by_name = repo.get_by_name("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
    }

    #[tokio::test]
    async fn test_create_duplicate_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        repo.create("alice").await.unwrap();
        let result = repo.create("alice").await;
        assert!(matches!(result, Err(BlogoError::Validation(msg)) if msg.contains("already exists")));
    }

    #[tokio::test]
    async fn test_create_empty_name() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        assert!(matches!(
            repo.create("   ").await,
            Err(BlogoError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_exists_and_list() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());

        assert!(!repo.exists("bob").await.unwrap());
        repo.create("bob").await.unwrap();
        repo.create("carol").await.unwrap();
        assert!(repo.exists("bob").await.unwrap());

        let names: Vec<String> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["bob", "carol"]);
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let db = setup_db().await;
        let repo = UserRepository::new(db.pool());
        assert!(repo.get_by_name("nobody").await.unwrap().is_none());
    }
}
