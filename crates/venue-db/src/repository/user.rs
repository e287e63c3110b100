//! # User Repository
//!
//! Staff accounts. Credentials are stored as given; checking them is the
//! calling layer's job.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use venue_core::{User, UserRole};

/// Repository for staff accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets a user by exact username.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password, role FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Inserts a user.
    ///
    /// ## Errors
    /// `UniqueViolation` when the username is taken.
    pub async fn insert(&self, username: &str, password: &str, role: UserRole) -> DbResult<User> {
        debug!(username = %username, role = ?role, "Inserting user");

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password, role) VALUES (?1, ?2, ?3) \
             RETURNING id, username, password, role",
        )
        .bind(username)
        .bind(password)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Number of users.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();

        let admin = users.insert("admin", "123", UserRole::Admin).await.unwrap();
        users.insert("staff", "123", UserRole::Staff).await.unwrap();
        assert_eq!(users.count().await.unwrap(), 2);

        let found = users.get_by_username("admin").await.unwrap().unwrap();
        assert_eq!(found, admin);
        assert_eq!(found.role, UserRole::Admin);
        assert!(users.get_by_username("Admin").await.unwrap().is_none());

        let err = users.insert("admin", "x", UserRole::Staff).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
