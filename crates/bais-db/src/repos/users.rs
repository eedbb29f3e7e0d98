//! User repository.

use sqlx::{Row, SqlitePool};
use tracing::info;

use bais_models::{Team, UserRecord};

use crate::error::{DbError, DbResult};

use super::parse_ts;

/// Repository for user accounts.
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user. Fails on a duplicate email.
    pub async fn create(&self, user: &UserRecord) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO users
                (user_id, email, password_hash, favorite_team, free_play_used,
                 storage_used_bytes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.user_id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.favorite_team.map(|t| t.as_str().to_string()))
        .bind(user.free_play_used)
        .bind(user.storage_used_bytes as i64)
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {
                info!(user_id = %user.user_id, "Created user");
                Ok(())
            }
            Err(e) if e.to_string().contains("UNIQUE") => {
                Err(DbError::Duplicate(format!("email {}", user.email)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Get a user by id.
    pub async fn get(&self, user_id: &str) -> DbResult<Option<UserRecord>> {
        let row = sqlx::query("SELECT * FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_user).transpose()
    }

    /// Get a user by email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<UserRecord>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_user).transpose()
    }

    /// Mark the single free highlight play as consumed.
    pub async fn set_free_play_used(&self, user_id: &str) -> DbResult<()> {
        sqlx::query("UPDATE users SET free_play_used = 1 WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Adjust the storage accounting by `delta` bytes (never below zero).
    pub async fn add_storage_used(&self, user_id: &str, delta: i64) -> DbResult<()> {
        sqlx::query(
            "UPDATE users SET storage_used_bytes = MAX(0, storage_used_bytes + ?) WHERE user_id = ?",
        )
        .bind(delta)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn row_to_user(row: sqlx::sqlite::SqliteRow) -> DbResult<UserRecord> {
    let created_at = parse_ts(&row.get::<String, _>("created_at"))?;
    let favorite_team = row
        .get::<Option<String>, _>("favorite_team")
        .as_deref()
        .and_then(Team::from_str);

    Ok(UserRecord {
        user_id: row.get("user_id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        favorite_team,
        free_play_used: row.get("free_play_used"),
        storage_used_bytes: row.get::<i64, _>("storage_used_bytes").max(0) as u64,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn repo() -> UserRepository {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        UserRepository::new(db.pool().clone())
    }

    #[tokio::test]
    async fn test_create_and_fetch_user() {
        let repo = repo().await;
        let user = UserRecord::new("fan@example.com", "digest", Some(Team::Lotte));
        repo.create(&user).await.unwrap();

        let fetched = repo.get(&user.user_id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "fan@example.com");
        assert_eq!(fetched.favorite_team, Some(Team::Lotte));
        assert!(!fetched.free_play_used);

        let by_email = repo.get_by_email("fan@example.com").await.unwrap();
        assert!(by_email.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = repo().await;
        let user = UserRecord::new("dup@example.com", "digest", None);
        repo.create(&user).await.unwrap();

        let again = UserRecord::new("dup@example.com", "digest", None);
        let err = repo.create(&again).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_storage_accounting_floor() {
        let repo = repo().await;
        let user = UserRecord::new("s@example.com", "digest", None);
        repo.create(&user).await.unwrap();

        repo.add_storage_used(&user.user_id, 1000).await.unwrap();
        repo.add_storage_used(&user.user_id, -5000).await.unwrap();

        let fetched = repo.get(&user.user_id).await.unwrap().unwrap();
        assert_eq!(fetched.storage_used_bytes, 0);
    }

    #[tokio::test]
    async fn test_free_play_flag() {
        let repo = repo().await;
        let user = UserRecord::new("f@example.com", "digest", None);
        repo.create(&user).await.unwrap();

        repo.set_free_play_used(&user.user_id).await.unwrap();
        assert!(repo.get(&user.user_id).await.unwrap().unwrap().free_play_used);
    }
}
