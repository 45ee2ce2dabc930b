use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub created_at: OffsetDateTime,
}

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by id.
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with hashed password. Runs inside the caller's
    /// transaction so the account and its profile commit together.
    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut **tx)
        .await?;
        Ok(user)
    }
}

#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::error::is_unique_violation;

    #[sqlx::test]
    async fn duplicate_email_surfaces_as_unique_violation(pool: PgPool) {
        let mut tx = pool.begin().await.expect("begin");
        User::create(&mut tx, "dup@example.com", "hash-one")
            .await
            .expect("first insert");
        tx.commit().await.expect("commit");

        let mut tx = pool.begin().await.expect("begin");
        let err = User::create(&mut tx, "dup@example.com", "hash-two")
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
    }
}
