//! Database repository for admin user accounts.
//!
//! Accounts are only ever created or updated by the startup admin
//! provisioning and looked up by email at login, so this repository stays
//! off the [`super::Repository`] trait and exposes just those operations.

use crate::db::{
    errors::{DbError, Result},
    models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
};
use crate::types::{UserId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    pub async fn create(&mut self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        let user = sqlx::query_as::<_, UserDBResponse>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&request.username)
        .bind(&request.email)
        .bind(&request.password_hash)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&id)), err)]
    pub async fn update(&mut self, id: UserId, request: &UserUpdateDBRequest) -> Result<UserDBResponse> {
        let user = sqlx::query_as::<_, UserDBResponse>(
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                password_hash = COALESCE($3, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.username)
        .bind(&request.password_hash)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(user)
    }

    #[instrument(skip(self), fields(email = %email), err)]
    pub async fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    fn sample_user(email: &str) -> UserCreateDBRequest {
        UserCreateDBRequest {
            username: email.split('@').next().unwrap().to_string(),
            email: email.to_string(),
            password_hash: Some("$argon2id$fake".to_string()),
        }
    }

    #[sqlx::test]
    async fn create_and_fetch_by_email(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let created = repo.create(&sample_user("admin@example.com")).await.unwrap();
        assert_eq!(created.username, "admin");

        let found = repo.get_user_by_email("admin@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);

        assert!(repo.get_user_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn duplicate_email_is_a_unique_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.create(&sample_user("admin@example.com")).await.unwrap();
        let err = repo.create(&sample_user("admin@example.com")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    async fn update_replaces_password_hash_only_when_given(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let user = repo.create(&sample_user("admin@example.com")).await.unwrap();

        let updated = repo
            .update(
                user.id,
                &UserUpdateDBRequest {
                    password_hash: Some("$argon2id$new".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.password_hash.as_deref(), Some("$argon2id$new"));
        assert_eq!(updated.username, user.username);
    }

    #[sqlx::test]
    async fn update_missing_user_is_not_found(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let err = repo.update(uuid::Uuid::new_v4(), &UserUpdateDBRequest::default()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }
}
