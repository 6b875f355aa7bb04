use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rahhal_core::repository::{RepoResult, UserRepository};
use rahhal_core::user::{Permissions, User};
use sqlx::PgPool;
use uuid::Uuid;

pub struct StoreUserRepository {
    pool: PgPool,
}

impl StoreUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, name, email, phone, role, can_manage_bookings, \
    can_manage_packages, can_view_analytics, is_active, password_hash, \
    failed_login_attempts, locked_until, created_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    role: String,
    can_manage_bookings: bool,
    can_manage_packages: bool,
    can_view_analytics: bool,
    is_active: bool,
    password_hash: String,
    failed_login_attempts: i32,
    locked_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> RepoResult<User> {
        Ok(User {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            role: self.role.parse()?,
            permissions: Permissions {
                can_manage_bookings: self.can_manage_bookings,
                can_manage_packages: self.can_manage_packages,
                can_view_analytics: self.can_view_analytics,
            },
            is_active: self.is_active,
            password_hash: self.password_hash,
            failed_login_attempts: self.failed_login_attempts,
            locked_until: self.locked_until,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl UserRepository for StoreUserRepository {
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn record_login_failure(
        &self,
        id: Uuid,
        attempts: i32,
        locked_until: Option<DateTime<Utc>>,
    ) -> RepoResult<()> {
        sqlx::query(
            "UPDATE users SET failed_login_attempts = $2, locked_until = $3, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(attempts)
        .bind(locked_until)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_login_success(&self, id: Uuid) -> RepoResult<()> {
        sqlx::query(
            "UPDATE users SET failed_login_attempts = 0, locked_until = NULL, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
