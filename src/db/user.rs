use serde::Serialize;
use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

/// Admin account record, including the password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminUser {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

/// User fields that are safe to return to clients.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub created_at: String,
}

impl From<&AdminUser> for PublicUser {
    fn from(user: &AdminUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            created_at: user.created_at.clone(),
        }
    }
}

const USER_COLUMNS: &str = "id, email, username, password_hash, created_at, updated_at";

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new admin user and return the stored record.
    /// Fails with a unique violation if the email or username is taken.
    pub async fn insert(
        &self,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<AdminUser, sqlx::Error> {
        let sql = format!(
            "INSERT INTO admin_users (email, username, password_hash) VALUES (?, ?, ?) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as(sqlx::AssertSqlSafe(sql))
            .bind(email)
            .bind(username)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
    }

    /// Get any user whose email or username matches.
    pub async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<AdminUser>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM admin_users WHERE email = ? OR username = ? LIMIT 1",
            USER_COLUMNS
        );
        sqlx::query_as(sqlx::AssertSqlSafe(sql))
            .bind(email)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
    }

    /// Get a user by email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<AdminUser>, sqlx::Error> {
        let sql = format!("SELECT {} FROM admin_users WHERE email = ?", USER_COLUMNS);
        sqlx::query_as(sqlx::AssertSqlSafe(sql))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<AdminUser>, sqlx::Error> {
        let sql = format!("SELECT {} FROM admin_users WHERE id = ?", USER_COLUMNS);
        sqlx::query_as(sqlx::AssertSqlSafe(sql))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }
}
