//! Virtual users: simulated personas owned by an admin user.

use serde::Serialize;
use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct VirtualUserStore {
    pool: SqlitePool,
}

/// Fields needed to create a virtual user.
#[derive(Debug, Clone)]
pub struct NewVirtualUser {
    pub name: String,
    pub personality: String,
    pub gender: String,
    /// JSON array of hobby strings
    pub hobbies: String,
    pub active_time: String,
    /// Activity level, 0 to 10
    pub active_level: i64,
}

/// Virtual user summary embedded in the `/me` response.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VirtualUserSummary {
    pub id: i64,
    pub name: String,
    pub personality: String,
    pub total_tweets: i64,
    pub total_followers: i64,
    pub total_following: i64,
}

impl VirtualUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a virtual user owned by `admin_user_id`. Returns the new ID.
    pub async fn create(
        &self,
        admin_user_id: i64,
        new: &NewVirtualUser,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO virtual_users (admin_user_id, name, personality, gender, hobbies, active_time, active_level)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(admin_user_id)
        .bind(&new.name)
        .bind(&new.personality)
        .bind(&new.gender)
        .bind(&new.hobbies)
        .bind(&new.active_time)
        .bind(new.active_level.clamp(0, 10))
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// List all virtual users owned by an admin, oldest first.
    pub async fn list_by_admin(
        &self,
        admin_user_id: i64,
    ) -> Result<Vec<VirtualUserSummary>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, name, personality, total_tweets, total_followers, total_following
             FROM virtual_users WHERE admin_user_id = ? ORDER BY id",
        )
        .bind(admin_user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Count the virtual users owned by an admin.
    pub async fn count_by_admin(&self, admin_user_id: i64) -> Result<i64, sqlx::Error> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM virtual_users WHERE admin_user_id = ?")
                .bind(admin_user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0)
    }
}
