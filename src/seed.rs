//! Development seed data: one admin account and two sample virtual users.

use std::fmt;

use crate::db::{Database, NewVirtualUser};
use crate::password::{PasswordError, PasswordHasher};

pub const SEED_ADMIN_EMAIL: &str = "admin@example.com";
pub const SEED_ADMIN_USERNAME: &str = "admin";
pub const SEED_ADMIN_PASSWORD: &str = "password123";

/// What the seed run created or found.
#[derive(Debug, Clone)]
pub struct SeedReport {
    pub admin_id: i64,
    pub admin_email: &'static str,
    pub admin_password: &'static str,
    /// False when the admin already existed
    pub admin_created: bool,
    pub virtual_users_created: usize,
}

fn sample_virtual_users() -> Vec<NewVirtualUser> {
    vec![
        NewVirtualUser {
            name: "Engager Taro".to_string(),
            personality: "engager".to_string(),
            gender: "male".to_string(),
            hobbies: r#"["SNS", "communication", "networking"]"#.to_string(),
            active_time: "day".to_string(),
            active_level: 8,
        },
        NewVirtualUser {
            name: "Informer Hanako".to_string(),
            personality: "informer".to_string(),
            gender: "female".to_string(),
            hobbies: r#"["reading", "news", "research"]"#.to_string(),
            active_time: "morning".to_string(),
            active_level: 6,
        },
    ]
}

/// Insert the development admin and sample virtual users.
///
/// Safe to run repeatedly: an existing admin is reused, and virtual users are
/// only added when the admin has none.
pub async fn seed_development_data(
    db: &Database,
    hasher: &PasswordHasher,
) -> Result<SeedReport, SeedError> {
    let users = db.users();

    let (admin, admin_created) = match users.find_by_email(SEED_ADMIN_EMAIL).await? {
        Some(existing) => (existing, false),
        None => {
            let hash = hasher.hash(SEED_ADMIN_PASSWORD).await?;
            let admin = users
                .insert(SEED_ADMIN_EMAIL, SEED_ADMIN_USERNAME, &hash)
                .await?;
            (admin, true)
        }
    };

    let mut virtual_users_created = 0;
    if db.virtual_users().count_by_admin(admin.id).await? == 0 {
        for persona in sample_virtual_users() {
            db.virtual_users().create(admin.id, &persona).await?;
            virtual_users_created += 1;
        }
    }

    Ok(SeedReport {
        admin_id: admin.id,
        admin_email: SEED_ADMIN_EMAIL,
        admin_password: SEED_ADMIN_PASSWORD,
        admin_created,
        virtual_users_created,
    })
}

#[derive(Debug)]
pub enum SeedError {
    Database(sqlx::Error),
    Password(PasswordError),
}

impl From<sqlx::Error> for SeedError {
    fn from(e: sqlx::Error) -> Self {
        SeedError::Database(e)
    }
}

impl From<PasswordError> for SeedError {
    fn from(e: PasswordError) -> Self {
        SeedError::Password(e)
    }
}

impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedError::Database(e) => write!(f, "Database error: {}", e),
            SeedError::Password(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SeedError {}
