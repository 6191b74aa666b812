//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::db::Database;
use crate::password::PasswordHasher;
use crate::rate_limit::DEFAULT_AUTH_REQUESTS_PER_MINUTE;
use crate::seed::seed_development_data;
use clap::Parser;
use tracing::{error, info};
use url::Url;

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// Deployment mode. Production turns on secure cookies, HSTS and strict CORS.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunMode {
    #[default]
    Development,
    Production,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "virtualsns",
    about = "Admin API for managing virtual SNS users"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "virtualsns.db")]
    pub database: String,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Deployment mode
    #[arg(short, long, env = "APP_MODE", value_enum, default_value = "development")]
    pub mode: RunMode,

    /// Origin allowed to make credentialed cross-origin requests in production
    #[arg(long, env = "ORIGIN")]
    pub cors_origin: Option<String>,

    /// Login and registration requests allowed per minute per client IP
    #[arg(long, default_value_t = DEFAULT_AUTH_REQUESTS_PER_MINUTE)]
    pub auth_rate_limit: u32,

    /// Take the client IP from X-Forwarded-For (only behind a trusted proxy)
    #[arg(long)]
    pub behind_proxy: bool,

    /// Insert the development admin and sample virtual users on startup
    #[arg(long)]
    pub seed: bool,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    validate_jwt_secret(secret)
}

fn validate_jwt_secret(secret: String) -> Option<String> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} characters. Use a longer secret",
            MIN_JWT_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Parse and normalize the CORS origin.
/// Returns None and logs an error if validation fails.
pub fn validate_cors_origin(origin: &str) -> Option<String> {
    let url = match Url::parse(origin) {
        Ok(url) => url,
        Err(e) => {
            error!(origin = %origin, error = %e, "Invalid CORS origin");
            return None;
        }
    };

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        error!(origin = %origin, "CORS origin must be an http(s) URL with a host");
        return None;
    }

    Some(url.origin().ascii_serialization())
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    db: Database,
    jwt_secret: String,
    mode: RunMode,
    cors_origin: Option<String>,
    auth_rate_limit: u32,
    behind_proxy: bool,
) -> ServerConfig {
    ServerConfig {
        db,
        jwt_secret: jwt_secret.into_bytes(),
        mode,
        cors_origin,
        auth_rate_limit,
        trust_forwarded_for: behind_proxy,
        password_hasher: PasswordHasher::default(),
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}

/// Handle the --seed flag: insert development data, exiting on failure.
pub async fn handle_seed(db: &Database, mode: RunMode) {
    if mode == RunMode::Production {
        error!("--seed creates a well-known admin password and is refused in production mode");
        std::process::exit(1);
    }

    match seed_development_data(db, &PasswordHasher::default()).await {
        Ok(report) => {
            info!(
                admin_id = report.admin_id,
                admin_created = report.admin_created,
                virtual_users_created = report.virtual_users_created,
                "Seed data ready"
            );
            println!();
            println!("Development admin:");
            println!("  Email: {}", report.admin_email);
            println!("  Password: {}", report.admin_password);
            println!();
        }
        Err(e) => {
            error!(error = %e, "Failed to seed database");
            std::process::exit(1);
        }
    }
}
