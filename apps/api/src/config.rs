use anyhow::{Context, Result};

const DEFAULT_DATABASE_URL: &str = "sqlite://candidatoscope.db?mode=rwc";

/// Application configuration loaded from environment variables.
/// Startup aborts if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Enables the LLM assessment backend when present.
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub token_ttl_hours: i64,
    pub chat_heartbeat_secs: u64,
    pub bootstrap_admin: Option<BootstrapAdmin>,
    pub seed_demo_data: bool,
}

/// Credentials for the first super admin, created only when no user exists yet.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let bootstrap_admin = match (optional_env("ADMIN_EMAIL"), optional_env("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(BootstrapAdmin {
                email,
                password,
                full_name: optional_env("ADMIN_NAME").unwrap_or_else(|| "Administrador".to_string()),
            }),
            _ => None,
        };

        Ok(Config {
            database_url: optional_env("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret: require_env("JWT_SECRET")?,
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            token_ttl_hours: parse_env("TOKEN_TTL_HOURS", 12)?,
            chat_heartbeat_secs: parse_env("CHAT_HEARTBEAT_SECS", 30)?,
            bootstrap_admin,
            seed_demo_data: parse_env("SEED_DEMO_DATA", false)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by in-process tests: in-memory database, heuristic assessor.
    pub fn for_tests() -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test-secret".to_string(),
            anthropic_api_key: None,
            port: 0,
            rust_log: "debug".to_string(),
            token_ttl_hours: 1,
            chat_heartbeat_secs: 30,
            bootstrap_admin: None,
            seed_demo_data: false,
        }
    }
}
