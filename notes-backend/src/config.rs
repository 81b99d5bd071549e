use std::env;
use std::path::Path;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const PORT: &str = "PORT";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Shared secret required on mutating /api/notes endpoints.
    /// Leave unset to reject all mutations.
    pub const API_KEY: &str = "API_KEY";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 8080;
    pub const DATABASE_URL: &str = "./.db/notes.db";
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var(env_vars::PORT)
                .unwrap_or_else(|_| defaults::PORT.to_string())
                .parse()
                .expect("PORT must be a valid number"),
            database_url: env::var(env_vars::DATABASE_URL)
                .unwrap_or_else(|_| defaults::DATABASE_URL.to_string()),
            api_key: env::var(env_vars::API_KEY).ok(),
        }
    }
}

/// Create the parent directory of the database file if it doesn't exist.
/// This should be called at startup before the database is opened.
pub fn initialize_database_dir(database_url: &str) -> std::io::Result<()> {
    if let Some(parent) = Path::new(database_url).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
