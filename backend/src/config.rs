//! Runtime configuration.
//!
//! Values come from built-in defaults, then an optional YAML file named by
//! `VAXGUARD_CONFIG`, then individual environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use tracing::{info, warn};

use crate::domain::schedule_service::DEFAULT_DUE_SOON_DAYS;
use crate::storage::connection::DEFAULT_DATABASE_URL;

pub const CONFIG_PATH_VAR: &str = "VAXGUARD_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    pub cors_origin: String,
    pub due_soon_days: u32,
    pub session_idle_minutes: i64,
    pub secure_cookies: bool,
    /// Directory with a built frontend to serve for non-API paths
    pub static_dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_address: "127.0.0.1:3000".to_string(),
            cors_origin: "http://localhost:8080".to_string(),
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
            session_idle_minutes: 60,
            secure_cookies: false,
            static_dir: None,
        }
    }
}

impl AppConfig {
    /// Defaults, then the YAML file from `VAXGUARD_CONFIG`, then env overrides
    pub fn load() -> Result<Self> {
        let mut config = match env::var(CONFIG_PATH_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(path.trim()))?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// Read a YAML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file {}", path.display()))
    }

    /// Apply overrides from a variable lookup. Unparsable numbers and flags
    /// are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(bind) = lookup("VAXGUARD_BIND") {
            self.bind_address = bind;
        }
        if let Some(origin) = lookup("VAXGUARD_CORS_ORIGIN") {
            self.cors_origin = origin;
        }
        if let Some(days) = lookup("VAXGUARD_DUE_SOON_DAYS") {
            match days.trim().parse() {
                Ok(days) => self.due_soon_days = days,
                Err(_) => warn!("Ignoring invalid VAXGUARD_DUE_SOON_DAYS: {}", days),
            }
        }
        if let Some(minutes) = lookup("VAXGUARD_SESSION_IDLE_MINUTES") {
            match minutes.trim().parse::<i64>() {
                Ok(minutes) if minutes > 0 => self.session_idle_minutes = minutes,
                _ => warn!("Ignoring invalid VAXGUARD_SESSION_IDLE_MINUTES: {}", minutes),
            }
        }
        if let Some(flag) = lookup("VAXGUARD_SECURE_COOKIES") {
            match parse_flag(&flag) {
                Some(secure) => self.secure_cookies = secure,
                None => warn!("Ignoring invalid VAXGUARD_SECURE_COOKIES: {}", flag),
            }
        }
        if let Some(dir) = lookup("VAXGUARD_STATIC_DIR") {
            self.static_dir = Some(dir).filter(|d| !d.trim().is_empty());
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_address
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.bind_address))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
