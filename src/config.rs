//! Application configuration loaded from environment variables.
//!
//! Storage settings are read by [`crate::db::RepositoryConfig`]; this module
//! covers everything else:
//! token signing, outgoing mail, and the HTTP listener.

use std::env;

/// Signing key used when `SECRET_KEY` is not set. Only suitable for development.
pub const DEV_SECRET_KEY: &str = "dev-secret-key-change-in-production";

/// Outgoing mail settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP relay host
    pub host: String,
    /// SMTP port (587 for STARTTLS)
    pub port: u16,
    /// Login user; mail is skipped when empty
    pub user: String,
    /// Login password; mail is skipped when empty
    pub password: String,
    /// Sender address
    pub from_email: String,
    /// Sender display name
    pub from_name: String,
    /// Use STARTTLS
    pub tls: bool,
}

impl SmtpConfig {
    /// Whether credentials are present so that mail can actually be sent.
    pub fn has_credentials(&self) -> bool {
        !self.user.is_empty() && !self.password.is_empty()
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            user: String::new(),
            password: String::new(),
            from_email: "noreply@hitexis.com".to_string(),
            from_name: "HitexisTimeControl".to_string(),
            tls: true,
        }
    }
}

/// Application-wide configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Product name used in email subjects
    pub app_name: String,
    /// Path prefix under which the REST API is mounted
    pub api_prefix: String,
    /// HS256 signing key for access and refresh tokens
    pub secret_key: String,
    /// Access token lifetime in minutes
    pub access_token_expire_minutes: i64,
    /// Refresh token lifetime in days
    pub refresh_token_expire_days: i64,
    /// Outgoing mail
    pub smtp: SmtpConfig,
    /// Base URL of the frontend, used for links in emails
    pub frontend_url: String,
    /// Whether the background reminder jobs should run
    pub reminders_enabled: bool,
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "HitexisTimeControl".to_string(),
            api_prefix: "/api".to_string(),
            secret_key: DEV_SECRET_KEY.to_string(),
            access_token_expire_minutes: 60 * 24,
            refresh_token_expire_days: 7,
            smtp: SmtpConfig::default(),
            frontend_url: "http://localhost:3000".to_string(),
            reminders_enabled: true,
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn flag_or(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

impl AppConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `APP_NAME` (default: HitexisTimeControl)
    /// - `API_PREFIX` (default: /api)
    /// - `SECRET_KEY` (default: development key, logged as a warning by the server)
    /// - `ACCESS_TOKEN_EXPIRE_MINUTES` (default: 1440)
    /// - `REFRESH_TOKEN_EXPIRE_DAYS` (default: 7)
    /// - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USER`, `SMTP_PASSWORD`,
    ///   `SMTP_FROM_EMAIL`, `SMTP_FROM_NAME`, `SMTP_TLS`
    /// - `FRONTEND_URL` (default: http://localhost:3000)
    /// - `REMINDERS_ENABLED` (default: true)
    /// - `HOST` (default: 0.0.0.0), `PORT` (default: 8080)
    ///
    /// # Errors
    /// Returns an error if a token lifetime is not positive.
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let access_token_expire_minutes = parse_or(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            defaults.access_token_expire_minutes,
        );
        if access_token_expire_minutes <= 0 {
            return Err("ACCESS_TOKEN_EXPIRE_MINUTES must be positive".to_string());
        }

        let refresh_token_expire_days =
            parse_or("REFRESH_TOKEN_EXPIRE_DAYS", defaults.refresh_token_expire_days);
        if refresh_token_expire_days <= 0 {
            return Err("REFRESH_TOKEN_EXPIRE_DAYS must be positive".to_string());
        }

        let app_name = var_or("APP_NAME", &defaults.app_name);
        let smtp = SmtpConfig {
            host: var_or("SMTP_HOST", &defaults.smtp.host),
            port: parse_or("SMTP_PORT", defaults.smtp.port),
            user: var_or("SMTP_USER", ""),
            password: var_or("SMTP_PASSWORD", ""),
            from_email: var_or("SMTP_FROM_EMAIL", &defaults.smtp.from_email),
            from_name: var_or("SMTP_FROM_NAME", &app_name),
            tls: flag_or("SMTP_TLS", defaults.smtp.tls),
        };

        Ok(Self {
            api_prefix: var_or("API_PREFIX", &defaults.api_prefix),
            secret_key: var_or("SECRET_KEY", DEV_SECRET_KEY),
            access_token_expire_minutes,
            refresh_token_expire_days,
            smtp,
            frontend_url: var_or("FRONTEND_URL", &defaults.frontend_url),
            reminders_enabled: flag_or("REMINDERS_ENABLED", defaults.reminders_enabled),
            host: var_or("HOST", &defaults.host),
            port: parse_or("PORT", defaults.port),
            app_name,
        })
    }

    /// Whether the signing key is still the built-in development key.
    pub fn uses_dev_secret(&self) -> bool {
        self.secret_key == DEV_SECRET_KEY
    }
}
