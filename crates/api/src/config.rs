//! Environment configuration, read once at startup.
//!
//! Nothing here is re-read per request; in particular the business calendar
//! (what "today" means for future-date checks and default report dates) is
//! fixed when the process starts.

use salesdesk_core::BusinessClock;

/// Startup configuration for the API process.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
    /// Business calendar derived from `REPORT_UTC_OFFSET_MINUTES`.
    pub clock: BusinessClock,
    /// Address outgoing report mail is sent from.
    pub mail_sender: String,
    /// Recipient of admin daily reports when no manager account exists.
    pub admin_report_recipient: Option<String>,
    pub smtp: Option<SmtpConfig>,
}

/// SMTP relay settings, present when `SMTP_HOST` is set.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let use_persistent_stores = std::env::var("USE_PERSISTENT_STORES")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        let offset_minutes: i32 = env_parse("REPORT_UTC_OFFSET_MINUTES", 0);
        let clock = BusinessClock::from_offset_minutes(offset_minutes).unwrap_or_else(|| {
            tracing::warn!(offset_minutes, "invalid REPORT_UTC_OFFSET_MINUTES; using UTC");
            BusinessClock::utc()
        });

        let smtp = std::env::var("SMTP_HOST").ok().map(|host| SmtpConfig {
            host,
            port: env_parse("SMTP_PORT", 587),
            username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
            password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
        });

        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            jwt_secret,
            token_ttl_minutes: env_parse("TOKEN_TTL_MINUTES", 8 * 60),
            use_persistent_stores,
            database_url: std::env::var("DATABASE_URL").ok(),
            clock,
            mail_sender: std::env::var("MAIL_SENDER")
                .unwrap_or_else(|_| "reports@salesdesk.local".to_string()),
            admin_report_recipient: std::env::var("ADMIN_REPORT_RECIPIENT").ok(),
            smtp,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
