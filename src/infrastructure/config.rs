//! Process configuration, read from the environment (and `.env`)

use di::{inject, injectable};
use log::warn;
use std::env;
use std::str::FromStr;

const DEV_ACCESS_SECRET: &str = "dev-access-secret-change-me";
const DEV_REFRESH_SECRET: &str = "dev-refresh-secret-change-me";

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    pub app_url: String,
    pub cors_origins: Vec<String>,
    pub upload_dir: String,
    pub analytics_enabled: bool,
    pub email_from: String,
    pub smtp: Option<SmtpSettings>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind_address: "0.0.0.0:3000".to_owned(),
            jwt_secret: DEV_ACCESS_SECRET.to_owned(),
            jwt_refresh_secret: DEV_REFRESH_SECRET.to_owned(),
            access_token_ttl_minutes: 15,
            refresh_token_ttl_days: 7,
            app_url: "http://localhost:3000".to_owned(),
            cors_origins: vec![
                "http://localhost:3000".to_owned(),
                "http://localhost:5173".to_owned(),
            ],
            upload_dir: "/tmp/uploads".to_owned(),
            analytics_enabled: true,
            email_from: "Chatbot Studio <no-reply@chatbot-studio.local>".to_owned(),
            smtp: None,
        }
    }
}

#[injectable]
impl AppConfig {
    #[inject]
    pub fn create() -> AppConfig {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> AppConfig {
        let defaults = AppConfig::default();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET is not set, using an insecure development secret");
            defaults.jwt_secret.clone()
        });
        let jwt_refresh_secret = env::var("JWT_REFRESH_SECRET").unwrap_or_else(|_| {
            warn!("JWT_REFRESH_SECRET is not set, using an insecure development secret");
            defaults.jwt_refresh_secret.clone()
        });

        let smtp = env::var("SMTP_HOST").ok().map(|host| SmtpSettings {
            host,
            port: parse_or("SMTP_PORT", 587),
            username: env::var("SMTP_USERNAME").ok(),
            password: env::var("SMTP_PASSWORD").ok(),
        });

        AppConfig {
            bind_address: env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            jwt_secret,
            jwt_refresh_secret,
            access_token_ttl_minutes: parse_or(
                "ACCESS_TOKEN_TTL_MINUTES",
                defaults.access_token_ttl_minutes,
            ),
            refresh_token_ttl_days: parse_or(
                "REFRESH_TOKEN_TTL_DAYS",
                defaults.refresh_token_ttl_days,
            ),
            app_url: env::var("APP_URL").unwrap_or(defaults.app_url),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| split_list(&origins))
                .unwrap_or(defaults.cors_origins),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or(defaults.upload_dir),
            analytics_enabled: parse_or("ANALYTICS_ENABLED", defaults.analytics_enabled),
            email_from: env::var("EMAIL_FROM").unwrap_or(defaults.email_from),
            smtp,
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring unparsable value for {key}: {raw:?}");
            default
        }),
        Err(_) => default,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_drops_blanks() {
        assert_eq!(
            split_list(" https://a.example, ,https://b.example,"),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn defaults_match_token_lifetimes() {
        let config = AppConfig::default();
        assert_eq!(config.access_token_ttl_minutes, 15);
        assert_eq!(config.refresh_token_ttl_days, 7);
        assert!(config.analytics_enabled);
        assert!(config.smtp.is_none());
    }
}
