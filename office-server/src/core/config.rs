use chrono_tz::Tz;

use crate::auth::JwtConfig;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Google sign-in settings
#[derive(Debug, Clone, Default)]
pub struct GoogleConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_url: Option<String>,
}

/// Outbound mail API settings. Without `api_url` mail is only logged.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            from: "no-reply@nextofficeflow.local".into(),
        }
    }
}

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | DATABASE_URL | sqlite://office.db?mode=rwc | SQLite database |
/// | HTTP_PORT | 8080 | HTTP port |
/// | JWT_SECRET | dev fallback | required outside development |
/// | JWT_EXPIRATION_MINUTES | 1440 | token lifetime |
/// | COOKIE_SECRET | JWT_SECRET | auth cookie signing key |
/// | ENVIRONMENT | development | development, staging or production |
/// | TIMEZONE | UTC | business timezone (IANA name) |
/// | DEFAULT_AVAILABLE_LEAVES | 12 | paid leave days per year |
/// | GOOGLE_CLIENT_ID / _SECRET / GOOGLE_REDIRECT_URL | - | Google sign-in |
/// | MAIL_API_URL / MAIL_API_KEY / MAIL_FROM | - | outbound mail |
/// | GITHUB_TOKEN | - | repository creation |
/// | PIN_TTL_MINUTES | 15 | verification PIN lifetime |
/// | OUTBOX_POLL_SECS | 5 | outbox worker poll interval |
/// | OUTBOX_MAX_ATTEMPTS | 5 | attempts before an event is parked |
/// | LOG_LEVEL / LOG_DIR / LOG_JSON | info / - / false | logging |
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub http_port: u16,
    pub jwt: JwtConfig,
    pub cookie_secret: String,
    /// development | staging | production
    pub environment: String,
    pub timezone: Tz,
    pub default_available_leaves: i32,
    pub google: GoogleConfig,
    pub mail: MailConfig,
    pub github_token: Option<String>,
    pub pin_ttl_minutes: i64,
    pub outbox_poll_secs: u64,
    pub outbox_max_attempts: i64,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
}

impl Default for Config {
    /// Development defaults, no environment lookups
    fn default() -> Self {
        let secret = "dev-JWT_SECRET-not-for-production".to_string();
        Self {
            database_url: "sqlite://office.db?mode=rwc".into(),
            http_port: 8080,
            jwt: JwtConfig::with_secret(secret.clone()),
            cookie_secret: secret,
            environment: "development".into(),
            timezone: Tz::UTC,
            default_available_leaves: 12,
            google: GoogleConfig::default(),
            mail: MailConfig::default(),
            github_token: None,
            pin_ttl_minutes: 15,
            outbox_poll_secs: 5,
            outbox_max_attempts: 5,
            log_level: "info".into(),
            log_dir: None,
            log_json: false,
        }
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Require a secret env var: must be set and non-empty outside development.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let defaults = Self::default();
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let jwt_secret = Self::require_secret("JWT_SECRET", &environment)?;
        let cookie_secret = env_opt("COOKIE_SECRET").unwrap_or_else(|| jwt_secret.clone());

        let timezone = match env_opt("TIMEZONE") {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|e| format!("Invalid TIMEZONE {name}: {e}"))?,
            None => defaults.timezone,
        };

        let mut jwt = JwtConfig::with_secret(jwt_secret);
        jwt.expiration_minutes = env_parse("JWT_EXPIRATION_MINUTES", jwt.expiration_minutes);

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            http_port: env_parse("HTTP_PORT", defaults.http_port),
            jwt,
            cookie_secret,
            environment,
            timezone,
            default_available_leaves: env_parse(
                "DEFAULT_AVAILABLE_LEAVES",
                defaults.default_available_leaves,
            ),
            google: GoogleConfig {
                client_id: env_opt("GOOGLE_CLIENT_ID"),
                client_secret: env_opt("GOOGLE_CLIENT_SECRET"),
                redirect_url: env_opt("GOOGLE_REDIRECT_URL"),
            },
            mail: MailConfig {
                api_url: env_opt("MAIL_API_URL"),
                api_key: env_opt("MAIL_API_KEY"),
                from: env_opt("MAIL_FROM").unwrap_or(defaults.mail.from),
            },
            github_token: env_opt("GITHUB_TOKEN"),
            pin_ttl_minutes: env_parse("PIN_TTL_MINUTES", defaults.pin_ttl_minutes),
            outbox_poll_secs: env_parse("OUTBOX_POLL_SECS", defaults.outbox_poll_secs),
            outbox_max_attempts: env_parse("OUTBOX_MAX_ATTEMPTS", defaults.outbox_max_attempts),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: env_opt("LOG_DIR"),
            log_json: env_parse("LOG_JSON", false),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_development() {
        let config = Config::default();
        assert!(!config.is_production());
        assert_eq!(config.default_available_leaves, 12);
        assert_eq!(config.jwt.expiration_minutes, 1440);
        assert_eq!(config.timezone, Tz::UTC);
    }

    #[test]
    fn secrets_fall_back_only_in_development() {
        let name = "OFFICE_TEST_SECRET_THAT_IS_NEVER_SET";
        assert!(Config::require_secret(name, "development").is_ok());
        assert!(Config::require_secret(name, "production").is_err());
    }
}
