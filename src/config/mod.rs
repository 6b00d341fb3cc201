use std::env;
use std::time::Duration;

const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:5173",
    "https://freemarket-mvp.vercel.app",
];
const DEFAULT_ALLOWED_ORIGIN_SUFFIXES: &[&str] = &[".vercel.app"];
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_expiration_secs: u64,
    pub bcrypt_cost: u32,
    pub server_host: String,
    pub server_port: u16,
    pub cors: CorsPolicy,
    pub gemini: GeminiConfig,
}

/// Origins allowed to call the API from a browser.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    /// Exact origins, e.g. `http://localhost:3000`.
    pub allowed_origins: Vec<String>,
    /// Host suffixes accepted for any `https://` origin, e.g. `.vercel.app`.
    pub allowed_suffixes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let jwt_secret = required("JWT_SECRET")?;
        let jwt_expiration_secs = match optional("JWT_EXPIRATION") {
            Some(raw) => expiration_secs(&raw)?,
            None => 24 * 3600,
        };

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            jwt_secret,
            jwt_issuer: optional("JWT_ISSUER").unwrap_or_else(|| "freemarket-backend".into()),
            jwt_expiration_secs,
            bcrypt_cost: parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            server_host: optional("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port: parse_or("PORT", 8080)?,
            cors: CorsPolicy {
                allowed_origins: list_or("CORS_ALLOWED_ORIGINS", DEFAULT_ALLOWED_ORIGINS),
                allowed_suffixes: list_or(
                    "CORS_ALLOWED_ORIGIN_SUFFIXES",
                    DEFAULT_ALLOWED_ORIGIN_SUFFIXES,
                ),
            },
            gemini: GeminiConfig {
                api_key: optional("GEMINI_API_KEY"),
                model: optional("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.5-flash".into()),
                base_url: optional("GEMINI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.into()),
            },
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }
}

impl CorsPolicy {
    pub fn allows(&self, origin: &str) -> bool {
        if origin.is_empty() {
            return false;
        }
        if self.allowed_origins.iter().any(|o| o == origin) {
            return true;
        }
        let Some(host) = origin.strip_prefix("https://") else {
            return false;
        };
        self.allowed_suffixes
            .iter()
            .any(|suffix| host.len() > suffix.len() && host.ends_with(suffix.as_str()))
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
            allowed_suffixes: DEFAULT_ALLOWED_ORIGIN_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Token lifetime in hours, written as `24` or `24h`.
fn expiration_secs(raw: &str) -> Result<u64, ConfigError> {
    let hours: u64 = parse("JWT_EXPIRATION", raw.trim().trim_end_matches('h'))?;
    hours.checked_mul(3600).ok_or_else(|| ConfigError::Invalid {
        key: "JWT_EXPIRATION",
        value: raw.to_string(),
    })
}

fn optional(key: &'static str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    optional(key).ok_or(ConfigError::Missing(key))
}

fn parse<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: raw.to_string(),
    })
}

fn parse_or<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(key) {
        Some(raw) => parse(key, &raw),
        None => Ok(default),
    }
}

fn list_or(key: &'static str, default: &[&str]) -> Vec<String> {
    match optional(key) {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        None => default.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_allows_exact_origins() {
        let policy = CorsPolicy::default();
        assert!(policy.allows("http://localhost:3000"));
        assert!(policy.allows("http://localhost:5173"));
        assert!(policy.allows("https://freemarket-mvp.vercel.app"));
    }

    #[test]
    fn cors_allows_https_preview_subdomains() {
        let policy = CorsPolicy::default();
        assert!(policy.allows("https://freemarket-mvp-git-feature-x.vercel.app"));
        assert!(!policy.allows("http://preview.vercel.app"));
        assert!(!policy.allows("https://.vercel.app"));
    }

    #[test]
    fn cors_rejects_unknown_origins() {
        let policy = CorsPolicy::default();
        assert!(!policy.allows(""));
        assert!(!policy.allows("http://localhost:8080"));
        assert!(!policy.allows("https://evil.example.com"));
        assert!(!policy.allows("https://vercel.app.evil.com"));
    }

    #[test]
    fn expiration_accepts_plain_and_suffixed_hours() {
        assert_eq!(expiration_secs("24").unwrap(), 24 * 3600);
        assert_eq!(expiration_secs("2h").unwrap(), 7200);
    }

    #[test]
    fn expiration_overflow_is_invalid() {
        let err = expiration_secs(&u64::MAX.to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "JWT_EXPIRATION", .. }));
        assert!(matches!(expiration_secs("soon"), Err(ConfigError::Invalid { .. })));
    }
}
