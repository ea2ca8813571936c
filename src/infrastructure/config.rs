use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub graphql: GraphQlConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_jwt_ttl")]
    pub jwt_ttl_seconds: u64,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_provider")]
    pub provider: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GraphQlConfig {
    #[serde(default = "default_playground")]
    pub playground: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_ttl_seconds: default_jwt_ttl(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_storage_provider(),
        }
    }
}

impl Default for GraphQlConfig {
    fn default() -> Self {
        Self {
            playground: default_playground(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("BLOG")
                    .separator("__")
                    .try_parsing(true),
            );
        let cfg = builder.build()?;
        let mut config: Config = cfg.try_deserialize()?;

        if config.auth.jwt_secret.trim().is_empty() {
            config.auth.jwt_secret = match env::var("JWT_SECRET") {
                Ok(secret) if !secret.trim().is_empty() => secret,
                _ => {
                    return Err(config::ConfigError::Message(
                        "Missing JWT secret. Set BLOG__AUTH__JWT_SECRET or JWT_SECRET.".into(),
                    ));
                }
            };
        }

        if env::var("BLOG__AUTH__JWT_TTL_SECONDS").is_err() {
            if let Ok(raw) = env::var("JWT_EXPIRATION") {
                config.auth.jwt_ttl_seconds = parse_ttl(&raw).ok_or_else(|| {
                    config::ConfigError::Message(format!("Invalid JWT_EXPIRATION value: {raw}"))
                })?;
            }
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }

    pub fn jwt_ttl(&self) -> Duration {
        Duration::from_secs(self.auth.jwt_ttl_seconds)
    }
}

/// Parses expiry strings such as `3600`, `30s`, `15m`, `1h` or `7d` into seconds.
pub fn parse_ttl(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let value: u64 = digits.parse().ok()?;
    let multiplier = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 60 * 60 * 24,
        _ => return None,
    };
    value.checked_mul(multiplier).filter(|secs| *secs > 0)
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_jwt_ttl() -> u64 {
    60 * 60
}

fn default_bcrypt_cost() -> u32 {
    10
}

fn default_storage_provider() -> String {
    "memory".to_string()
}

fn default_playground() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::{parse_ttl, Config};
    use config::ConfigError;
    use serial_test::serial;
    use std::env;

    fn clear_env_vars() {
        env::remove_var("BLOG__AUTH__JWT_SECRET");
        env::remove_var("BLOG__AUTH__JWT_TTL_SECONDS");
        env::remove_var("JWT_SECRET");
        env::remove_var("JWT_EXPIRATION");
    }

    #[test]
    #[serial]
    fn uses_prefixed_secret_when_present() {
        clear_env_vars();
        env::set_var("BLOG__AUTH__JWT_SECRET", "prefixed-secret");
        env::set_var("BLOG__AUTH__JWT_TTL_SECONDS", "120");

        let config = Config::from_env().expect("expected configuration to load");

        assert_eq!(config.auth.jwt_secret, "prefixed-secret");
        assert_eq!(config.auth.jwt_ttl_seconds, 120);
        assert_eq!(config.auth.bcrypt_cost, 10);
        assert_eq!(config.app.port, 4000);
        assert_eq!(config.storage.provider, "memory");

        clear_env_vars();
    }

    #[test]
    #[serial]
    fn falls_back_to_plain_jwt_variables() {
        clear_env_vars();
        env::set_var("JWT_SECRET", "fallback-secret");
        env::set_var("JWT_EXPIRATION", "1h");

        let config = Config::from_env().expect("expected configuration to load");

        assert_eq!(config.auth.jwt_secret, "fallback-secret");
        assert_eq!(config.auth.jwt_ttl_seconds, 3_600);

        clear_env_vars();
    }

    #[test]
    #[serial]
    fn prefixed_ttl_wins_over_jwt_expiration() {
        clear_env_vars();
        env::set_var("JWT_SECRET", "fallback-secret");
        env::set_var("JWT_EXPIRATION", "7d");
        env::set_var("BLOG__AUTH__JWT_TTL_SECONDS", "60");

        let config = Config::from_env().expect("expected configuration to load");

        assert_eq!(config.auth.jwt_ttl_seconds, 60);

        clear_env_vars();
    }

    #[test]
    #[serial]
    fn errors_when_no_secret_available() {
        clear_env_vars();

        let error = Config::from_env().expect_err("expected configuration to fail");

        match error {
            ConfigError::Message(message) => assert_eq!(
                message,
                "Missing JWT secret. Set BLOG__AUTH__JWT_SECRET or JWT_SECRET.".to_string()
            ),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn rejects_unparseable_expiration() {
        clear_env_vars();
        env::set_var("JWT_SECRET", "fallback-secret");
        env::set_var("JWT_EXPIRATION", "soon");

        let error = Config::from_env().expect_err("expected configuration to fail");
        assert!(matches!(error, ConfigError::Message(msg) if msg.contains("soon")));

        clear_env_vars();
    }

    #[test]
    fn parses_expiry_units() {
        assert_eq!(parse_ttl("3600"), Some(3_600));
        assert_eq!(parse_ttl("30s"), Some(30));
        assert_eq!(parse_ttl("15m"), Some(900));
        assert_eq!(parse_ttl("2h"), Some(7_200));
        assert_eq!(parse_ttl("1d"), Some(86_400));
        assert_eq!(parse_ttl("0"), None);
        assert_eq!(parse_ttl("h"), None);
        assert_eq!(parse_ttl("10w"), None);
    }
}
