use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
}

impl AppConfig {
    /// Read configuration from the environment once at startup.
    ///
    /// `DATABASE_URL` and `JWT_SECRET` are mandatory; a missing value
    /// aborts startup instead of running with an unsigned-token or
    /// storeless configuration.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            ttl_days: std::env::var("JWT_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
        };
        Ok(Self { database_url, jwt })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_fails_without_required_vars() {
        // Serialized through a single test to avoid env races with itself.
        std::env::remove_var("DATABASE_URL");
        std::env::remove_var("JWT_SECRET");
        assert!(AppConfig::from_env().is_err());

        std::env::set_var("DATABASE_URL", "postgres://localhost/movies");
        assert!(AppConfig::from_env().is_err(), "secret still missing");

        std::env::set_var("JWT_SECRET", "dev-secret");
        let cfg = AppConfig::from_env().expect("both vars present");
        assert_eq!(cfg.jwt.ttl_days, 7);

        std::env::remove_var("DATABASE_URL");
        std::env::remove_var("JWT_SECRET");
    }
}
