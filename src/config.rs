//! Environment-driven configuration, loaded once at startup.

use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    5000
}

fn default_environment() -> Environment {
    Environment::Development
}

fn default_database_url() -> String {
    "postgres://localhost/agroconnect".into()
}

fn default_upload_dir() -> String {
    "uploads".into()
}

fn default_max_upload_bytes() -> usize {
    5 * 1024 * 1024
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_environment")]
    pub environment: Environment,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Read configuration from the process environment. A `.env` file is
    /// loaded first when present.
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_vars() {
        let cfg: AppConfig = envy::from_iter(std::iter::empty::<(String, String)>()).unwrap();
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.environment, Environment::Development);
        assert_eq!(cfg.upload_dir, "uploads");
        assert_eq!(cfg.max_upload_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn environment_parses_lowercase() {
        let cfg: AppConfig = envy::from_iter(vec![(
            "ENVIRONMENT".to_string(),
            "production".to_string(),
        )])
        .unwrap();
        assert_eq!(cfg.environment, Environment::Production);
        assert_eq!(cfg.environment.as_str(), "production");
    }
}
