//! Environment/TOML configuration, following the teacher's TOML-first
//! convention: `PANELCAM_CONFIG` names a file, individual env vars
//! override whatever fields it sets.

use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub s3_endpoint_url: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_access_key_id: Option<String>,
    pub s3_secret_access_key: Option<String>,
    #[serde(default)]
    pub s3_force_path_style: bool,
    pub presigned_ttl_seconds: Option<u64>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    Read(String, std::io::Error),
    #[error("failed to parse config file {0}: {1}")]
    Parse(String, toml::de::Error),
    #[error("missing required setting `{0}` (set it in the config file or via the matching env var)")]
    Missing(&'static str),
}

impl Config {
    /// Loads `path` (or `$PANELCAM_CONFIG`) if present, then lets the
    /// individual `DATABASE_URL`/`REDIS_URL`/`S3_*`/`PRESIGNED_TTL_SECONDS`
    /// env vars override whatever that file set.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file_path = path.map(|p| p.to_path_buf()).or_else(|| std::env::var("PANELCAM_CONFIG").ok().map(Into::into));

        let mut config = match file_path {
            Some(path) => {
                let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Read(path.display().to_string(), e))?;
                toml::from_str(&text).map_err(|e| ConfigError::Parse(path.display().to_string(), e))?
            }
            None => Config::default(),
        };

        if let Ok(v) = std::env::var("DATABASE_URL") {
            config.database_url = Some(v);
        }
        if let Ok(v) = std::env::var("REDIS_URL") {
            config.redis_url = Some(v);
        }
        if let Ok(v) = std::env::var("S3_ENDPOINT_URL") {
            config.s3_endpoint_url = Some(v);
        }
        if let Ok(v) = std::env::var("S3_BUCKET") {
            config.s3_bucket = Some(v);
        }
        if let Ok(v) = std::env::var("S3_REGION") {
            config.s3_region = Some(v);
        }
        if let Ok(v) = std::env::var("S3_ACCESS_KEY_ID") {
            config.s3_access_key_id = Some(v);
        }
        if let Ok(v) = std::env::var("S3_SECRET_ACCESS_KEY") {
            config.s3_secret_access_key = Some(v);
        }
        if let Ok(v) = std::env::var("PRESIGNED_TTL_SECONDS") {
            if let Ok(secs) = v.parse() {
                config.presigned_ttl_seconds = Some(secs);
            }
        }

        Ok(config)
    }

    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url.as_deref().ok_or(ConfigError::Missing("database_url"))
    }

    pub fn redis_url(&self) -> Result<&str, ConfigError> {
        self.redis_url.as_deref().ok_or(ConfigError::Missing("redis_url"))
    }

    pub fn s3_config(&self) -> Result<panelcam_store::S3Config, ConfigError> {
        Ok(panelcam_store::S3Config {
            bucket: self.s3_bucket.clone().ok_or(ConfigError::Missing("s3_bucket"))?,
            region: self.s3_region.clone().unwrap_or_else(|| "us-east-1".to_string()),
            endpoint_url: self.s3_endpoint_url.clone(),
            access_key_id: self.s3_access_key_id.clone().ok_or(ConfigError::Missing("s3_access_key_id"))?,
            secret_access_key: self.s3_secret_access_key.clone().ok_or(ConfigError::Missing("s3_secret_access_key"))?,
            force_path_style: self.s3_force_path_style,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_reports_its_name() {
        let config = Config::default();
        let err = config.database_url().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("database_url")));
    }

    #[test]
    fn toml_file_populates_fields() {
        let config: Config = toml::from_str(
            r#"
            database_url = "postgres://localhost/panelcam"
            redis_url = "redis://localhost"
            s3_bucket = "panelcam-artifacts"
            s3_access_key_id = "key"
            s3_secret_access_key = "secret"
            presigned_ttl_seconds = 600
            "#,
        )
        .unwrap();

        assert_eq!(config.database_url().unwrap(), "postgres://localhost/panelcam");
        assert_eq!(config.presigned_ttl_seconds, Some(600));
        assert_eq!(config.s3_config().unwrap().region, "us-east-1");
    }
}
