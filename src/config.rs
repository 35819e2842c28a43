//! Synchronizer configuration.
//!
//! Values come from, in increasing priority: built-in defaults, an optional YAML
//! file, and `COLLECTION_SYNC_*` environment variables (e.g.
//! `COLLECTION_SYNC_BASE_URL=http://localhost:8080`).

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::framework::ResourceLabels;

pub const ENV_PREFIX: &str = "COLLECTION_SYNC";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Root of the REST API, without the resource segment.
    pub base_url: String,
    /// Resource path segment; also the key of the list envelope.
    pub resource: String,
    /// Singular noun used in error messages.
    pub item_label: String,
    /// Capacity of the request channel.
    pub buffer_size: usize,
    /// Per-request timeout, e.g. `"10s"`. None leaves the transport default.
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dummyjson.com".to_string(),
            resource: "products".to_string(),
            item_label: "product".to_string(),
            buffer_size: 32,
            timeout: None,
        }
    }
}

impl SyncConfig {
    pub fn load(path: Option<&Path>) -> Result<SyncConfig, anyhow::Error> {
        Self::load_with(path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with(path: Option<&Path>, env: Environment) -> Result<SyncConfig, anyhow::Error> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path.to_path_buf()));
        }
        let cfg: SyncConfig = builder.add_source(env).build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            anyhow::bail!("base_url must be an http(s) URL, got {:?}", self.base_url);
        }
        if self.resource.trim_matches('/').is_empty() {
            anyhow::bail!("resource must not be empty");
        }
        if self.buffer_size == 0 {
            anyhow::bail!("buffer_size must be greater than 0");
        }
        Ok(())
    }

    pub fn labels(&self) -> ResourceLabels {
        ResourceLabels::new(&self.item_label, self.resource.trim_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(source))
    }

    #[test]
    fn test_defaults_point_at_dummyjson() {
        let cfg = SyncConfig::load_with(None, env(&[])).unwrap();
        assert_eq!(cfg, SyncConfig::default());
        assert_eq!(cfg.labels(), ResourceLabels::new("product", "products"));
    }

    #[test]
    fn test_file_then_env_override() {
        let file_name = format!("collection-sync-{}.yaml", std::process::id());
        let path = std::env::temp_dir().join(file_name);
        std::fs::write(
            &path,
            "base_url: http://localhost:9000\nresource: todos\nitem_label: todo\ntimeout: 5s\n",
        )
        .unwrap();

        let overrides = env(&[("COLLECTION_SYNC_BUFFER_SIZE", "8")]);
        let cfg = SyncConfig::load_with(Some(&path), overrides).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(cfg.base_url, "http://localhost:9000");
        assert_eq!(cfg.resource, "todos");
        assert_eq!(cfg.buffer_size, 8);
        assert_eq!(cfg.timeout, Some(Duration::from_secs(5)));
        assert_eq!(cfg.labels(), ResourceLabels::new("todo", "todos"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let overrides = env(&[("COLLECTION_SYNC_BASE_URL", "ftp://x")]);
        let err = SyncConfig::load_with(None, overrides).unwrap_err();
        assert!(err.to_string().contains("base_url"));

        let cfg = SyncConfig { buffer_size: 0, ..SyncConfig::default() };
        assert!(cfg.validate().is_err());

        let cfg = SyncConfig { resource: "/".into(), ..SyncConfig::default() };
        assert!(cfg.validate().is_err());
    }
}
