//! Server configuration module
//!
//! Handles loading configuration from environment variables with sensible defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use iris_core::{CollisionPolicy, IngestConfig, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_UPLOAD_BYTES};

/// `DATABASE_URL` value selecting the in-memory record store.
pub const MEMORY_DATABASE: &str = "memory";

/// Where palette records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local map; history is lost on restart.
    Memory,
    /// SQLite database at the given connection URL.
    Sqlite(String),
}

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 3000)
    pub port: u16,
    /// Server host (default: 127.0.0.1)
    pub host: [u8; 4],
    /// Allowed CORS origins, comma-separated (default: allow all in dev)
    pub allowed_origins: Option<Vec<String>>,
    /// Request body limit in MB (default: 12)
    pub body_limit_mb: usize,
    /// Maximum image size in bytes (default: 10 MiB)
    pub max_upload_bytes: u64,
    /// Read size for upload streams in bytes (default: 1 MiB)
    pub upload_chunk_bytes: usize,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
    /// Enable rate limiting (default: false for tests, true when loaded from env)
    pub rate_limit_enabled: bool,
    /// Rate limit: requests per second (default: 10)
    pub rate_limit_per_sec: u64,
    /// Rate limit: burst size (default: 20)
    pub rate_limit_burst: u32,
    /// Root for the database and the `uploads/` directory (default: ./data)
    pub data_dir: PathBuf,
    /// Database URL; `None` derives `sqlite://<data_dir>/app.db`
    pub database_url: Option<String>,
    /// Database connection pool maximum connections (default: 5)
    pub database_max_connections: u32,
    /// Behaviour when two uploads resolve to the same stored name
    pub collision_policy: CollisionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            host: [127, 0, 0, 1],
            allowed_origins: None, // None = allow all (dev mode)
            body_limit_mb: 12,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            upload_chunk_bytes: DEFAULT_CHUNK_SIZE,
            timeout_secs: 30,
            rate_limit_enabled: false, // Disabled by default (for tests)
            rate_limit_per_sec: 10,
            rate_limit_burst: 20,
            data_dir: PathBuf::from("./data"),
            database_url: None,
            database_max_connections: 5,
            collision_policy: CollisionPolicy::Overwrite,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST")
            .map(|h| {
                if h == "0.0.0.0" {
                    [0, 0, 0, 0]
                } else {
                    [127, 0, 0, 1]
                }
            })
            .unwrap_or(defaults.host);

        let allowed_origins = lookup("ALLOWED_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        // Rate limiting enabled by default in production, can be disabled with RATE_LIMIT_ENABLED=false
        let rate_limit_enabled = lookup("RATE_LIMIT_ENABLED")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        let collision_policy = match lookup("COLLISION_POLICY") {
            Some(value) => value.parse().unwrap_or_else(|e: String| {
                tracing::warn!(error = %e, "Ignoring COLLISION_POLICY, using overwrite");
                CollisionPolicy::Overwrite
            }),
            None => defaults.collision_policy,
        };

        Self {
            port: parse_var(&lookup, "PORT").unwrap_or(defaults.port),
            host,
            allowed_origins,
            body_limit_mb: parse_var(&lookup, "BODY_LIMIT_MB").unwrap_or(defaults.body_limit_mb),
            max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES").unwrap_or(defaults.max_upload_bytes),
            upload_chunk_bytes: parse_var(&lookup, "UPLOAD_CHUNK_BYTES")
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.upload_chunk_bytes),
            timeout_secs: parse_var(&lookup, "REQUEST_TIMEOUT_SECS").unwrap_or(defaults.timeout_secs),
            rate_limit_enabled,
            rate_limit_per_sec: parse_var(&lookup, "RATE_LIMIT_PER_SEC").unwrap_or(defaults.rate_limit_per_sec),
            rate_limit_burst: parse_var(&lookup, "RATE_LIMIT_BURST").unwrap_or(defaults.rate_limit_burst),
            data_dir: lookup("DATA_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            database_max_connections: parse_var(&lookup, "DATABASE_MAX_CONNECTIONS")
                .unwrap_or(defaults.database_max_connections),
            collision_policy,
        }
    }

    /// Get socket address from config
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }

    /// Directory holding stored images.
    pub fn upload_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            max_bytes: self.max_upload_bytes,
            chunk_size: self.upload_chunk_bytes,
            collision: self.collision_policy,
        }
    }

    /// Resolve `database_url` into a store backend.
    pub fn store_backend(&self) -> StoreBackend {
        match self.database_url.as_deref().map(str::trim) {
            Some(MEMORY_DATABASE) => StoreBackend::Memory,
            Some(url) => StoreBackend::Sqlite(url.to_string()),
            None => StoreBackend::Sqlite(format!(
                "sqlite://{}",
                self.data_dir.join("app.db").display()
            )),
        }
    }
}

/// Parse a variable, treating unparsable values as unset.
fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert!(!config.rate_limit_enabled);
        assert_eq!(config.collision_policy, CollisionPolicy::Overwrite);
    }

    #[test]
    fn test_from_lookup_empty_env() {
        let config = config_from(&[]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, [127, 0, 0, 1]);
        assert!(config.rate_limit_enabled);
        assert_eq!(
            config.store_backend(),
            StoreBackend::Sqlite("sqlite://./data/app.db".to_string())
        );
        assert_eq!(config.upload_dir(), PathBuf::from("./data/uploads"));
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("HOST", "0.0.0.0"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
            ("MAX_UPLOAD_BYTES", "2048"),
            ("UPLOAD_CHUNK_BYTES", "512"),
            ("RATE_LIMIT_ENABLED", "false"),
            ("DATA_DIR", "/srv/iris"),
            ("COLLISION_POLICY", "disambiguate"),
        ]);

        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(
            config.allowed_origins,
            Some(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ])
        );
        assert!(!config.rate_limit_enabled);

        let ingest = config.ingest_config();
        assert_eq!(ingest.max_bytes, 2048);
        assert_eq!(ingest.chunk_size, 512);
        assert_eq!(ingest.collision, CollisionPolicy::Disambiguate);
        assert_eq!(config.upload_dir(), PathBuf::from("/srv/iris/uploads"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("PORT", "not-a-port"),
            ("UPLOAD_CHUNK_BYTES", "0"),
            ("COLLISION_POLICY", "shrug"),
        ]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.upload_chunk_bytes, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.collision_policy, CollisionPolicy::Overwrite);
    }

    #[test]
    fn test_memory_backend() {
        let config = config_from(&[("DATABASE_URL", "memory")]);
        assert_eq!(config.store_backend(), StoreBackend::Memory);

        let config = config_from(&[("DATABASE_URL", "sqlite::memory:")]);
        assert_eq!(
            config.store_backend(),
            StoreBackend::Sqlite("sqlite::memory:".to_string())
        );
    }
}
