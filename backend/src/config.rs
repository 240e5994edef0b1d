//! Process configuration read from the environment at startup.
//!
//! `DATABASE_URL` is the only required variable; the server refuses to start without it.
//! Everything else falls back to a default:
//!
//! | variable            | default        |
//! |---------------------|----------------|
//! | `DUPLICATE_POLICY`  | `content-hash` |
//! | `TOPICS_COLLECTION` | `topics`       |
//! | `HOST`              | `127.0.0.1`    |
//! | `PORT`              | `8080`         |
//! | `MAX_UPLOAD_BYTES`  | 10 MiB         |

use crate::error::ConfigError;
use crate::ingest::guard::DuplicatePolicy;
use std::path::PathBuf;

const DEFAULT_TOPICS_COLLECTION: &str = "topics";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    /// Location of the SQLite document store.
    pub database_path: PathBuf,
    pub policy: DuplicatePolicy,
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let database_path = database_path(&database_url);

        let topics_collection = lookup("TOPICS_COLLECTION")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TOPICS_COLLECTION.to_string());

        let policy = match lookup("DUPLICATE_POLICY") {
            Some(raw) => DuplicatePolicy::parse(&raw, topics_collection).ok_or_else(|| {
                ConfigError::Invalid {
                    name: "DUPLICATE_POLICY",
                    value: raw.clone(),
                    message: "expected content-hash, file-name or user-named".to_string(),
                }
            })?,
            None => DuplicatePolicy::ContentHash {
                collection: topics_collection,
            },
        };

        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let max_upload_bytes = parse_or(
            "MAX_UPLOAD_BYTES",
            lookup("MAX_UPLOAD_BYTES"),
            DEFAULT_MAX_UPLOAD_BYTES,
        )?;

        Ok(Config {
            database_path,
            policy,
            host,
            port,
            max_upload_bytes,
        })
    }
}

/// Accepts both a bare path and a `sqlite://` URL.
fn database_path(url: &str) -> PathBuf {
    let url = url.trim();
    PathBuf::from(url.strip_prefix("sqlite://").unwrap_or(url))
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|e| ConfigError::Invalid {
                name,
                message: e.to_string(),
                value,
            })
        }
    }
}
