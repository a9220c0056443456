use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::store::{ArchiveCutoff, ConflictPolicy, StoreOptions};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATA_FILE: &str = "./data/bookings.json";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid value {value:?} for {key}: expected {expected}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Process configuration, read from `ROOMBOOK_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    pub data_file: PathBuf,
    pub store: StoreOptions,
    /// Periodic archival sweep; `None` sweeps only when active bookings are listed.
    pub sweep_interval: Option<Duration>,
    pub metrics_port: Option<u16>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind = lookup("ROOMBOOK_BIND").unwrap_or_else(|| "0.0.0.0".into());

        let port = match lookup("ROOMBOOK_PORT") {
            Some(v) => parse_port("ROOMBOOK_PORT", v)?,
            None => match lookup("PORT") {
                Some(v) => parse_port("PORT", v)?,
                None => DEFAULT_PORT,
            },
        };

        let data_file = lookup("ROOMBOOK_DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

        let conflict_policy = match lookup("ROOMBOOK_CONFLICT_POLICY") {
            Some(v) => parse_conflict_policy(v)?,
            None => ConflictPolicy::default(),
        };
        let archive_cutoff = match lookup("ROOMBOOK_ARCHIVE_CUTOFF") {
            Some(v) => parse_archive_cutoff(v)?,
            None => ArchiveCutoff::default(),
        };

        let sweep_interval = match lookup("ROOMBOOK_SWEEP_INTERVAL_SECS") {
            Some(v) => {
                let parsed = v.trim().parse::<u64>();
                match parsed {
                    Ok(0) => None,
                    Ok(secs) => Some(Duration::from_secs(secs)),
                    Err(_) => return Err(invalid("ROOMBOOK_SWEEP_INTERVAL_SECS", v, "whole seconds")),
                }
            }
            None => None,
        };

        let metrics_port = match lookup("ROOMBOOK_METRICS_PORT") {
            Some(v) => Some(parse_port("ROOMBOOK_METRICS_PORT", v)?),
            None => None,
        };

        Ok(Self {
            bind,
            port,
            data_file,
            store: StoreOptions {
                conflict_policy,
                archive_cutoff,
            },
            sweep_interval,
            metrics_port,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn invalid(key: &'static str, value: String, expected: &'static str) -> ConfigError {
    ConfigError { key, value, expected }
}

fn parse_port(key: &'static str, value: String) -> Result<u16, ConfigError> {
    let parsed = value.trim().parse();
    parsed.map_err(|_| invalid(key, value, "a port number"))
}

fn parse_conflict_policy(value: String) -> Result<ConflictPolicy, ConfigError> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "reject" => Ok(ConflictPolicy::Reject),
        "allow" => Ok(ConflictPolicy::Allow),
        _ => Err(invalid("ROOMBOOK_CONFLICT_POLICY", value, "reject or allow")),
    }
}

fn parse_archive_cutoff(value: String) -> Result<ArchiveCutoff, ConfigError> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "daily" => Ok(ArchiveCutoff::Daily),
        "weekly" => Ok(ArchiveCutoff::Weekly),
        _ => Err(invalid("ROOMBOOK_ARCHIVE_CUTOFF", value, "daily or weekly")),
    }
}
