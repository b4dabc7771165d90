use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::Result;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub postgres: PostgresConfig,
    #[serde(default)]
    pub subscription: SubscriptionConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostgresConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// What the polling loop does with a line the decoder rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParseFailurePolicy {
    /// Stop the subscription and return the failure.
    #[default]
    Abort,
    /// Log the line and carry on with the next one.
    Skip,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubscriptionConfig {
    #[serde(default = "default_slot_name")]
    pub slot_name: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Upper bound on changes consumed per poll; unbounded when absent.
    #[serde(default)]
    pub max_changes: Option<u32>,
    #[serde(default = "default_true")]
    pub create_slot: bool,
    #[serde(default = "default_true")]
    pub drop_slot_on_exit: bool,
    #[serde(default)]
    pub on_parse_failure: ParseFailurePolicy,
    /// Capacity of the channel between the polling loop and its consumer.
    #[serde(default = "default_max_buffer_size")]
    pub max_buffer_size: usize,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            slot_name: default_slot_name(),
            poll_interval_ms: default_poll_interval_ms(),
            max_changes: None,
            create_slot: true,
            drop_slot_on_exit: true,
            on_parse_failure: ParseFailurePolicy::default(),
            max_buffer_size: default_max_buffer_size(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("PG_REALTIME")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn postgres_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?connect_timeout={}",
            self.postgres.username,
            self.postgres.password,
            self.postgres.host,
            self.postgres.port,
            self.postgres.database,
            self.postgres.connect_timeout_secs
        )
    }
}

impl SubscriptionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn default_port() -> u16 {
    5432
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_slot_name() -> String {
    "realtime_rs".to_string()
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_max_buffer_size() -> usize {
    1000
}

fn default_true() -> bool {
    true
}
