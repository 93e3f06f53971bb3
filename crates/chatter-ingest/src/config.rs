//! Daemon configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Topic to subscribe to.
    pub topic: String,

    /// Broker bootstrap address (host:port).
    pub broker_address: String,

    /// Consumer group id.
    pub consumer_group: String,

    /// Bounded wait for a single pull from the topic.
    pub poll_interval: Duration,

    /// SQLite database file path.
    pub db_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - None (all have defaults for local development)
    ///
    /// Optional:
    /// - `CHATTER_TOPIC`: topic name (default: "chatter-messages")
    /// - `KAFKA_BROKER_ADDRESS`: bootstrap address (default: "localhost:9092")
    /// - `CHATTER_CONSUMER_GROUP`: group id (default: "chatter-consumer")
    /// - `CHATTER_POLL_INTERVAL_SECS`: poll timeout in whole seconds (default: 1)
    /// - `CHATTER_DB_PATH`: database file (default: "./data/chatter.sqlite")
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `CHATTER_POLL_INTERVAL_SECS` is set but
    /// does not parse as an integer.
    pub fn from_env() -> Result<Self> {
        let topic =
            std::env::var("CHATTER_TOPIC").unwrap_or_else(|_| "chatter-messages".to_string());

        let broker_address =
            std::env::var("KAFKA_BROKER_ADDRESS").unwrap_or_else(|_| "localhost:9092".to_string());

        let consumer_group =
            std::env::var("CHATTER_CONSUMER_GROUP").unwrap_or_else(|_| "chatter-consumer".to_string());

        let poll_secs = std::env::var("CHATTER_POLL_INTERVAL_SECS").unwrap_or_else(|_| "1".to_string());
        let poll_secs: u64 = poll_secs.parse().map_err(|_| {
            Error::Config(format!(
                "CHATTER_POLL_INTERVAL_SECS must be an integer, got {poll_secs:?}"
            ))
        })?;

        let db_path = PathBuf::from(
            std::env::var("CHATTER_DB_PATH").unwrap_or_else(|_| "./data/chatter.sqlite".to_string()),
        );

        tracing::info!(
            topic = %topic,
            broker = %broker_address,
            group = %consumer_group,
            poll_interval_secs = poll_secs,
            db_path = %db_path.display(),
            "consumer configuration loaded"
        );

        Ok(Self {
            topic,
            broker_address,
            consumer_group,
            poll_interval: Duration::from_secs(poll_secs),
            db_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize config tests that manipulate env vars.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_KEYS: &[&str] = &[
        "CHATTER_TOPIC",
        "KAFKA_BROKER_ADDRESS",
        "CHATTER_CONSUMER_GROUP",
        "CHATTER_POLL_INTERVAL_SECS",
        "CHATTER_DB_PATH",
    ];

    /// Helper to run config tests with isolated env vars.
    /// Uses a mutex to prevent concurrent env var races.
    fn with_env_vars<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let _guard = ENV_MUTEX.lock().unwrap();

        let saved: Vec<_> = ENV_KEYS
            .iter()
            .map(|k| (*k, std::env::var(k).ok()))
            .collect();

        // SAFETY: Serialized by mutex; only test code touches these vars.
        unsafe {
            for k in ENV_KEYS {
                std::env::remove_var(k);
            }
            for (k, v) in vars {
                std::env::set_var(k, v);
            }
        }

        f();

        // SAFETY: Restoring original env state.
        unsafe {
            for (k, v) in &saved {
                match v {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    #[test]
    fn config_defaults() {
        with_env_vars(&[], || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.topic, "chatter-messages");
            assert_eq!(config.broker_address, "localhost:9092");
            assert_eq!(config.consumer_group, "chatter-consumer");
            assert_eq!(config.poll_interval, Duration::from_secs(1));
            assert_eq!(config.db_path, PathBuf::from("./data/chatter.sqlite"));
        });
    }

    #[test]
    fn config_custom_values() {
        with_env_vars(
            &[
                ("CHATTER_TOPIC", "firehose"),
                ("KAFKA_BROKER_ADDRESS", "broker:9093"),
                ("CHATTER_CONSUMER_GROUP", "replay"),
                ("CHATTER_POLL_INTERVAL_SECS", "5"),
                ("CHATTER_DB_PATH", "/var/lib/chatter.sqlite"),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.topic, "firehose");
                assert_eq!(config.broker_address, "broker:9093");
                assert_eq!(config.consumer_group, "replay");
                assert_eq!(config.poll_interval, Duration::from_secs(5));
                assert_eq!(config.db_path, PathBuf::from("/var/lib/chatter.sqlite"));
            },
        );
    }

    #[test]
    fn config_rejects_non_integer_interval() {
        with_env_vars(&[("CHATTER_POLL_INTERVAL_SECS", "fast")], || {
            let err = Config::from_env().unwrap_err();
            assert!(matches!(err, Error::Config(_)));
            assert!(err.to_string().contains("CHATTER_POLL_INTERVAL_SECS"));
        });
    }

    #[test]
    fn config_rejects_fractional_interval() {
        with_env_vars(&[("CHATTER_POLL_INTERVAL_SECS", "1.5")], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn config_zero_interval_allowed() {
        with_env_vars(&[("CHATTER_POLL_INTERVAL_SECS", "0")], || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.poll_interval, Duration::ZERO);
        });
    }
}
