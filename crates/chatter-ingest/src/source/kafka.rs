//! Kafka topic source adapter.
//!
//! Wraps a synchronous [`BaseConsumer`] in the [`MessageSource`] trait. The
//! pull loop blocks on `poll` with a bounded timeout so the cancel token is
//! re-checked at least once per interval even when the topic is quiet.
//!
//! Bootstrap checks are deliberately split: [`verify_broker`] probes the
//! cluster before the group consumer exists, [`KafkaSource::connect`] builds
//! the consumer, and [`KafkaSource::verify_topic`] confirms the topic has
//! been created. The daemon maps each failure to its own exit code.

use std::time::Duration;

use chatter_core::RawMessage;
use rdkafka::ClientConfig;
use rdkafka::Message;
use rdkafka::consumer::{BaseConsumer, Consumer};

use super::{CancelToken, MessageSource, SourceMetadata, SourceStats};
use crate::error::{Error, Result};

/// Configuration for the Kafka source.
#[derive(Debug, Clone)]
pub struct KafkaConfig {
    /// Broker bootstrap address list (host:port).
    pub brokers: String,

    /// Topic to subscribe to.
    pub topic: String,

    /// Consumer group id.
    pub group_id: String,

    /// Bounded wait for a single poll.
    pub poll_timeout: Duration,

    /// Timeout for metadata requests during bootstrap checks.
    pub metadata_timeout: Duration,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            topic: "chatter-messages".to_string(),
            group_id: "chatter-consumer".to_string(),
            poll_timeout: Duration::from_secs(1),
            metadata_timeout: Duration::from_secs(5),
        }
    }
}

/// Check that a broker answers a metadata request.
///
/// Runs before the group consumer is constructed, using a throwaway client,
/// so an unreachable cluster is reported as its own bootstrap failure.
///
/// # Errors
///
/// Returns [`Error::BrokerUnreachable`] when the client cannot be built or
/// no metadata arrives within the timeout.
pub fn verify_broker(brokers: &str, timeout: Duration) -> Result<()> {
    let probe: BaseConsumer = ClientConfig::new()
        .set("bootstrap.servers", brokers)
        .create()
        .map_err(|e| Error::BrokerUnreachable(e.to_string()))?;

    let metadata = probe
        .fetch_metadata(None, timeout)
        .map_err(|e| Error::BrokerUnreachable(format!("{brokers}: {e}")))?;

    tracing::info!(
        brokers = %brokers,
        broker_count = metadata.brokers().len(),
        "broker reachable"
    );
    Ok(())
}

/// Build the librdkafka property map for the group consumer.
fn client_config(config: &KafkaConfig) -> ClientConfig {
    let mut cc = ClientConfig::new();
    cc.set("bootstrap.servers", &config.brokers)
        .set("group.id", &config.group_id)
        .set("enable.auto.commit", "true")
        .set("auto.offset.reset", "earliest");
    cc
}

/// Kafka topic message source.
pub struct KafkaSource {
    config: KafkaConfig,
    consumer: BaseConsumer,
    cancel: CancelToken,
    partitions: Option<usize>,
}

impl KafkaSource {
    /// Build the group consumer.
    ///
    /// Offsets start at the earliest available record and commits are
    /// automatic; together these give the pipeline its at-least-once
    /// delivery. Construction does not contact the broker.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Kafka`] when the client rejects the configuration.
    pub fn connect(config: KafkaConfig, cancel: CancelToken) -> Result<Self> {
        let consumer: BaseConsumer = client_config(&config).create()?;
        tracing::info!(group = %config.group_id, topic = %config.topic, "consumer created");
        Ok(Self {
            config,
            consumer,
            cancel,
            partitions: None,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &KafkaConfig {
        &self.config
    }

    /// Check that the topic exists and has partitions.
    ///
    /// The producer owns topic creation; consuming a topic that is not there
    /// yet is a bootstrap failure, not something to retry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TopicUnavailable`] when the topic is missing, is in
    /// an error state, or reports zero partitions.
    pub fn verify_topic(&mut self) -> Result<()> {
        let metadata = self
            .consumer
            .fetch_metadata(Some(&self.config.topic), self.config.metadata_timeout)?;

        let topic = metadata
            .topics()
            .iter()
            .find(|t| t.name() == self.config.topic)
            .ok_or_else(|| Error::TopicUnavailable(self.config.topic.clone()))?;

        if topic.error().is_some() || topic.partitions().is_empty() {
            return Err(Error::TopicUnavailable(self.config.topic.clone()));
        }

        tracing::info!(
            topic = %self.config.topic,
            partitions = topic.partitions().len(),
            "topic available"
        );
        self.partitions = Some(topic.partitions().len());
        Ok(())
    }
}

impl MessageSource for KafkaSource {
    fn name(&self) -> &'static str {
        "kafka"
    }

    fn process<F>(&mut self, mut handler: F) -> Result<SourceStats>
    where
        F: FnMut(RawMessage) -> Result<bool>,
    {
        let mut stats = SourceStats::default();

        self.consumer.subscribe(&[self.config.topic.as_str()])?;
        tracing::info!(topic = %self.config.topic, "subscribed, entering poll loop");

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!("stop requested, leaving poll loop");
                break;
            }

            let message = match self.consumer.poll(self.config.poll_timeout) {
                // Nothing within the timeout; re-check the token.
                None => continue,
                Some(Ok(m)) => m,
                Some(Err(e)) => {
                    // Broker-level failure, fatal to the run.
                    tracing::error!(error = %e, "stream error from broker");
                    return Err(e.into());
                }
            };

            stats.total_records += 1;

            let Some(payload) = message.payload() else {
                tracing::warn!(
                    partition = message.partition(),
                    offset = message.offset(),
                    "skipping record with empty payload"
                );
                stats.parse_errors += 1;
                continue;
            };

            let raw = match RawMessage::from_slice(payload) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        partition = message.partition(),
                        offset = message.offset(),
                        "skipping undecodable payload"
                    );
                    stats.parse_errors += 1;
                    continue;
                }
            };

            stats.delivered_records += 1;

            match handler(raw) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::info!("handler signaled stop");
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        stats.source_metadata = SourceMetadata {
            partitions: self.partitions,
            ..Default::default()
        };

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = KafkaConfig::default();
        assert_eq!(config.brokers, "localhost:9092");
        assert_eq!(config.topic, "chatter-messages");
        assert_eq!(config.group_id, "chatter-consumer");
        assert_eq!(config.poll_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_client_config_properties() {
        let cc = client_config(&KafkaConfig::default());
        assert_eq!(cc.get("bootstrap.servers"), Some("localhost:9092"));
        assert_eq!(cc.get("group.id"), Some("chatter-consumer"));
        assert_eq!(cc.get("enable.auto.commit"), Some("true"));
        assert_eq!(cc.get("auto.offset.reset"), Some("earliest"));
    }

    #[test]
    fn test_connect_does_not_require_running_broker() {
        // librdkafka connects lazily; construction only validates properties.
        let source = KafkaSource::connect(KafkaConfig::default(), CancelToken::new());
        assert!(source.is_ok());
        assert_eq!(source.unwrap().name(), "kafka");
    }
}
