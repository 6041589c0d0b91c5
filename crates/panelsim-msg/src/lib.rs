//! ---
//! ems_section: "02-messaging-ipc-data-model"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Publish sink abstraction and backends."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
#![warn(missing_docs)]
//! Publish sinks for panel records.
//!
//! Every sink implements [`PublishSink`]: fire-and-forget delivery of a text payload to a
//! topic, plus a single orderly disconnect.

#[cfg(feature = "mqtt")]
pub mod mqtt;
pub mod sink;

use std::time::Duration;

/// Shared result type for sink operations.
pub type Result<T> = std::result::Result<T, MessagingError>;

/// Failures surfaced by publish sinks.
#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    /// The broker did not acknowledge the session in time.
    #[error("broker {endpoint} did not acknowledge the session within {timeout:?}")]
    ConnectTimeout {
        /// `host:port` of the broker.
        endpoint: String,
        /// Configured wait.
        timeout: Duration,
    },
    /// The MQTT session could not be established or was lost.
    #[cfg(feature = "mqtt")]
    #[error("broker connection failed: {0}")]
    Connection(#[from] rumqttc::ConnectionError),
    /// The MQTT client refused the request, usually because the session is gone.
    #[cfg(feature = "mqtt")]
    #[error("publish request rejected: {0}")]
    Client(#[from] rumqttc::ClientError),
    /// The sink was already disconnected or was told to fail.
    #[error("sink '{0}' is closed")]
    Closed(&'static str),
    /// Wrapper for IO errors raised by stream sinks.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "mqtt")]
pub use mqtt::MqttSink;
pub use sink::{InMemorySink, PublishSink, PublishedMessage, StdoutSink};
