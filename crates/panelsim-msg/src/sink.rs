//! ---
//! ems_section: "02-messaging-ipc-data-model"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Publish sink abstraction and backends."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{MessagingError, Result};

/// Destination for published records.
#[async_trait]
pub trait PublishSink: Send {
    /// Hand `payload` to the transport for `topic`. At-most-once; no acknowledgment is awaited.
    async fn publish(&mut self, topic: &str, payload: &str) -> Result<()>;
    /// Close the session. Called once on orderly shutdown.
    async fn disconnect(&mut self) -> Result<()>;
    /// Human-readable sink name for logging.
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<S: PublishSink + ?Sized> PublishSink for Box<S> {
    async fn publish(&mut self, topic: &str, payload: &str) -> Result<()> {
        (**self).publish(topic, payload).await
    }

    async fn disconnect(&mut self) -> Result<()> {
        (**self).disconnect().await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// One message captured by [`InMemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    /// Topic the payload was published to.
    pub topic: String,
    /// Payload text.
    pub payload: String,
}

#[derive(Debug, Default)]
struct Recorded {
    messages: Vec<PublishedMessage>,
    disconnects: usize,
    fail_after: Option<usize>,
}

/// Sink that records publishes in memory. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct InMemorySink {
    recorded: Arc<Mutex<Recorded>>,
}

impl InMemorySink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink whose publishes start failing once `accepted` messages were recorded.
    pub fn failing_after(accepted: usize) -> Self {
        let sink = Self::default();
        sink.recorded.lock().fail_after = Some(accepted);
        sink
    }

    /// Snapshot of every message published so far.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.recorded.lock().messages.clone()
    }

    /// How many times [`PublishSink::disconnect`] was called.
    pub fn disconnects(&self) -> usize {
        self.recorded.lock().disconnects
    }
}

#[async_trait]
impl PublishSink for InMemorySink {
    async fn publish(&mut self, topic: &str, payload: &str) -> Result<()> {
        let mut recorded = self.recorded.lock();
        let exhausted = recorded
            .fail_after
            .is_some_and(|limit| recorded.messages.len() >= limit);
        if recorded.disconnects > 0 || exhausted {
            return Err(MessagingError::Closed(self.name()));
        }
        recorded.messages.push(PublishedMessage {
            topic: topic.to_owned(),
            payload: payload.to_owned(),
        });
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.recorded.lock().disconnects += 1;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}

/// Writes each payload as a line on stdout. Used for dry runs without a broker.
#[derive(Debug, Default)]
pub struct StdoutSink {
    closed: bool,
}

impl StdoutSink {
    /// Create a stdout sink.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PublishSink for StdoutSink {
    async fn publish(&mut self, _topic: &str, payload: &str) -> Result<()> {
        if self.closed {
            return Err(MessagingError::Closed(self.name()));
        }
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{payload}")?;
        stdout.flush()?;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}
