//! ---
//! ems_section: "02-messaging-ipc-data-model"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "MQTT publish sink backed by rumqttc."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::time::Duration;

use async_trait::async_trait;
use panelsim_common::BrokerConfig;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

use crate::sink::PublishSink;
use crate::{MessagingError, Result};

/// Upper bound on waiting for the DISCONNECT packet to be flushed.
const DISCONNECT_FLUSH: Duration = Duration::from_secs(5);

/// MQTT sink publishing at QoS 0 without retain.
///
/// The rumqttc event loop runs on a spawned task. If that task stops (broker gone,
/// socket error) the next [`PublishSink::publish`] call fails.
pub struct MqttSink {
    client: AsyncClient,
    driver: Option<JoinHandle<()>>,
    endpoint: String,
    closed: bool,
}

impl MqttSink {
    /// Open a session and wait for the broker's CONNACK.
    pub async fn connect(config: &BrokerConfig) -> Result<Self> {
        let endpoint = config.endpoint();
        let mut options =
            MqttOptions::new(config.client_id.clone(), config.host.clone(), config.port);
        options.set_keep_alive(config.keep_alive);
        let (client, mut eventloop) = AsyncClient::new(options, config.request_capacity);

        info!(%endpoint, client_id = %config.client_id, "connecting to broker");
        timeout(config.connect_timeout, await_connack(&mut eventloop))
            .await
            .map_err(|_| MessagingError::ConnectTimeout {
                endpoint: endpoint.clone(),
                timeout: config.connect_timeout,
            })??;
        info!(%endpoint, "broker session established");

        let driver = tokio::spawn(drive_event_loop(eventloop, endpoint.clone()));
        Ok(Self {
            client,
            driver: Some(driver),
            endpoint,
            closed: false,
        })
    }

    /// `host:port` of the connected broker.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PublishSink for MqttSink {
    async fn publish(&mut self, topic: &str, payload: &str) -> Result<()> {
        if self.closed {
            return Err(MessagingError::Closed(self.name()));
        }
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload.as_bytes().to_vec())
            .await?;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.client.disconnect().await?;
        if let Some(driver) = self.driver.take() {
            match timeout(DISCONNECT_FLUSH, driver).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(endpoint = %self.endpoint, error = %err, "event loop join error"),
                Err(_) => warn!(endpoint = %self.endpoint, "disconnect not flushed in time"),
            }
        }
        info!(endpoint = %self.endpoint, "disconnected from broker");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mqtt"
    }
}

impl Drop for MqttSink {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}

async fn await_connack(eventloop: &mut EventLoop) -> Result<()> {
    loop {
        match eventloop.poll().await? {
            Event::Incoming(Packet::ConnAck(ack)) => {
                debug!(session_present = ack.session_present, "connack received");
                return Ok(());
            }
            event => trace!(?event, "awaiting connack"),
        }
    }
}

async fn drive_event_loop(mut eventloop: EventLoop, endpoint: String) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                debug!(%endpoint, "disconnect sent");
                break;
            }
            Ok(event) => trace!(?event, "mqtt event"),
            Err(err) => {
                warn!(%endpoint, error = %err, "mqtt event loop stopped");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_to_closed_port_fails() {
        let config = BrokerConfig {
            host: "127.0.0.1".into(),
            port: 1,
            connect_timeout: Duration::from_secs(2),
            ..BrokerConfig::default()
        };
        let err = match MqttSink::connect(&config).await {
            Ok(_) => panic!("no broker listens on port 1"),
            Err(err) => err,
        };
        assert!(matches!(
            err,
            MessagingError::Connection(_) | MessagingError::ConnectTimeout { .. }
        ));
    }
}
