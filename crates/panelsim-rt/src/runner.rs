//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Publish loop driving the signal generator."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use anyhow::{Context, Result};
use panelsim_msg::PublishSink;
use panelsim_sim::{Entropy, Framing, HourClock, SignalGenerator};
use tracing::{debug, info, warn};

use crate::scheduling::{ShutdownSignal, TickSchedule};

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The shutdown signal fired.
    Cancelled,
    /// The tick budget was used up.
    Completed,
}

impl StopReason {
    fn as_str(&self) -> &'static str {
        match self {
            StopReason::Cancelled => "cancelled",
            StopReason::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    /// Ticks published with alert framing.
    pub alerts: u64,
    pub stop: StopReason,
}

/// Ties a generator to a topic and a schedule.
#[derive(Debug)]
pub struct PanelRunner<E, C> {
    generator: SignalGenerator<E, C>,
    schedule: TickSchedule,
    topic: String,
}

impl<E: Entropy, C: HourClock> PanelRunner<E, C> {
    pub fn new(generator: SignalGenerator<E, C>, schedule: TickSchedule, topic: impl Into<String>) -> Self {
        Self {
            generator,
            schedule,
            topic: topic.into(),
        }
    }

    pub fn generator(&self) -> &SignalGenerator<E, C> {
        &self.generator
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Tick, publish and wait until cancelled or out of budget.
    ///
    /// Cancellation is observed before each tick and during the wait, never mid-tick. On a
    /// clean stop the sink is disconnected once. A publish error ends the loop immediately
    /// and is returned without disconnecting.
    pub async fn run<S>(&mut self, sink: &mut S, mut shutdown: ShutdownSignal) -> Result<RunSummary>
    where
        S: PublishSink + ?Sized,
    {
        let mut ticks = 0u64;
        let mut alerts = 0u64;
        info!(topic = %self.topic, sink = sink.name(), interval = ?self.schedule.interval, max_ticks = ?self.schedule.max_ticks, "simulation started");

        let stop = loop {
            if shutdown.is_triggered() {
                break StopReason::Cancelled;
            }
            if !self.schedule.allows(ticks) {
                break StopReason::Completed;
            }

            let outcome = self.generator.tick();
            let line = outcome.record.to_line();
            debug!(tick = outcome.tick, hour = outcome.hour, band = outcome.band.as_str(), "tick computed");
            sink.publish(&self.topic, &line)
                .await
                .with_context(|| format!("failed to publish tick {} to '{}'", outcome.tick, self.topic))?;
            ticks += 1;

            match outcome.record.framing() {
                Framing::Alert => {
                    alerts += 1;
                    warn!(tick = outcome.tick, topic = %self.topic, payload = %line, "data sent (HIGH TEMPERATURE)");
                }
                Framing::Normal => {
                    info!(tick = outcome.tick, topic = %self.topic, payload = %line, "data sent");
                }
            }

            if !self.schedule.allows(ticks) {
                break StopReason::Completed;
            }
            tokio::select! {
                _ = shutdown.cancelled() => break StopReason::Cancelled,
                _ = tokio::time::sleep(self.schedule.interval) => {}
            }
        };

        sink.disconnect()
            .await
            .with_context(|| format!("failed to disconnect {} sink", sink.name()))?;
        info!(ticks, alerts, reason = stop.as_str(), "simulation stopped");
        Ok(RunSummary { ticks, alerts, stop })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::shutdown_channel;
    use panelsim_msg::InMemorySink;
    use panelsim_sim::{FixedHour, PanelRecord, RandGenerator, StdEntropy};
    use std::time::Duration;

    const TOPIC: &str = "sensor/panel/utama";

    fn runner(max_ticks: Option<u64>, interval: Duration) -> PanelRunner<StdEntropy, FixedHour> {
        PanelRunner::new(
            RandGenerator::seeded(5, FixedHour::new(14)),
            TickSchedule { interval, max_ticks },
            TOPIC,
        )
    }

    #[tokio::test]
    async fn completes_tick_budget_and_disconnects_once() {
        let sink = InMemorySink::new();
        let (_trigger, signal) = shutdown_channel();
        let mut runner = runner(Some(5), Duration::from_millis(1));

        let summary = runner.run(&mut sink.clone(), signal).await.unwrap();

        assert_eq!(summary.ticks, 5);
        assert_eq!(summary.stop, StopReason::Completed);
        assert_eq!(sink.disconnects(), 1);
        let published = sink.published();
        assert_eq!(published.len(), 5);
        for message in published {
            assert_eq!(message.topic, TOPIC);
            let record: PanelRecord = message.payload.parse().unwrap();
            assert_eq!(record.humidity, 70.0);
        }
        assert_eq!(runner.generator().ticks(), 5);
    }

    #[tokio::test]
    async fn pre_triggered_shutdown_skips_ticks() {
        let sink = InMemorySink::new();
        let (trigger, signal) = shutdown_channel();
        trigger.trigger();

        let summary = runner(None, Duration::from_secs(5))
            .run(&mut sink.clone(), signal)
            .await
            .unwrap();

        assert_eq!(summary.ticks, 0);
        assert_eq!(summary.stop, StopReason::Cancelled);
        assert!(sink.published().is_empty());
        assert_eq!(sink.disconnects(), 1);
    }

    #[tokio::test]
    async fn cancellation_interrupts_the_wait() {
        let sink = InMemorySink::new();
        let (trigger, signal) = shutdown_channel();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.trigger();
        });

        // Without cancellation this would sleep for an hour after the first tick.
        let summary = runner(None, Duration::from_secs(3600))
            .run(&mut sink.clone(), signal)
            .await
            .unwrap();

        assert_eq!(summary.stop, StopReason::Cancelled);
        assert_eq!(summary.ticks, 1);
        assert_eq!(sink.disconnects(), 1);
    }

    #[tokio::test]
    async fn publish_failure_ends_the_loop_without_disconnect() {
        let sink = InMemorySink::failing_after(2);
        let (_trigger, signal) = shutdown_channel();

        let err = runner(None, Duration::from_millis(1))
            .run(&mut sink.clone(), signal)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("failed to publish tick 3"));
        assert_eq!(sink.published().len(), 2);
        assert_eq!(sink.disconnects(), 0);
    }

    #[tokio::test]
    async fn boxed_sink_is_accepted() {
        let recorder = InMemorySink::new();
        let mut sink: Box<dyn panelsim_msg::PublishSink> = Box::new(recorder.clone());
        let (_trigger, signal) = shutdown_channel();

        let summary = runner(Some(2), Duration::from_millis(1))
            .run(sink.as_mut(), signal)
            .await
            .unwrap();

        assert_eq!(summary.ticks, 2);
        assert_eq!(recorder.published().len(), 2);
    }
}
