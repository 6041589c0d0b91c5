//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Tick cadence and cooperative cancellation."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::sync::Arc;
use std::time::Duration;

use panelsim_common::SimulationConfig;
use tokio::sync::watch;

/// How often the loop ticks and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSchedule {
    /// Pause between the end of one tick and the start of the next.
    pub interval: Duration,
    /// Tick budget; unbounded when `None`.
    pub max_ticks: Option<u64>,
}

impl TickSchedule {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_ticks: None,
        }
    }

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            interval: config.tick_interval,
            max_ticks: config.max_ticks,
        }
    }

    /// Whether another tick may run after `completed` ticks.
    pub fn allows(&self, completed: u64) -> bool {
        self.max_ticks.map_or(true, |max| completed < max)
    }
}

/// Create a linked trigger/signal pair.
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (
        ShutdownTrigger { tx: Arc::new(tx) },
        ShutdownSignal { rx },
    )
}

/// Requests cancellation. Triggering more than once is harmless.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

/// Cancellation token observed between ticks.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the trigger fires. Never resolves if every trigger was dropped unfired.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_schedule_always_allows() {
        let schedule = TickSchedule::new(Duration::from_secs(5));
        assert!(schedule.allows(0));
        assert!(schedule.allows(u64::MAX - 1));
    }

    #[test]
    fn budget_is_respected() {
        let schedule = TickSchedule::new(Duration::from_millis(1)).with_max_ticks(3);
        assert!(schedule.allows(2));
        assert!(!schedule.allows(3));
    }

    #[test]
    fn schedule_from_config() {
        let config = SimulationConfig {
            tick_interval: Duration::from_secs(2),
            seed: None,
            max_ticks: Some(10),
        };
        let schedule = TickSchedule::from_config(&config);
        assert_eq!(schedule.interval, Duration::from_secs(2));
        assert_eq!(schedule.max_ticks, Some(10));
    }

    #[tokio::test]
    async fn trigger_resolves_signal() {
        let (trigger, mut signal) = shutdown_channel();
        assert!(!signal.is_triggered());
        let clone = signal.clone();
        trigger.trigger();
        signal.cancelled().await;
        assert!(clone.is_triggered());
    }

    #[tokio::test]
    async fn dropped_trigger_never_cancels() {
        let (trigger, mut signal) = shutdown_channel();
        drop(trigger);
        let waited = tokio::time::timeout(Duration::from_millis(20), signal.cancelled()).await;
        assert!(waited.is_err());
        assert!(!signal.is_triggered());
    }
}
