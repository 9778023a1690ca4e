//! Cosmetic rotating status line for the analyzing screen.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

pub const DEFAULT_STATUS_MESSAGES: &[&str] = &[
    "Reading your answers...",
    "Matching choices to strength themes...",
    "Weighing the four domains...",
    "Looking for patterns across your responses...",
    "Writing your personal summary...",
];

/// Periodic task that cycles through status messages until cancelled.
///
/// Cancelled by [`StatusTicker::cancel`] or on drop, whichever comes first.
#[derive(Debug)]
pub struct StatusTicker {
    token: CancellationToken,
    receiver: watch::Receiver<String>,
    handle: JoinHandle<()>,
}

impl StatusTicker {
    /// Spawn the ticker on the current tokio runtime. The first message is
    /// visible immediately; the next appears after one `period`.
    pub fn start(messages: Vec<String>, period: Duration) -> Self {
        let messages = if messages.is_empty() {
            DEFAULT_STATUS_MESSAGES.iter().map(|m| m.to_string()).collect()
        } else {
            messages
        };
        let (tx, receiver) = watch::channel(messages[0].clone());
        let token = CancellationToken::new();
        let child = token.clone();
        let period = period.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut index = 0usize;
            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = interval.tick() => {
                        index = (index + 1) % messages.len();
                        trace!(index, "Rotating status message");
                        if tx.send(messages[index].clone()).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self { token, receiver, handle }
    }

    /// Message currently on display.
    pub fn current(&self) -> String {
        self.receiver.borrow().clone()
    }

    /// A receiver that sees every rotation; `changed()` errors once the ticker stops.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.receiver.clone()
    }

    pub fn cancel(self) {
        // Drop does the work.
    }
}

impl Drop for StatusTicker {
    fn drop(&mut self) {
        self.token.cancel();
        if !self.handle.is_finished() {
            trace!("Status ticker cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rotates_and_stops_on_drop() {
        let ticker = StatusTicker::start(vec!["one".into(), "two".into()], Duration::from_millis(10));
        let mut rx = ticker.subscribe();
        assert_eq!(ticker.current(), "one");

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "two");
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "one");

        drop(ticker);
        let drained = tokio::time::timeout(Duration::from_secs(2), async {
            while rx.changed().await.is_ok() {}
        })
        .await;
        assert!(drained.is_ok());
    }

    #[tokio::test]
    async fn empty_message_list_falls_back_to_defaults() {
        let ticker = StatusTicker::start(Vec::new(), Duration::from_secs(60));
        assert_eq!(ticker.current(), DEFAULT_STATUS_MESSAGES[0]);
        ticker.cancel();
    }
}
