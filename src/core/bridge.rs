//! One-shot completion gate.
//!
//! The connection task holds the [`CompletionGate`] and signals it with the
//! session's terminal outcome; the caller holds the [`CompletionWaiter`] and waits
//! for that signal with an upper bound. Only the first signal is delivered.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::timeout;

/// Signalling half, owned by the connection task
#[derive(Debug)]
pub struct CompletionGate<T> {
    tx: Option<oneshot::Sender<T>>,
}

/// Waiting half, owned by the caller
#[derive(Debug)]
pub struct CompletionWaiter<T> {
    rx: oneshot::Receiver<T>,
}

/// What the caller observed while waiting
#[derive(Debug, PartialEq)]
pub enum WaitOutcome<T> {
    /// The gate fired with a value
    Signaled(T),
    /// The deadline elapsed first
    TimedOut,
    /// The gate was dropped without firing
    Abandoned,
}

/// Create a connected gate/waiter pair.
pub fn completion_gate<T>() -> (CompletionGate<T>, CompletionWaiter<T>) {
    let (tx, rx) = oneshot::channel();
    (CompletionGate { tx: Some(tx) }, CompletionWaiter { rx })
}

impl<T> CompletionGate<T> {
    /// Deliver `value` to the waiter.
    ///
    /// Returns `true` only for the first call whose value reached a live waiter.
    /// Later calls are no-ops.
    pub fn signal(&mut self, value: T) -> bool {
        match self.tx.take() {
            Some(tx) => tx.send(value).is_ok(),
            None => false,
        }
    }

    /// Whether the waiter has given up (timed out or was dropped).
    pub fn is_abandoned(&self) -> bool {
        self.tx.as_ref().is_some_and(oneshot::Sender::is_closed)
    }
}

impl<T> CompletionWaiter<T> {
    /// Wait for the gate to fire, giving up after `deadline`.
    pub async fn wait(self, deadline: Duration) -> WaitOutcome<T> {
        match timeout(deadline, self.rx).await {
            Ok(Ok(value)) => WaitOutcome::Signaled(value),
            Ok(Err(_)) => WaitOutcome::Abandoned,
            Err(_) => WaitOutcome::TimedOut,
        }
    }
}
