//! Periodic draining of the result channel into the shared store.
//!
//! The aggregator is the single writer to the result store; producers
//! (executors and the supervisor) only ever touch the channel. Draining
//! on a fixed period decouples producer cadence from store updates and
//! keeps channel growth bounded without blocking any producer.

use crate::models::{Outcome, ResultStore};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::debug;

/// Lock the store, recovering from poisoning.
///
/// Only the aggregator writes, so a poisoned store still holds every
/// outcome merged before the panic.
pub(crate) fn lock_store(store: &Mutex<ResultStore>) -> MutexGuard<'_, ResultStore> {
    store.lock().unwrap_or_else(|e| e.into_inner())
}

/// Spawn the aggregator task.
///
/// It wakes every `flush_period`, merges all currently-available
/// outcomes, and exits once the channel is closed and provably empty.
/// Closing the channel (dropping every sender) is the shutdown signal;
/// no outcome enqueued before that point can be lost.
pub fn spawn(
    rx: UnboundedReceiver<Outcome>,
    store: Arc<Mutex<ResultStore>>,
    flush_period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(run(rx, store, flush_period))
}

async fn run(
    mut rx: UnboundedReceiver<Outcome>,
    store: Arc<Mutex<ResultStore>>,
    flush_period: Duration,
) {
    let mut ticker = tokio::time::interval(flush_period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if drain(&mut rx, &store) {
            break;
        }
    }
    debug!("aggregator stopped; {} outcomes merged", lock_store(&store).total());
}

/// Merge everything currently queued. Returns true once the channel is
/// disconnected, which tokio reports only after the queue is empty.
fn drain(rx: &mut UnboundedReceiver<Outcome>, store: &Mutex<ResultStore>) -> bool {
    loop {
        match rx.try_recv() {
            Ok(outcome) => lock_store(store).merge(outcome),
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => return true,
        }
    }
}
