// Snapshot Events - Fan-out of window snapshots to callbacks and channel receivers
// A reporter thread samples a window on a fixed cadence and publishes to the bus

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analytics::{SignalSet, Snapshot};
use crate::window::SlidingWindow;

const CHANNEL_CAPACITY: usize = 1024;
const DEFAULT_MAX_HISTORY: usize = 1000;

// ============================================================================
// Snapshot Event
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotEvent {
    pub event_id: String,
    pub source: String,
    pub snapshot: Snapshot,
    pub signals: Option<SignalSet>,
}

impl SnapshotEvent {
    pub fn new(source: &str, snapshot: Snapshot, signals: Option<SignalSet>) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            source: source.to_string(),
            snapshot,
            signals,
        }
    }

    pub fn timestamp(&self) -> i64 {
        self.snapshot.ts
    }
}

impl fmt::Display for SnapshotEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SnapshotEvent(source={}, trades={}, ts={}, id={})",
            self.source,
            self.snapshot.n_trades,
            self.snapshot.ts,
            &self.event_id[..8]
        )
    }
}

// ============================================================================
// Snapshot Bus
// ============================================================================

type SnapshotCallback = Arc<dyn Fn(&SnapshotEvent) + Send + Sync>;

pub struct SnapshotBus {
    tx: broadcast::Sender<SnapshotEvent>,
    subscribers: RwLock<Vec<SnapshotCallback>>,
    history: RwLock<VecDeque<SnapshotEvent>>,
    max_history: usize,
    stats: RwLock<SnapshotBusStats>,
}

#[derive(Debug, Clone, Default)]
struct SnapshotBusStats {
    total_published: u64,
    total_delivered: u64,
    channel_misses: u64, // published with no live channel receiver
}

/// Point-in-time bus counters
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotBusStatsSnapshot {
    pub total_published: u64,
    pub total_delivered: u64,
    pub channel_misses: u64,
    pub subscriber_count: usize,
    pub receiver_count: usize,
    pub history_size: usize,
}

impl SnapshotBus {
    pub fn new() -> Self {
        Self::with_history(DEFAULT_MAX_HISTORY)
    }

    pub fn with_history(max_history: usize) -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            subscribers: RwLock::new(Vec::new()),
            history: RwLock::new(VecDeque::with_capacity(max_history.min(DEFAULT_MAX_HISTORY))),
            max_history,
            stats: RwLock::new(SnapshotBusStats::default()),
        }
    }

    /// Register a callback invoked synchronously on every publish
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&SnapshotEvent) + Send + Sync + 'static,
    {
        self.subscribers.write().push(Arc::new(callback));
        debug!("Snapshot subscriber registered");
    }

    /// Receiver on the broadcast channel; lagging receivers lose the oldest events
    pub fn subscribe_channel(&self) -> broadcast::Receiver<SnapshotEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: SnapshotEvent) {
        {
            let mut history = self.history.write();
            history.push_back(event.clone());
            while history.len() > self.max_history {
                history.pop_front();
            }
        }

        let missed = self.tx.send(event.clone()).is_err();

        // Clone the list so callbacks may subscribe without deadlocking
        let callbacks: Vec<SnapshotCallback> = self.subscribers.read().clone();
        for callback in &callbacks {
            callback(&event);
        }

        let mut stats = self.stats.write();
        stats.total_published += 1;
        stats.total_delivered += callbacks.len() as u64;
        if missed {
            stats.channel_misses += 1;
        }
    }

    /// Most recent first
    pub fn get_recent(&self, limit: Option<usize>) -> Vec<SnapshotEvent> {
        let limit = limit.unwrap_or(100);
        self.history.read().iter().rev().take(limit).cloned().collect()
    }

    pub fn latest(&self) -> Option<SnapshotEvent> {
        self.history.read().back().cloned()
    }

    pub fn get_stats(&self) -> SnapshotBusStatsSnapshot {
        let stats = self.stats.read();
        SnapshotBusStatsSnapshot {
            total_published: stats.total_published,
            total_delivered: stats.total_delivered,
            channel_misses: stats.channel_misses,
            subscriber_count: self.subscribers.read().len(),
            receiver_count: self.tx.receiver_count(),
            history_size: self.history.read().len(),
        }
    }

    pub fn clear_history(&self) {
        self.history.write().clear();
    }
}

impl Default for SnapshotBus {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Snapshot Reporter
// ============================================================================

/// Background thread publishing `window.snapshot()` every `interval`.
/// Stops on [`stop`](Self::stop) or drop.
pub struct SnapshotReporter {
    stop_tx: Mutex<Option<mpsc::Sender<()>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    source: String,
}

impl SnapshotReporter {
    pub fn spawn(
        source: &str,
        window: Arc<SlidingWindow>,
        bus: Arc<SnapshotBus>,
        interval: Duration,
        with_signals: bool,
    ) -> std::io::Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let name = source.to_string();

        let handle = thread::Builder::new()
            .name(format!("snapshot-{}", source))
            .spawn(move || {
                info!(source = %name, interval_ms = interval.as_millis() as u64, "Snapshot reporter started");
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(mpsc::RecvTimeoutError::Timeout) => {
                            let snapshot = window.snapshot();
                            let signals = with_signals.then(|| window.signals());
                            bus.publish(SnapshotEvent::new(&name, snapshot, signals));
                        }
                        // Explicit stop or reporter dropped
                        Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    }
                }
                info!(source = %name, "Snapshot reporter stopped");
            })?;

        Ok(Self {
            stop_tx: Mutex::new(Some(stop_tx)),
            handle: Mutex::new(Some(handle)),
            source: source.to_string(),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.lock().as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal the thread and wait for it to exit. Idempotent.
    pub fn stop(&self) {
        if let Some(tx) = self.stop_tx.lock().take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                warn!(source = %self.source, "Snapshot reporter thread panicked");
            }
        }
    }
}

impl Drop for SnapshotReporter {
    fn drop(&mut self) {
        self.stop();
    }
}
