use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

use adcp_state::DeviceState;

/// Single-writer/multi-reader cell holding the latest device snapshot.
///
/// The receiver thread is the only writer; each publish replaces the whole
/// snapshot atomically and fans it out to subscribers. Readers only ever
/// get `Arc` clones, never a mutable view of a live snapshot.
pub struct StateCell {
    latest: Mutex<Option<Arc<DeviceState>>>,
    subscribers: Mutex<Vec<Sender<Arc<DeviceState>>>>,
}

impl StateCell {
    pub fn new() -> Self {
        Self {
            latest: Mutex::new(None),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    fn lock<'a, T>(mutex: &'a Mutex<T>) -> MutexGuard<'a, T> {
        mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the snapshot and notify subscribers.
    ///
    /// Subscribers whose receiving end is gone are pruned here.
    pub fn publish(&self, state: Arc<DeviceState>) {
        *Self::lock(&self.latest) = Some(Arc::clone(&state));

        let mut subscribers = Self::lock(&self.subscribers);
        subscribers.retain(|tx| tx.send(Arc::clone(&state)).is_ok());
    }

    /// The most recent snapshot, if any status has been seen yet.
    pub fn latest(&self) -> Option<Arc<DeviceState>> {
        Self::lock(&self.latest).clone()
    }

    /// Register for every future snapshot.
    pub fn subscribe(&self) -> Receiver<Arc<DeviceState>> {
        let (tx, rx) = channel();
        Self::lock(&self.subscribers).push(tx);
        rx
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}
