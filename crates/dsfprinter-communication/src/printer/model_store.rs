//! Machine model store
//!
//! Owns the single in-memory copy of the machine model. Every read and every
//! patch happens under one lock, and reads refresh the model first, so there
//! is no reader/writer split. Refreshes are throttled to one patch fetch per
//! throttle interval.

use crate::daemon::SubscribeConnection;
use dsfprinter_core::model::{heater_current, heater_target, lookup};
use dsfprinter_core::{apply_patch, HeaterIndexTable, Latch, PathKey, Result, StateError};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

struct ModelState {
    document: Value,
    heaters: HeaterIndexTable,
    next_refresh: Option<Instant>,
}

/// Authoritative local mirror of the daemon's machine model
pub struct ModelStore {
    connection: Box<dyn SubscribeConnection>,
    subscribed: Latch,
    throttle: Duration,
    state: Mutex<ModelState>,
}

impl ModelStore {
    /// Create an unsubscribed store.
    ///
    /// `subscribed` is set once the full model has been fetched.
    pub fn new(
        connection: Box<dyn SubscribeConnection>,
        subscribed: Latch,
        throttle: Duration,
    ) -> Self {
        Self {
            connection,
            subscribed,
            throttle,
            state: Mutex::new(ModelState {
                document: Value::Null,
                heaters: HeaterIndexTable::default(),
                next_refresh: None,
            }),
        }
    }

    /// Whether the full model has been fetched
    pub fn is_subscribed(&self) -> bool {
        self.subscribed.load(Ordering::SeqCst)
    }

    /// Connect, fetch the full model and derive the heater table.
    ///
    /// Fails with [`StateError::AlreadySubscribed`] when called twice.
    pub fn subscribe(&self) -> Result<()> {
        tracing::debug!("+subscribe");
        let mut state = self.state.lock();
        if self.is_subscribed() {
            tracing::warn!("already subscribed");
            return Err(StateError::AlreadySubscribed.into());
        }

        self.connection.connect()?;
        let document = self.connection.get_machine_model()?;
        state.heaters = HeaterIndexTable::from_model(&document);
        state.document = document;
        state.next_refresh = None;
        self.subscribed.store(true, Ordering::SeqCst);

        tracing::debug!("-subscribe");
        Ok(())
    }

    /// Fetch and apply one patch, unless throttled or unsubscribed
    pub fn refresh(&self) -> Result<()> {
        let mut state = self.state.lock();
        self.refresh_locked(&mut state)
    }

    fn refresh_locked(&self, state: &mut ModelState) -> Result<()> {
        if !self.is_subscribed() {
            return Ok(());
        }
        let now = Instant::now();
        if state.next_refresh.is_some_and(|next| now < next) {
            tracing::trace!("refresh throttled");
            return Ok(());
        }

        // a failed fetch still waits out the throttle interval
        state.next_refresh = Some(now + self.throttle);
        let text = self.connection.get_machine_model_patch()?;
        let patch: Value = serde_json::from_str(&text)?;
        apply_patch(&mut state.document, &patch);
        Ok(())
    }

    /// Run `f` on the refreshed model.
    ///
    /// Returns `None` without blocking when nothing is subscribed. A failed
    /// refresh is logged and `f` sees the last known model.
    pub fn with_document<R>(&self, f: impl FnOnce(&Value) -> R) -> Option<R> {
        if !self.is_subscribed() {
            return None;
        }
        let mut state = self.state.lock();
        if let Err(e) = self.refresh_locked(&mut state) {
            tracing::warn!("machine model refresh failed: {}", e);
        }
        Some(f(&state.document))
    }

    /// Value at `path`, or `0` when the path does not resolve
    pub fn read(&self, path: &[PathKey]) -> Value {
        self.with_document(|document| lookup(document, path).cloned())
            .flatten()
            .unwrap_or_else(|| Value::from(0))
    }

    /// Number at `path`, or `0.0`
    pub fn read_f64(&self, path: &[PathKey]) -> f64 {
        self.read(path).as_f64().unwrap_or(0.0)
    }

    /// Copy of the heater table derived at subscription
    pub fn heaters(&self) -> HeaterIndexTable {
        if !self.is_subscribed() {
            return HeaterIndexTable::default();
        }
        self.state.lock().heaters.clone()
    }

    /// Current and target temperature of heater slot `slot`
    pub fn heater_temperatures(&self, slot: usize) -> Option<(f64, f64)> {
        self.with_document(|document| {
            lookup(document, &HeaterIndexTable::heater_path(slot))
                .map(|heater| (heater_current(heater), heater_target(heater)))
        })
        .flatten()
    }

    /// Close the subscribe connection and drop the model.
    ///
    /// The connection is closed before the lock is taken, so a reader
    /// blocked in a patch fetch is released first.
    pub fn close(&self) -> Result<()> {
        self.subscribed.store(false, Ordering::SeqCst);
        let closed = self.connection.close();

        let mut state = self.state.lock();
        state.document = Value::Null;
        state.heaters = HeaterIndexTable::default();
        state.next_refresh = None;
        closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsfprinter_core::{latch, ConnectionError};
    use parking_lot::Condvar;
    use serde_json::json;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;

    #[derive(Default)]
    struct FetchState {
        fetching: bool,
        closed: bool,
    }

    /// Patch fetches block until the connection is closed
    #[derive(Clone, Default)]
    struct StalledSubscribe {
        state: Arc<(Mutex<FetchState>, Condvar)>,
    }

    impl StalledSubscribe {
        fn wait_until_fetching(&self) {
            let (state, changed) = &*self.state;
            let mut state = state.lock();
            while !state.fetching {
                changed.wait(&mut state);
            }
        }
    }

    impl SubscribeConnection for StalledSubscribe {
        fn connect(&self) -> Result<()> {
            Ok(())
        }

        fn get_machine_model(&self) -> Result<Value> {
            Ok(json!({"heat": {"heaters": [{"current": 20.0}]}}))
        }

        fn get_machine_model_patch(&self) -> Result<String> {
            let (state, changed) = &*self.state;
            let mut state = state.lock();
            state.fetching = true;
            changed.notify_all();
            while !state.closed {
                changed.wait(&mut state);
            }
            Err(ConnectionError::ConnectionReset.into())
        }

        fn close(&self) -> Result<()> {
            let (state, changed) = &*self.state;
            state.lock().closed = true;
            changed.notify_all();
            Ok(())
        }
    }

    #[test]
    fn test_close_releases_reader_blocked_in_fetch() {
        let connection = StalledSubscribe::default();
        let store = Arc::new(ModelStore::new(
            Box::new(connection.clone()),
            latch(),
            Duration::ZERO,
        ));
        store.subscribe().unwrap();

        let reader = {
            let store = Arc::clone(&store);
            thread::spawn(move || store.read_f64(&HeaterIndexTable::heater_path(0)))
        };
        connection.wait_until_fetching();

        let (done_tx, done_rx) = mpsc::channel();
        let closer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let result = store.close();
                let _ = done_tx.send(());
                result
            })
        };

        assert!(done_rx.recv_timeout(Duration::from_secs(2)).is_ok());
        assert!(closer.join().unwrap().is_ok());
        // the blocked read falls back to the last known model
        assert_eq!(reader.join().unwrap(), 20.0);
        assert!(!store.is_subscribed());
    }
}
