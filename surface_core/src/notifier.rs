//! Fire-and-forget display and buzzer updates.
//!
//! A `DisplayNotifier` owns one worker thread that owns the peripherals.
//! Callers push notifications through a bounded channel with `try_send`, so
//! a slow or hung peripheral can only fill the queue; it never blocks a scan
//! and never accumulates unbounded work. Peripheral failures are logged on
//! the worker and otherwise swallowed.
//!
//! Dropping the notifier closes the channel, lets the worker finish what is
//! already queued and joins it.
use crossbeam_channel as xch;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use surface_traits::{Buzzer, Display};

use crate::report::DisplaySummary;

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Show(DisplaySummary),
    Beep(Duration),
}

#[derive(Debug, Default)]
struct Counters {
    delivered: AtomicU64,
    dropped: AtomicU64,
    failed: AtomicU64,
}

pub struct DisplayNotifier {
    tx: Option<xch::Sender<Notification>>,
    counters: Arc<Counters>,
    /// Join handle for graceful thread cleanup
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl DisplayNotifier {
    /// Start the worker. `capacity` is clamped to at least 1.
    pub fn spawn<D, B>(mut display: D, mut buzzer: B, capacity: usize) -> Self
    where
        D: Display + Send + 'static,
        B: Buzzer + Send + 'static,
    {
        let (tx, rx) = xch::bounded::<Notification>(capacity.max(1));
        let counters = Arc::new(Counters::default());
        let counters_bg = counters.clone();

        let join_handle = std::thread::Builder::new()
            .name("display-notifier".into())
            .spawn(move || {
                // Ends once every sender is gone and the queue is drained
                for note in rx.iter() {
                    let res = match &note {
                        Notification::Show(s) => display.show(&s.primary, &s.shape, &s.material),
                        Notification::Beep(d) => buzzer.beep(*d),
                    };
                    match res {
                        Ok(()) => {
                            counters_bg.delivered.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(e) => {
                            counters_bg.failed.fetch_add(1, Ordering::Relaxed);
                            tracing::warn!(error = %e, ?note, "peripheral update failed");
                        }
                    }
                }
                tracing::trace!("notifier thread exiting cleanly");
            });

        let join_handle = match join_handle {
            Ok(h) => Some(h),
            Err(e) => {
                // Without a worker every notification is dropped; scans still work.
                tracing::error!(error = %e, "failed to spawn notifier thread");
                None
            }
        };
        let tx = join_handle.as_ref().map(|_| tx);

        Self {
            tx,
            counters,
            join_handle,
        }
    }

    /// Queue a display update; returns immediately.
    pub fn notify(&self, summary: DisplaySummary) {
        self.dispatch(Notification::Show(summary));
    }

    /// Queue a buzzer beep; returns immediately.
    pub fn beep(&self, duration: Duration) {
        self.dispatch(Notification::Beep(duration));
    }

    /// Returns whether the notification was queued.
    pub fn dispatch(&self, note: Notification) -> bool {
        let Some(tx) = &self.tx else {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        };
        match tx.try_send(note) {
            Ok(()) => true,
            Err(xch::TrySendError::Full(note)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(?note, "notifier queue full, dropping update");
                false
            }
            Err(xch::TrySendError::Disconnected(_)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("notifier worker gone, dropping update");
                false
            }
        }
    }

    /// Notifications the peripherals accepted.
    pub fn delivered(&self) -> u64 {
        self.counters.delivered.load(Ordering::Relaxed)
    }

    /// Notifications discarded because the queue was full or closed.
    pub fn dropped(&self) -> u64 {
        self.counters.dropped.load(Ordering::Relaxed)
    }

    /// Notifications the peripherals rejected.
    pub fn failed(&self) -> u64 {
        self.counters.failed.load(Ordering::Relaxed)
    }

    /// Close the queue and wait for the worker to drain it.
    pub fn shutdown(mut self) {
        self.close_and_join();
    }

    fn close_and_join(&mut self) {
        drop(self.tx.take());
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("notifier thread joined successfully");
                }
                Err(e) => {
                    // Thread panicked; log but don't propagate (we may be in Drop)
                    tracing::warn!(?e, "notifier thread panicked during shutdown");
                }
            }
        }
    }
}

impl Drop for DisplayNotifier {
    fn drop(&mut self) {
        self.close_and_join();
    }
}
