//! Coalesces bursts of change notifications into one delayed action.
//!
//! A dedicated worker thread owns the single pending trigger. `notify()` (re)arms it,
//! and the action runs once the worker has seen no further notification for the quiet
//! interval. Because the worker is the only thread that touches the pending slot, the
//! cancel-and-replace step needs no lock.
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::Result;

#[derive(Debug)]
enum Command {
    Notify,
    Cancel,
    Shutdown,
}

/// Cloneable sender side of a [`DebounceScheduler`].
#[derive(Debug, Clone)]
pub struct DebounceHandle {
    tx: Sender<Command>,
}

impl DebounceHandle {
    /// Re-arms the pending trigger. Never blocks.
    pub fn notify(&self) {
        let _ = self.tx.send(Command::Notify);
    }

    /// Drops the pending trigger, if any, without firing it.
    pub fn cancel(&self) {
        let _ = self.tx.send(Command::Cancel);
    }
}

pub struct DebounceScheduler {
    handle: DebounceHandle,
    quiet: Duration,
    worker: Option<JoinHandle<()>>,
}

impl DebounceScheduler {
    /// Spawns the worker thread. `on_fire` runs on that thread, once per quiet period
    /// that follows at least one notification.
    pub fn spawn<F>(quiet: Duration, on_fire: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let worker = std::thread::Builder::new()
            .name("debounce".to_string())
            .spawn(move || run_worker(rx, quiet, on_fire))?;
        debug!("Debounce worker started (quiet interval {:?})", quiet);
        Ok(Self {
            handle: DebounceHandle { tx },
            quiet,
            worker: Some(worker),
        })
    }

    pub fn notify(&self) {
        self.handle.notify();
    }

    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub fn handle(&self) -> DebounceHandle {
        self.handle.clone()
    }

    pub fn quiet_interval(&self) -> Duration {
        self.quiet
    }
}

impl Drop for DebounceScheduler {
    fn drop(&mut self) {
        let _ = self.handle.tx.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_worker<F: FnMut()>(rx: Receiver<Command>, quiet: Duration, mut on_fire: F) {
    let mut pending = false;
    loop {
        let next = if pending {
            rx.recv_timeout(quiet)
        } else {
            rx.recv().map_err(|_| RecvTimeoutError::Disconnected)
        };
        match next {
            Ok(Command::Notify) => {
                if pending {
                    trace!("Debounce re-armed");
                }
                pending = true;
            }
            Ok(Command::Cancel) => pending = false,
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                pending = false;
                trace!("Debounce fired");
                on_fire();
            }
        }
    }
    debug!("Debounce worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread::sleep;
    use std::time::Instant;

    fn counting(quiet: Duration) -> (DebounceScheduler, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let scheduler = DebounceScheduler::spawn(quiet, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        (scheduler, fired)
    }

    #[test]
    fn burst_fires_once() {
        let (scheduler, fired) = counting(Duration::from_millis(100));
        for _ in 0..10 {
            scheduler.notify();
            sleep(Duration::from_millis(10));
        }
        sleep(Duration::from_millis(400));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn firing_waits_for_quiet_after_last_notify() {
        let quiet = Duration::from_millis(100);
        let fired_at = Arc::new(Mutex::new(None));
        let slot = fired_at.clone();
        let scheduler = DebounceScheduler::spawn(quiet, move || {
            *slot.lock().unwrap() = Some(Instant::now());
        })
        .unwrap();

        scheduler.notify();
        sleep(Duration::from_millis(50));
        let last = Instant::now();
        scheduler.notify();
        sleep(Duration::from_millis(400));

        let at = fired_at.lock().unwrap().expect("trigger fired");
        assert!(at.duration_since(last) >= quiet);
    }

    #[test]
    fn separate_bursts_fire_separately() {
        let (scheduler, fired) = counting(Duration::from_millis(50));
        scheduler.notify();
        sleep(Duration::from_millis(300));
        scheduler.notify();
        scheduler.notify();
        sleep(Duration::from_millis(300));
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cancel_drops_pending_trigger() {
        let (scheduler, fired) = counting(Duration::from_millis(100));
        scheduler.notify();
        scheduler.cancel();
        sleep(Duration::from_millis(300));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn handle_notifies_and_drop_joins() {
        let (scheduler, fired) = counting(Duration::from_millis(30));
        let handle = scheduler.handle();
        handle.notify();
        sleep(Duration::from_millis(200));
        drop(scheduler);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        // Worker is gone; notifying is a harmless no-op.
        handle.notify();
    }
}
