//! Fixed-interval refresh scheduling.
//!
//! Worker threads poll a shared termination flag in small slices while
//! waiting out their interval, so stopping the handle is prompt even for
//! long intervals.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const POLL_SLICE: Duration = Duration::from_millis(100);

/// Handle owning the refresh timers of one page.
///
/// Dropping the handle without calling [`RefresherHandle::stop`] leaves the
/// timers running for the remainder of the process; explicit `stop` is the
/// supported teardown path.
pub struct RefresherHandle {
    terminate: Arc<AtomicBool>,
    threads: Vec<thread::JoinHandle<()>>,
}

impl RefresherHandle {
    pub fn new() -> RefresherHandle {
        RefresherHandle {
            terminate: Arc::new(AtomicBool::new(false)),
            threads: Vec::new(),
        }
    }

    /// Spawns a named worker that runs `tick` immediately and then once per
    /// `interval` until the handle is stopped.
    ///
    /// Ticks are assumed to complete well within the interval; there is no
    /// backoff, no jitter and no skip-if-busy logic.
    pub fn spawn_periodic<F>(&mut self, name: &str, interval: Duration, mut tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        let terminate = Arc::clone(&self.terminate);
        match thread::Builder::new().name(String::from(name)).spawn(move || {
            while !terminate.load(Ordering::SeqCst) {
                tick();
                if wait_or_terminate(&terminate, interval) {
                    break;
                }
            }
        }) {
            Ok(handle) => self.threads.push(handle),
            Err(err) => {
                log::error!(target: "cropcared::refresh", "Could not start refresh thread \'{}\': \'{}\'", name, err)
            }
        };
    }

    /// Spawns a named worker that runs `action` once after `delay`.
    ///
    /// The action is skipped when the handle is stopped before the delay
    /// has elapsed.
    pub fn spawn_delayed<F>(&mut self, name: &str, delay: Duration, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let terminate = Arc::clone(&self.terminate);
        match thread::Builder::new().name(String::from(name)).spawn(move || {
            if !wait_or_terminate(&terminate, delay) {
                action();
            }
        }) {
            Ok(handle) => self.threads.push(handle),
            Err(err) => {
                log::error!(target: "cropcared::refresh", "Could not start one-shot thread \'{}\': \'{}\'", name, err)
            }
        };
    }

    /// Signals every owned worker to terminate and joins them.
    pub fn stop(self) {
        self.terminate.store(true, Ordering::SeqCst);
        for handle in self.threads {
            let name = match handle.thread().name() {
                Some(name) => String::from(name),
                None => String::from("unnamed"),
            };
            match handle.join() {
                Ok(_) => log::debug!(target: "cropcared::refresh", "Joined refresh thread \'{}\'!", name),
                Err(_) => {
                    log::error!(target: "cropcared::refresh", "Could not join refresh thread \'{}\'!", name)
                }
            };
        }
    }
}

/// Waits out `duration` in small slices, returning `true` as soon as the
/// termination flag is set.
fn wait_or_terminate(terminate: &AtomicBool, duration: Duration) -> bool {
    let mut remaining = duration;
    while remaining > Duration::from_millis(0) {
        if terminate.load(Ordering::SeqCst) {
            return true;
        }
        let slice = if remaining < POLL_SLICE { remaining } else { POLL_SLICE };
        thread::sleep(slice);
        remaining -= slice;
    }
    terminate.load(Ordering::SeqCst)
}
