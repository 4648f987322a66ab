// Periodic callback scheduling

use crossbeam_channel::{Sender, bounded, select, tick};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::error::{AnimError, AnimResult};

pub type TickFn = Arc<dyn Fn() + Send + Sync>;

pub trait PeriodicTimer: Send + Sync {
    fn schedule(&self, interval: Duration, callback: TickFn) -> AnimResult<TimerHandle>;
}

/// Owned registration of a scheduled callback. Cancels on drop.
///
/// Cancellation never blocks, so a handle may be cancelled from inside its
/// own callback.
#[derive(Debug)]
pub struct TimerHandle {
    cancelled: Arc<AtomicBool>,
    stop_tx: Option<Sender<()>>,
}

impl TimerHandle {
    fn new(cancelled: Arc<AtomicBool>, stop_tx: Option<Sender<()>>) -> Self {
        Self { cancelled, stop_tx }
    }

    pub fn cancel(self) {
        drop(self);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        // disconnecting wakes the timer thread out of its select
        self.stop_tx.take();
    }
}

/// Runs each schedule on its own named thread driven by a crossbeam ticker.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadTimer;

impl ThreadTimer {
    pub fn new() -> Self {
        Self
    }
}

impl PeriodicTimer for ThreadTimer {
    fn schedule(&self, interval: Duration, callback: TickFn) -> AnimResult<TimerHandle> {
        let cancelled = Arc::new(AtomicBool::new(false));
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let ticker = tick(interval);
        let flag = Arc::clone(&cancelled);

        thread::Builder::new()
            .name("frame-timer".to_string())
            .spawn(move || {
                loop {
                    select! {
                        recv(stop_rx) -> _ => break,
                        recv(ticker) -> _ => {
                            if flag.load(Ordering::Acquire) {
                                break;
                            }
                            callback();
                        }
                    }
                }
                log::debug!("Timer thread exiting");
            })
            .map_err(AnimError::TimerSpawn)?;

        Ok(TimerHandle::new(cancelled, Some(stop_tx)))
    }
}

struct ManualEntry {
    interval: Duration,
    callback: TickFn,
    cancelled: Arc<AtomicBool>,
}

/// Timer whose ticks are delivered by calling [`ManualTimer::fire`], for
/// stepping animations frame by frame from the caller's own loop.
#[derive(Clone, Default)]
pub struct ManualTimer {
    entries: Arc<Mutex<Vec<ManualEntry>>>,
    scheduled: Arc<AtomicUsize>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invokes every live callback once. Returns how many ran.
    pub fn fire(&self) -> usize {
        let live: Vec<(TickFn, Arc<AtomicBool>)> = match self.entries.lock() {
            Ok(mut entries) => {
                entries.retain(|e| !e.cancelled.load(Ordering::Acquire));
                entries
                    .iter()
                    .map(|e| (Arc::clone(&e.callback), Arc::clone(&e.cancelled)))
                    .collect()
            }
            Err(_) => return 0,
        };

        let mut fired = 0;
        for (callback, cancelled) in live {
            if cancelled.load(Ordering::Acquire) {
                continue;
            }
            callback();
            fired += 1;
        }
        fired
    }

    pub fn fire_times(&self, n: usize) -> usize {
        (0..n).map(|_| self.fire()).sum()
    }

    pub fn active_count(&self) -> usize {
        self.entries
            .lock()
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| !e.cancelled.load(Ordering::Acquire))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Total number of schedules ever made on this timer.
    pub fn scheduled_count(&self) -> usize {
        self.scheduled.load(Ordering::Acquire)
    }

    pub fn intervals(&self) -> Vec<Duration> {
        self.entries
            .lock()
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| !e.cancelled.load(Ordering::Acquire))
                    .map(|e| e.interval)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl PeriodicTimer for ManualTimer {
    fn schedule(&self, interval: Duration, callback: TickFn) -> AnimResult<TimerHandle> {
        let cancelled = Arc::new(AtomicBool::new(false));
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(ManualEntry {
                interval,
                callback,
                cancelled: Arc::clone(&cancelled),
            });
        }
        self.scheduled.fetch_add(1, Ordering::AcqRel);
        Ok(TimerHandle::new(cancelled, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::time::Instant;

    fn counter() -> (Arc<AtomicUsize>, TickFn) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, Arc::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }))
    }

    #[test]
    fn test_manual_timer_fires_until_cancelled() {
        let timer = ManualTimer::new();
        let (count, callback) = counter();
        let handle = timer.schedule(Duration::from_millis(50), callback).unwrap();

        assert_eq!(timer.fire_times(3), 3);
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(timer.intervals(), vec![Duration::from_millis(50)]);

        handle.cancel();
        assert_eq!(timer.fire(), 0);
        assert_eq!(timer.active_count(), 0);
        assert_eq!(timer.scheduled_count(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_dropping_handle_cancels() {
        let timer = ManualTimer::new();
        let (count, callback) = counter();
        {
            let _handle = timer.schedule(Duration::from_millis(1), callback).unwrap();
            timer.fire();
        }
        timer.fire();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_thread_timer_ticks_and_stops() {
        let (tx, rx) = unbounded();
        let handle = ThreadTimer::new()
            .schedule(
                Duration::from_millis(5),
                Arc::new(move || {
                    let _ = tx.send(Instant::now());
                }),
            )
            .unwrap();

        for _ in 0..3 {
            rx.recv_timeout(Duration::from_secs(2)).unwrap();
        }
        handle.cancel();

        // at most one tick can already be past the cancellation check
        thread::sleep(Duration::from_millis(30));
        while rx.try_recv().is_ok() {}
        thread::sleep(Duration::from_millis(30));
        assert!(rx.try_recv().is_err());
    }
}
