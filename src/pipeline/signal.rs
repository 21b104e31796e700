// src/pipeline/signal.rs
//! Binary wake signals between pipeline stages
//!
//! A [`StageSignal`] is the Rust rendition of a binary counting semaphore:
//! raising an already-raised signal is a no-op from the receiver's point of
//! view, so at most one wake-up is ever pending and nothing queues behind it.

use parking_lot::{Condvar, Mutex};
use std::time::Duration;

/// Binary, non-queued wake notification between two stages
#[derive(Default)]
pub struct StageSignal {
    raised: Mutex<bool>,
    cond: Condvar,
}

impl StageSignal {
    /// Create an un-raised signal
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal; raising twice before a wait collapses to one wake
    pub fn raise(&self) {
        let mut raised = self.raised.lock();
        *raised = true;
        self.cond.notify_one();
    }

    /// Block until the signal is raised, then consume it (wait-forever)
    pub fn wait(&self) {
        let mut raised = self.raised.lock();
        while !*raised {
            self.cond.wait(&mut raised);
        }
        *raised = false;
    }

    /// Wait up to `timeout` for the signal; returns whether it was consumed
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut raised = self.raised.lock();
        if !*raised {
            self.cond.wait_for(&mut raised, timeout);
        }
        let consumed = *raised;
        *raised = false;
        consumed
    }

    /// Consume the signal if raised, without blocking
    pub fn try_consume(&self) -> bool {
        let mut raised = self.raised.lock();
        let consumed = *raised;
        *raised = false;
        consumed
    }
}

/// One-way shutdown latch shared by every stage loop
///
/// Unlike [`StageSignal`], the latch stays set once raised and wakes all
/// waiters, so periodic stages can use it as an interruptible fixed delay.
#[derive(Default)]
pub struct ShutdownFlag {
    set: Mutex<bool>,
    cond: Condvar,
}

impl ShutdownFlag {
    /// Create an unset latch
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch shutdown and wake every waiter
    pub fn raise(&self) {
        let mut set = self.set.lock();
        *set = true;
        self.cond.notify_all();
    }

    /// Whether shutdown has been latched
    pub fn is_set(&self) -> bool {
        *self.set.lock()
    }

    /// Sleep for `timeout` or until shutdown; returns whether shutdown is set
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut set = self.set.lock();
        if !*set {
            self.cond.wait_for(&mut set, timeout);
        }
        *set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_raise_then_wait_does_not_block() {
        let signal = StageSignal::new();
        signal.raise();
        signal.wait(); // must return immediately
        assert!(!signal.try_consume());
    }

    #[test]
    fn test_double_raise_collapses() {
        let signal = StageSignal::new();
        signal.raise();
        signal.raise();
        assert!(signal.try_consume());
        assert!(!signal.try_consume());
    }

    #[test]
    fn test_wait_timeout_expires() {
        let signal = StageSignal::new();
        assert!(!signal.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn test_cross_thread_wake() {
        let signal = Arc::new(StageSignal::new());
        let waiter = {
            let signal = signal.clone();
            thread::spawn(move || signal.wait())
        };
        thread::sleep(Duration::from_millis(20));
        signal.raise();
        waiter.join().unwrap();
    }

    #[test]
    fn test_shutdown_wakes_all() {
        let flag = Arc::new(ShutdownFlag::new());
        let handles: Vec<_> = (0..3)
            .map(|_| {
                let flag = flag.clone();
                thread::spawn(move || flag.wait_timeout(Duration::from_secs(5)))
            })
            .collect();
        thread::sleep(Duration::from_millis(20));
        flag.raise();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
