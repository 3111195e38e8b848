use std::sync::atomic::{AtomicU32, Ordering::Relaxed};

use atomic_wait::{wait, wake_all, wake_one};

use crate::mutex::Guard;

/// Futex condition variable for [`Mutex`](crate::mutex::Mutex) guards.
///
/// Every notification bumps `epoch`; a waiter sleeps only while the epoch it sampled under
/// the lock is still current, so a notify issued after that sample is never missed.
pub struct Condvar {
    epoch: AtomicU32,
}

impl Condvar {
    pub const fn new() -> Self {
        Self {
            epoch: AtomicU32::new(0),
        }
    }

    pub fn notify_one(&self) {
        self.epoch.fetch_add(1, Relaxed);
        wake_one(&self.epoch);
    }

    pub fn notify_all(&self) {
        self.epoch.fetch_add(1, Relaxed);
        wake_all(&self.epoch);
    }

    /// Unlocks, sleeps until a notification (or a spurious wakeup) and locks again.
    pub fn wait<'a, T>(&self, guard: Guard<'a, T>) -> Guard<'a, T> {
        let seen = self.epoch.load(Relaxed);
        let mutex = guard.lock;
        drop(guard);

        wait(&self.epoch, seen);
        mutex.lock()
    }

    /// Waits for as long as `blocked` holds for the guarded value.
    pub fn wait_while<'a, T>(
        &self,
        mut guard: Guard<'a, T>,
        mut blocked: impl FnMut(&mut T) -> bool,
    ) -> Guard<'a, T> {
        while blocked(&mut *guard) {
            guard = self.wait(guard);
        }
        guard
    }
}

impl Default for Condvar {
    fn default() -> Self {
        Self::new()
    }
}
