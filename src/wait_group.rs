use crate::{condvar::Condvar, mutex::Mutex};

/// Counted completion barrier: [`wait`](WaitGroup::wait) blocks until
/// [`done`](WaitGroup::done) has been called once per expected participant.
pub struct WaitGroup {
    remaining: Mutex<usize>,
    drained: Condvar,
}

impl WaitGroup {
    pub const fn new(count: usize) -> Self {
        Self {
            remaining: Mutex::new(count),
            drained: Condvar::new(),
        }
    }

    pub fn add(&self, count: usize) {
        *self.remaining.lock() += count;
    }

    pub fn done(&self) {
        let mut remaining = self.remaining.lock();
        assert!(*remaining > 0, "wait group completed more times than expected");
        *remaining -= 1;
        if *remaining == 0 {
            self.drained.notify_all();
        }
    }

    pub fn remaining(&self) -> usize {
        *self.remaining.lock()
    }

    pub fn wait(&self) {
        let _drained = self.drained.wait_while(self.remaining.lock(), |n| *n > 0);
    }
}
