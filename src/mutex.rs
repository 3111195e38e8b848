use std::{
    cell::UnsafeCell,
    ops::{Deref, DerefMut},
    sync::atomic::{
        AtomicU32,
        Ordering::{Acquire, Relaxed, Release},
    },
};

use atomic_wait::{wait, wake_one};

/// A futex lock that protects no data and has no owning thread.
///
/// Any thread may release it, so one thread can acquire it and another can hand it back.
/// The writer-gate of [`ReaderPreferring`](crate::policy::ReaderPreferring) relies on this.
pub struct RawMutex {
    /// 0: unlocked
    /// 1: locked, no other threads waiting
    /// 2: locked, other threads waiting
    state: AtomicU32,
}

impl RawMutex {
    pub const fn new() -> Self {
        Self {
            state: AtomicU32::new(0),
        }
    }

    pub fn lock(&self) {
        if self
            .state
            .compare_exchange(0, 1, Acquire, Relaxed)
            .is_err()
        {
            while self.state.swap(2, Acquire) != 0 {
                // sleep while someone else still holds it
                wait(&self.state, 2);
            }
        }
    }

    pub fn try_lock(&self) -> bool {
        self.state.compare_exchange(0, 1, Acquire, Relaxed).is_ok()
    }

    pub fn is_locked(&self) -> bool {
        self.state.load(Relaxed) != 0
    }

    /// Releases the lock and wakes one waiter, if any.
    ///
    /// # Safety
    ///
    /// The lock must be held, and the acquisition being released must not be released twice.
    pub unsafe fn unlock(&self) {
        if self.state.swap(0, Release) == 2 {
            wake_one(&self.state);
        }
    }
}

impl Default for RawMutex {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Mutex<T> {
    raw: RawMutex,
    value: UnsafeCell<T>,
}

unsafe impl<T> Sync for Mutex<T> where T: Send {}

pub struct Guard<'a, T> {
    pub(crate) lock: &'a Mutex<T>,
}

impl<T> Mutex<T> {
    pub const fn new(value: T) -> Self {
        Self {
            raw: RawMutex::new(),
            value: UnsafeCell::new(value),
        }
    }

    pub fn lock(&self) -> Guard<'_, T> {
        self.raw.lock();
        Guard { lock: self }
    }

    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: Default> Default for Mutex<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

// Trait Impls for Guard

impl<T> Deref for Guard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        unsafe { &*self.lock.value.get() }
    }
}

impl<T> DerefMut for Guard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *self.lock.value.get() }
    }
}

impl<T> Drop for Guard<'_, T> {
    fn drop(&mut self) {
        // a guard only exists while its lock is held
        unsafe { self.lock.raw.unlock() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn guarded_pushes_are_not_lost() {
        let x = Mutex::new(Vec::new());

        thread::scope(|s| {
            s.spawn(|| x.lock().push(1));
            s.spawn(|| {
                let mut v = x.lock();
                v.push(2);
                v.push(3);
            });
        });

        let g = x.lock();
        assert!(g.as_slice() == [1, 2, 3] || g.as_slice() == [2, 3, 1]);
    }

    #[test]
    fn contended_counter() {
        let m = Mutex::new(0);
        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        *m.lock() += 1;
                    }
                });
            }
        });
        assert_eq!(m.into_inner(), 4000);
    }

    #[test]
    fn raw_mutex_released_by_another_thread() {
        let gate = RawMutex::new();
        gate.lock();
        assert!(!gate.try_lock());

        thread::scope(|s| {
            s.spawn(|| unsafe { gate.unlock() });
        });

        assert!(!gate.is_locked());
        assert!(gate.try_lock());
        unsafe { gate.unlock() };
    }

    #[test]
    fn raw_mutex_wakes_blocked_waiter() {
        let gate = RawMutex::new();
        gate.lock();
        thread::scope(|s| {
            let waiter = s.spawn(|| {
                gate.lock();
                unsafe { gate.unlock() };
            });
            thread::sleep(std::time::Duration::from_millis(10));
            unsafe { gate.unlock() };
            waiter.join().unwrap();
        });
        assert!(!gate.is_locked());
    }
}
