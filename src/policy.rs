use std::{
    fmt,
    sync::atomic::{AtomicUsize, Ordering::Relaxed},
};

use crate::{
    mutex::{Mutex, RawMutex},
    store::{Records, SharedStore},
};

/// A synchronization discipline over a record store.
///
/// Neither operation fails; both block until the discipline admits them.
pub trait AccessPolicy: Sync {
    fn len(&self) -> usize;

    fn read(&self, pos: usize) -> String;

    fn write(&self, pos: usize, value: &str);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Discipline {
    Exclusive,
    ReaderPreferring,
}

impl Discipline {
    pub const ALL: [Discipline; 2] = [Discipline::Exclusive, Discipline::ReaderPreferring];
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discipline::Exclusive => f.write_str("exclusive"),
            Discipline::ReaderPreferring => f.write_str("reader-preferring"),
        }
    }
}

/// Readers and writers all take the same lock, one operation at a time.
pub struct ExclusiveAccess<S = SharedStore> {
    len: usize,
    store: Mutex<S>,
}

impl<S: Records> ExclusiveAccess<S> {
    pub fn new(store: S) -> Self {
        Self {
            len: store.len(),
            store: Mutex::new(store),
        }
    }

    pub fn into_store(self) -> S {
        self.store.into_inner()
    }
}

impl<S: Records + Send> AccessPolicy for ExclusiveAccess<S> {
    fn len(&self) -> usize {
        self.len
    }

    fn read(&self, pos: usize) -> String {
        let store = self.store.lock();
        unsafe { store.get(pos) }
    }

    fn write(&self, pos: usize, value: &str) {
        let store = self.store.lock();
        unsafe { store.set(pos, value) }
    }
}

/// Snapshot of [`ReaderPreferring`] gate activity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GateStats {
    /// 0 -> 1 transitions of the active-reader counter.
    pub reader_epochs: usize,
    /// Writer-gate acquisitions by the reader group and by writers.
    pub gate_acquisitions: usize,
}

#[derive(Default)]
struct GateCounters {
    reader_epochs: AtomicUsize,
    gate_acquisitions: AtomicUsize,
}

/// First-reader/last-reader protocol.
///
/// The first reader to arrive takes the writer-gate on behalf of every reader and the last
/// one to leave releases it. Readers never wait for each other, a writer waits until the
/// active readers drain, and readers that keep arriving can starve a waiting writer.
///
/// Lock order: the bookkeeping lock may be held while waiting for the gate, never the
/// reverse. A writer never touches the bookkeeping lock.
///
/// Readers reach the store from several threads at once, so the store must be `Sync`:
///
/// ```compile_fail
/// use std::cell::Cell;
///
/// use rwgate::{AccessPolicy, ReaderPreferring, Records};
///
/// struct Tally(Cell<usize>);
///
/// impl Records for Tally {
///     fn len(&self) -> usize {
///         1
///     }
///
///     unsafe fn get(&self, _: usize) -> String {
///         self.0.set(self.0.get() + 1);
///         String::new()
///     }
///
///     unsafe fn set(&self, _: usize, _: &str) {}
/// }
///
/// let policy = ReaderPreferring::new(Tally(Cell::new(0)));
/// std::thread::scope(|s| {
///     s.spawn(|| policy.read(0));
///     s.spawn(|| policy.read(0));
/// });
/// ```
pub struct ReaderPreferring<S = SharedStore> {
    /// Bookkeeping lock owning the active-reader counter.
    readers: Mutex<usize>,
    gate: RawMutex,
    store: S,
    counters: GateCounters,
}

// Concurrent `get`s need `S: Sync`; `set` only ever runs under the gate, alone.
unsafe impl<S: Records + Send + Sync> Sync for ReaderPreferring<S> {}

impl<S: Records> ReaderPreferring<S> {
    pub fn new(store: S) -> Self {
        Self {
            readers: Mutex::new(0),
            gate: RawMutex::new(),
            store,
            counters: GateCounters::default(),
        }
    }

    pub fn active_readers(&self) -> usize {
        *self.readers.lock()
    }

    pub fn stats(&self) -> GateStats {
        GateStats {
            reader_epochs: self.counters.reader_epochs.load(Relaxed),
            gate_acquisitions: self.counters.gate_acquisitions.load(Relaxed),
        }
    }

    /// Shared view of the store for inspection; writes still have to go through the policy.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn acquire_gate(&self) {
        self.gate.lock();
        self.counters.gate_acquisitions.fetch_add(1, Relaxed);
    }

    fn enter_read(&self) -> ReadSession<'_, S> {
        let mut readers = self.readers.lock();
        *readers += 1;
        if *readers == 1 {
            self.counters.reader_epochs.fetch_add(1, Relaxed);
            self.acquire_gate();
        }
        ReadSession { policy: self }
    }
}

/// Membership in the active reader group; leaving happens on drop.
struct ReadSession<'a, S> {
    policy: &'a ReaderPreferring<S>,
}

impl<S> Drop for ReadSession<'_, S> {
    fn drop(&mut self) {
        let mut readers = self.policy.readers.lock();
        *readers -= 1;
        if *readers == 0 {
            // taken by the reader that moved the counter off zero
            unsafe { self.policy.gate.unlock() }
        }
    }
}

struct WriteSession<'a> {
    gate: &'a RawMutex,
}

impl Drop for WriteSession<'_> {
    fn drop(&mut self) {
        unsafe { self.gate.unlock() }
    }
}

impl<S: Records + Send + Sync> AccessPolicy for ReaderPreferring<S> {
    fn len(&self) -> usize {
        self.store.len()
    }

    fn read(&self, pos: usize) -> String {
        let _session = self.enter_read();
        unsafe { self.store.get(pos) }
    }

    fn write(&self, pos: usize, value: &str) {
        self.acquire_gate();
        let _session = WriteSession { gate: &self.gate };
        unsafe { self.store.set(pos, value) }
    }
}
