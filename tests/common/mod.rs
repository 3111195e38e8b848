#![allow(dead_code)]

use std::{
    sync::atomic::{
        AtomicBool, AtomicUsize,
        Ordering::{Relaxed, SeqCst},
    },
    thread,
    time::{Duration, Instant},
};

use rwgate::{Records, SharedStore};

pub fn numbered(len: usize) -> SharedStore {
    SharedStore::from_lines((0..len).map(|i| i.to_string()).collect())
}

/// Spins until `cond` holds, failing the test after a few seconds.
pub fn wait_until(what: &str, cond: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::yield_now();
    }
}

fn widen_window() {
    for _ in 0..64 {
        std::hint::spin_loop();
    }
    thread::yield_now();
}

/// Counts operations in flight and flags any write that overlaps another operation.
pub struct ProbeStore {
    inner: SharedStore,
    active_reads: AtomicUsize,
    active_writes: AtomicUsize,
    pub max_active: AtomicUsize,
    pub max_reads: AtomicUsize,
    pub overlaps: AtomicUsize,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
}

impl ProbeStore {
    pub fn new(inner: SharedStore) -> Self {
        Self {
            inner,
            active_reads: AtomicUsize::new(0),
            active_writes: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            max_reads: AtomicUsize::new(0),
            overlaps: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }
}

impl Records for ProbeStore {
    fn len(&self) -> usize {
        self.inner.len()
    }

    unsafe fn get(&self, pos: usize) -> String {
        let reads = self.active_reads.fetch_add(1, SeqCst) + 1;
        let writes = self.active_writes.load(SeqCst);
        if writes > 0 {
            self.overlaps.fetch_add(1, SeqCst);
        }
        self.max_reads.fetch_max(reads, SeqCst);
        self.max_active.fetch_max(reads + writes, SeqCst);

        widen_window();
        let value = unsafe { self.inner.get(pos) };

        self.active_reads.fetch_sub(1, SeqCst);
        self.reads.fetch_add(1, Relaxed);
        value
    }

    unsafe fn set(&self, pos: usize, value: &str) {
        let writes = self.active_writes.fetch_add(1, SeqCst) + 1;
        let reads = self.active_reads.load(SeqCst);
        if writes > 1 || reads > 0 {
            self.overlaps.fetch_add(1, SeqCst);
        }
        self.max_active.fetch_max(reads + writes, SeqCst);

        widen_window();
        unsafe { self.inner.set(pos, value) };

        self.active_writes.fetch_sub(1, SeqCst);
        self.writes.fetch_add(1, Relaxed);
    }
}

/// Reads park inside the store until released; the write records what it saw on entry.
pub struct GatedStore {
    inner: SharedStore,
    open: AtomicBool,
    pub inside: AtomicUsize,
    pub finished: AtomicUsize,
    pub write_started: AtomicBool,
    pub finished_at_write: AtomicUsize,
    pub inside_at_write: AtomicUsize,
}

impl GatedStore {
    pub fn new(inner: SharedStore) -> Self {
        Self {
            inner,
            open: AtomicBool::new(false),
            inside: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
            write_started: AtomicBool::new(false),
            finished_at_write: AtomicUsize::new(0),
            inside_at_write: AtomicUsize::new(0),
        }
    }

    pub fn open(&self) {
        self.open.store(true, SeqCst);
    }
}

impl Records for GatedStore {
    fn len(&self) -> usize {
        self.inner.len()
    }

    unsafe fn get(&self, pos: usize) -> String {
        self.inside.fetch_add(1, SeqCst);
        wait_until("readers to be released", || self.open.load(SeqCst));
        let value = unsafe { self.inner.get(pos) };
        self.inside.fetch_sub(1, SeqCst);
        self.finished.fetch_add(1, SeqCst);
        value
    }

    unsafe fn set(&self, pos: usize, value: &str) {
        self.finished_at_write
            .store(self.finished.load(SeqCst), SeqCst);
        self.inside_at_write.store(self.inside.load(SeqCst), SeqCst);
        self.write_started.store(true, SeqCst);
        unsafe { self.inner.set(pos, value) }
    }
}

/// Every read waits until `needed` reads are inside at once.
pub struct RendezvousStore {
    inner: SharedStore,
    needed: usize,
    inside: AtomicUsize,
    pub peak: AtomicUsize,
}

impl RendezvousStore {
    pub fn new(inner: SharedStore, needed: usize) -> Self {
        Self {
            inner,
            needed,
            inside: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

impl Records for RendezvousStore {
    fn len(&self) -> usize {
        self.inner.len()
    }

    unsafe fn get(&self, pos: usize) -> String {
        let inside = self.inside.fetch_add(1, SeqCst) + 1;
        self.peak.fetch_max(inside, SeqCst);
        wait_until("concurrent readers", || {
            self.peak.load(SeqCst) >= self.needed
        });
        let value = unsafe { self.inner.get(pos) };
        self.inside.fetch_sub(1, SeqCst);
        value
    }

    unsafe fn set(&self, pos: usize, value: &str) {
        unsafe { self.inner.set(pos, value) }
    }
}
