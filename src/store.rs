use std::cell::UnsafeCell;

/// Position-addressed record storage with no synchronization of its own.
///
/// Access is serialized by whichever [`AccessPolicy`](crate::policy::AccessPolicy) owns the
/// store, hence the `unsafe` accessors.
pub trait Records {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// # Safety
    ///
    /// No `set` may run concurrently. `pos` must be below `len()`.
    unsafe fn get(&self, pos: usize) -> String;

    /// # Safety
    ///
    /// No other `get` or `set` may run concurrently. `pos` must be below `len()`.
    unsafe fn set(&self, pos: usize, value: &str);
}

/// Fixed-length sequence of string records. Only in-place replacement is possible.
pub struct SharedStore {
    slots: Box<[UnsafeCell<String>]>,
}

// Slots are only reached through the `unsafe` accessors of `Records`, whose callers guarantee
// that a `set` never runs alongside another `get` or `set`. The slice itself never changes.
unsafe impl Sync for SharedStore {}

impl SharedStore {
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self {
            slots: lines.into_iter().map(UnsafeCell::new).collect(),
        }
    }

    pub fn into_lines(self) -> Vec<String> {
        self.slots
            .into_vec()
            .into_iter()
            .map(UnsafeCell::into_inner)
            .collect()
    }
}

impl Records for SharedStore {
    fn len(&self) -> usize {
        self.slots.len()
    }

    unsafe fn get(&self, pos: usize) -> String {
        unsafe { (*self.slots[pos].get()).clone() }
    }

    unsafe fn set(&self, pos: usize, value: &str) {
        let slot = unsafe { &mut *self.slots[pos].get() };
        slot.clear();
        slot.push_str(value);
    }
}
