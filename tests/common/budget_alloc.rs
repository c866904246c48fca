use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Heap usage observed while running a closure.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllocStats {
    /// Peak bytes above the level live when tracking started.
    pub peak_bytes: usize,
    pub allocations: usize,
}

/// Counting wrapper over the system allocator.
pub struct CountingAlloc {
    live: AtomicUsize,
    high_water: AtomicUsize,
    allocations: AtomicUsize,
}

impl CountingAlloc {
    pub const fn new() -> Self {
        Self {
            live: AtomicUsize::new(0),
            high_water: AtomicUsize::new(0),
            allocations: AtomicUsize::new(0),
        }
    }

    /// Run `f` and report its peak extra heap usage and allocation count.
    ///
    /// Counts every thread; keep one tracked test per test binary.
    pub fn track<R>(&self, f: impl FnOnce() -> R) -> (R, AllocStats) {
        let baseline = self.live.load(Ordering::SeqCst);
        self.high_water.store(baseline, Ordering::SeqCst);
        let allocations_before = self.allocations.load(Ordering::SeqCst);

        let out = f();

        let stats = AllocStats {
            peak_bytes: self
                .high_water
                .load(Ordering::SeqCst)
                .saturating_sub(baseline),
            allocations: self
                .allocations
                .load(Ordering::SeqCst)
                .saturating_sub(allocations_before),
        };
        (out, stats)
    }

    fn grow(&self, bytes: usize) {
        let live = self.live.fetch_add(bytes, Ordering::SeqCst) + bytes;
        self.high_water.fetch_max(live, Ordering::SeqCst);
    }

    fn shrink(&self, bytes: usize) {
        let _ = self
            .live
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |live| {
                Some(live.saturating_sub(bytes))
            });
    }
}

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            self.grow(layout.size());
            self.allocations.fetch_add(1, Ordering::SeqCst);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        self.shrink(layout.size());
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            self.grow(layout.size());
            self.allocations.fetch_add(1, Ordering::SeqCst);
        }
        ptr
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            if new_size >= layout.size() {
                self.grow(new_size - layout.size());
            } else {
                self.shrink(layout.size() - new_size);
            }
            self.allocations.fetch_add(1, Ordering::SeqCst);
        }
        new_ptr
    }
}
