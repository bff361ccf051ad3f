// Scratch Buffer Pool - Reusable f64 buffers for sort-based reads
// Buffers grow geometrically and are never shrunk; oversized ones are not retained

use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Smallest capacity ever allocated
const MIN_BUFFER_CAPACITY: usize = 256;

/// Idle buffers kept on the freelist
const MAX_IDLE_BUFFERS: usize = 64;

/// Freelist of scratch buffers keyed by nothing but capacity
pub struct BufferPool {
    free: Mutex<Vec<Vec<f64>>>,
    max_retained_capacity: usize,

    // Statistics
    acquired: AtomicU64,
    allocated: AtomicU64,
    dropped: AtomicU64,
}

/// Point-in-time pool counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferPoolStats {
    pub acquired: u64,
    pub allocated: u64,
    pub dropped: u64,
    pub idle: usize,
}

impl BufferPool {
    pub fn new(max_retained_capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            max_retained_capacity,
            acquired: AtomicU64::new(0),
            allocated: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Borrow a zero-filled buffer of length exactly `n`
    pub fn acquire(&self, n: usize) -> PooledBuffer<'_> {
        self.acquired.fetch_add(1, Ordering::Relaxed);
        let mut buf = self.free.lock().pop().unwrap_or_default();

        if buf.capacity() < n {
            let mut new_cap = buf.capacity().max(MIN_BUFFER_CAPACITY);
            while new_cap < n {
                new_cap *= 2;
            }
            buf = Vec::with_capacity(new_cap);
            self.allocated.fetch_add(1, Ordering::Relaxed);
            trace!(requested = n, capacity = new_cap, "Scratch buffer grown");
        }

        buf.clear();
        buf.resize(n, 0.0);
        PooledBuffer { buf, pool: self }
    }

    /// Return a buffer to the freelist unless it is above the retention ceiling
    pub fn release(&self, mut buf: Vec<f64>) {
        if buf.capacity() > self.max_retained_capacity {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            trace!(capacity = buf.capacity(), "Oversized scratch buffer dropped");
            return;
        }

        buf.clear();
        let mut free = self.free.lock();
        if free.len() < MAX_IDLE_BUFFERS {
            free.push(buf);
        }
    }

    pub fn max_retained_capacity(&self) -> usize {
        self.max_retained_capacity
    }

    pub fn get_stats(&self) -> BufferPoolStats {
        BufferPoolStats {
            acquired: self.acquired.load(Ordering::Relaxed),
            allocated: self.allocated.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            idle: self.free.lock().len(),
        }
    }
}

/// Buffer on loan from a [`BufferPool`]; returned on drop
pub struct PooledBuffer<'a> {
    buf: Vec<f64>,
    pool: &'a BufferPool,
}

impl PooledBuffer<'_> {
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }
}

impl Deref for PooledBuffer<'_> {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut [f64] {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}
