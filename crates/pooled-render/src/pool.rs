//! Reusable scratch buffers for rendering.
//!
//! A [`BufferPool`] keeps idle `Vec<u8>` buffers around so repeated renders
//! do not allocate a fresh output buffer every time. Buffers are handed out
//! as [`PooledBuffer`] guards: the guard owns its buffer exclusively and
//! gives it back to the pool when dropped, on every exit path.
//!
//! ## Bounds
//!
//! The number of *live* buffers is unbounded: each in-flight render holds
//! one, and a new buffer is allocated whenever none is idle. What is bounded
//! is what the pool *keeps*:
//!
//! - at most [`PoolConfig::max_idle`] idle buffers; extra returns are dropped
//! - buffers that grew past [`PoolConfig::max_retained_capacity`] are dropped
//!   instead of pinning a large allocation forever
//!
//! ```rust
//! use pooled_render::{BufferPool, PoolConfig};
//! use std::io::Write;
//!
//! let pool = BufferPool::new(PoolConfig::default().with_max_idle(4));
//! {
//!     let mut buf = pool.acquire();
//!     buf.write_all(b"scratch").unwrap();
//! } // returned here
//!
//! let buf = pool.acquire();
//! assert!(buf.is_empty());
//! assert_eq!(pool.stats().reused, 1);
//! ```

use std::io;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use serde::Deserialize;

/// Sizing policy for a [`BufferPool`].
///
/// Deserializable so it can live inside a host application's config file;
/// missing fields take their defaults.
///
/// ```rust
/// use pooled_render::PoolConfig;
///
/// let config: PoolConfig = serde_json::from_str(r#"{ "max_idle": 8 }"#).unwrap();
/// assert_eq!(config.max_idle, 8);
/// assert_eq!(config.initial_capacity, PoolConfig::default().initial_capacity);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum number of idle buffers retained for reuse.
    pub max_idle: usize,
    /// Capacity of freshly allocated buffers, in bytes.
    pub initial_capacity: usize,
    /// Buffers whose capacity exceeds this are discarded on return.
    pub max_retained_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle: 64,
            initial_capacity: 1024,
            max_retained_capacity: 1024 * 1024,
        }
    }
}

impl PoolConfig {
    pub fn with_max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = max_idle;
        self
    }

    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_max_retained_capacity(mut self, max_retained_capacity: usize) -> Self {
        self.max_retained_capacity = max_retained_capacity;
        self
    }
}

/// Point-in-time counters for a [`BufferPool`].
///
/// Counters are cumulative since the pool was created; `idle` is the
/// current number of buffers waiting for reuse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Buffers allocated because no idle buffer was available.
    pub allocated: usize,
    /// Acquisitions served from an idle buffer.
    pub reused: usize,
    /// Buffers handed back to the pool (kept or discarded).
    pub returned: usize,
    /// Returned buffers dropped instead of kept.
    pub discarded: usize,
    /// Buffers currently idle.
    pub idle: usize,
}

impl PoolStats {
    /// Buffers currently borrowed and not yet returned.
    pub fn in_flight(&self) -> usize {
        (self.allocated + self.reused).saturating_sub(self.returned)
    }
}

/// Thread-safe pool of reusable byte buffers.
///
/// The pool is an explicit object: construct one and hand it to whatever
/// renders (see [`Renderer::with_pool`](crate::Renderer::with_pool)).
#[derive(Debug)]
pub struct BufferPool {
    config: PoolConfig,
    idle: Mutex<Vec<Vec<u8>>>,
    allocated: AtomicUsize,
    reused: AtomicUsize,
    returned: AtomicUsize,
    discarded: AtomicUsize,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl BufferPool {
    /// Creates an empty pool. Buffers are allocated on demand.
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            idle: Mutex::new(Vec::new()),
            allocated: AtomicUsize::new(0),
            reused: AtomicUsize::new(0),
            returned: AtomicUsize::new(0),
            discarded: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Borrows an empty buffer, reusing an idle one when available.
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let recycled = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();

        let buf = match recycled {
            Some(mut buf) => {
                buf.clear();
                self.reused.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(capacity = buf.capacity(), "reusing pooled buffer");
                buf
            }
            None => {
                self.allocated.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(
                    capacity = self.config.initial_capacity,
                    "allocating pooled buffer"
                );
                Vec::with_capacity(self.config.initial_capacity)
            }
        };

        PooledBuffer { pool: self, buf }
    }

    fn release(&self, mut buf: Vec<u8>) {
        self.returned.fetch_add(1, Ordering::Relaxed);

        if buf.capacity() > self.config.max_retained_capacity {
            self.discarded.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(capacity = buf.capacity(), "discarding oversized buffer");
            return;
        }

        buf.clear();
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() >= self.config.max_idle {
            drop(idle);
            self.discarded.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("pool full, discarding returned buffer");
            return;
        }
        idle.push(buf);
    }

    /// Number of buffers currently idle in the pool.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocated: self.allocated.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            returned: self.returned.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            idle: self.idle_count(),
        }
    }
}

/// A buffer borrowed from a [`BufferPool`].
///
/// Dereferences to `Vec<u8>` and implements [`io::Write`]. Dropping the
/// guard returns the buffer to its pool exactly once.
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buf: Vec<u8>,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}

impl io::Write for PooledBuffer<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.buf.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_acquire_allocates_when_empty() {
        let pool = BufferPool::new(PoolConfig::default().with_initial_capacity(256));
        let buf = pool.acquire();

        assert!(buf.is_empty());
        assert!(buf.capacity() >= 256);
        assert_eq!(pool.stats().allocated, 1);
        assert_eq!(pool.stats().in_flight(), 1);
    }

    #[test]
    fn test_drop_returns_buffer() {
        let pool = BufferPool::default();
        {
            let mut buf = pool.acquire();
            buf.write_all(b"hello").unwrap();
        }

        let stats = pool.stats();
        assert_eq!(stats.returned, 1);
        assert_eq!(stats.idle, 1);
        assert_eq!(stats.in_flight(), 0);
    }

    #[test]
    fn test_reused_buffer_is_empty() {
        let pool = BufferPool::default();
        {
            let mut buf = pool.acquire();
            buf.write_all(b"left over bytes").unwrap();
        }

        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert_eq!(pool.stats().reused, 1);
        assert_eq!(pool.stats().allocated, 1);
    }

    #[test]
    fn test_max_idle_discards_extra_returns() {
        let pool = BufferPool::new(PoolConfig::default().with_max_idle(1));
        let a = pool.acquire();
        let b = pool.acquire();
        drop(a);
        drop(b);

        let stats = pool.stats();
        assert_eq!(stats.idle, 1);
        assert_eq!(stats.discarded, 1);
        assert_eq!(stats.returned, 2);
    }

    #[test]
    fn test_zero_max_idle_never_retains() {
        let pool = BufferPool::new(PoolConfig::default().with_max_idle(0));
        drop(pool.acquire());
        drop(pool.acquire());

        assert_eq!(pool.idle_count(), 0);
        assert_eq!(pool.stats().allocated, 2);
    }

    #[test]
    fn test_oversized_buffer_is_discarded() {
        let pool = BufferPool::new(
            PoolConfig::default()
                .with_initial_capacity(16)
                .with_max_retained_capacity(64),
        );
        {
            let mut buf = pool.acquire();
            buf.write_all(&[b'x'; 1000]).unwrap();
        }

        assert_eq!(pool.idle_count(), 0);
        assert_eq!(pool.stats().discarded, 1);
    }

    #[test]
    fn test_buffer_returned_on_panic() {
        let pool = BufferPool::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut buf = pool.acquire();
            buf.write_all(b"partial").unwrap();
            panic!("render blew up");
        }));

        assert!(result.is_err());
        assert_eq!(pool.stats().returned, 1);
        assert!(pool.acquire().is_empty());
    }

    #[test]
    fn test_concurrent_borrowers_get_distinct_buffers() {
        let pool = BufferPool::default();
        std::thread::scope(|s| {
            for i in 0..8u8 {
                let pool = &pool;
                s.spawn(move || {
                    for _ in 0..100 {
                        let mut buf = pool.acquire();
                        assert!(buf.is_empty());
                        buf.write_all(&[i; 32]).unwrap();
                        assert!(buf.iter().all(|b| *b == i));
                    }
                });
            }
        });

        let stats = pool.stats();
        assert_eq!(stats.in_flight(), 0);
        assert_eq!(stats.returned, 800);
        assert!(stats.idle <= 8);
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: PoolConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PoolConfig::default());

        let config: PoolConfig =
            serde_json::from_str(r#"{ "max_idle": 2, "initial_capacity": 128 }"#).unwrap();
        assert_eq!(config.max_idle, 2);
        assert_eq!(config.initial_capacity, 128);
        assert_eq!(
            config.max_retained_capacity,
            PoolConfig::default().max_retained_capacity
        );
    }
}
