//! # Frame Pool
//!
//! Bounded reuse pool for raw frame storage. A capture feed hands out a
//! fixed-size byte buffer per frame; consumers must give each buffer back
//! exactly once so the feed never allocates in steady state. The pool is the
//! in-process stand-in for the bounded image queue a real mirroring surface
//! maintains: holding on to frames without releasing them starves the
//! producer.
//!
//! ## Example
//!
//! ```rust
//! use mirror_capture::core::FramePool;
//!
//! // Pool for 64x64 RGBA frames, keeping at most 5 buffers around.
//! let pool = FramePool::new(64 * 64 * 4, 5);
//!
//! let buffer = pool.acquire();
//! // ... fill and process ...
//! pool.release(buffer);
//!
//! let (retained, max) = pool.stats();
//! assert_eq!((retained, max), (1, 5));
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;

/// Bounded pool of reusable frame buffers.
///
/// Buffers are allocated lazily: `acquire` pops a retained buffer when one is
/// available and allocates a fresh zeroed one otherwise. `release` retains up
/// to `max_buffers` buffers and drops the rest, so the pool never grows
/// without bound.
#[derive(Debug)]
pub struct FramePool {
    buffers: Mutex<VecDeque<Vec<u8>>>,
    buffer_size: usize,
    max_buffers: usize,
}

impl FramePool {
    /// Create a pool of `max_buffers` buffers of `buffer_size` bytes each.
    pub fn new(buffer_size: usize, max_buffers: usize) -> Self {
        Self {
            buffers: Mutex::new(VecDeque::with_capacity(max_buffers)),
            buffer_size,
            max_buffers,
        }
    }

    /// Take a buffer from the pool, allocating a new zeroed one if the pool
    /// is empty. The returned buffer is always exactly `buffer_size` bytes.
    pub fn acquire(&self) -> Vec<u8> {
        let mut buffers = self.buffers.lock().unwrap();
        buffers
            .pop_front()
            .unwrap_or_else(|| vec![0u8; self.buffer_size])
    }

    /// Return a buffer for reuse. The buffer is zeroed so stale frame
    /// content never leaks into the next frame; if the pool is already at
    /// capacity the buffer is dropped instead.
    pub fn release(&self, mut buffer: Vec<u8>) {
        buffer.fill(0);

        let mut buffers = self.buffers.lock().unwrap();
        if buffers.len() < self.max_buffers {
            buffers.push_back(buffer);
        }
    }

    /// Current `(retained, max)` buffer counts.
    pub fn stats(&self) -> (usize, usize) {
        let buffers = self.buffers.lock().unwrap();
        (buffers.len(), self.max_buffers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_pool_reuse() {
        let pool = FramePool::new(1024, 3);

        let buf = pool.acquire();
        assert_eq!(buf.len(), 1024);
        pool.release(buf);

        // The retained buffer comes back out.
        let buf = pool.acquire();
        assert_eq!(buf.len(), 1024);
        let (retained, max) = pool.stats();
        assert_eq!(retained, 0);
        assert_eq!(max, 3);
    }

    #[test]
    fn test_frame_pool_capacity() {
        let pool = FramePool::new(512, 2);

        let a = pool.acquire();
        let b = pool.acquire();
        let c = pool.acquire();

        pool.release(a);
        pool.release(b);
        pool.release(c);

        // Only max_buffers are retained; the third is dropped.
        let (retained, _) = pool.stats();
        assert_eq!(retained, 2);
    }

    #[test]
    fn test_frame_pool_zeroes_on_release() {
        let pool = FramePool::new(8, 1);
        let mut buf = pool.acquire();
        buf.fill(0xAB);
        pool.release(buf);
        assert!(pool.acquire().iter().all(|&b| b == 0));
    }
}
