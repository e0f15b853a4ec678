//! A counting semaphore on top of a single futex word.

use std::sync::atomic::{AtomicU32, Ordering};

use cache_padded::CachePadded;

pub(crate) struct Semaphore {
    permits: CachePadded<AtomicU32>,
}

impl Semaphore {
    /// A semaphore holding no permit: every `acquire` blocks until a
    /// `release`.
    pub(crate) fn closed() -> Self {
        Self {
            permits: CachePadded::new(AtomicU32::new(0)),
        }
    }

    /// A semaphore holding `permits` permits.
    pub(crate) fn open(permits: u32) -> Self {
        Self {
            permits: CachePadded::new(AtomicU32::new(permits)),
        }
    }

    /// Takes one permit, sleeping on the futex while there is none.
    pub(crate) fn acquire(&self) {
        let mut permits = self.permits.load(Ordering::Relaxed);
        loop {
            if permits == 0 {
                // Returns at once if a release slipped in since the load.
                atomic_wait::wait(&self.permits, 0);
                permits = self.permits.load(Ordering::Relaxed);
                continue;
            }
            match self.permits.compare_exchange_weak(
                permits,
                permits - 1,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(actual) => permits = actual,
            }
        }
    }

    /// Adds `n` permits and wakes up to `n` sleepers.
    pub(crate) fn release(&self, n: u32) {
        match n {
            0 => {}
            1 => {
                self.permits.fetch_add(1, Ordering::Release);
                atomic_wait::wake_one(&*self.permits);
            }
            n => {
                let before = self.permits.fetch_add(n, Ordering::Release);
                debug_assert!(before.checked_add(n).is_some(), "semaphore overflow");
                atomic_wait::wake_all(&*self.permits);
            }
        }
    }

    pub(crate) fn permits(&self) -> u32 {
        self.permits.load(Ordering::Relaxed)
    }
}
