//! Barrier delegating to std's cyclic barrier.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Barrier as StdBarrier;

use cache_padded::CachePadded;

pub(crate) struct NativeBarrier {
    barrier: StdBarrier,
    // Threads currently inside `barrier.wait()`. The std barrier must not
    // be destroyed while this is non zero.
    outstanding: CachePadded<AtomicU32>,
}

impl NativeBarrier {
    pub(crate) fn new(participants: u32) -> Self {
        Self {
            barrier: StdBarrier::new(participants as usize),
            outstanding: CachePadded::new(AtomicU32::new(0)),
        }
    }

    pub(crate) fn wait(&self) {
        self.outstanding.fetch_add(1, Ordering::Relaxed);
        self.barrier.wait();
        if self.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            atomic_wait::wake_all(&*self.outstanding);
        }
    }

    pub(crate) fn outstanding(&self) -> u32 {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Blocks until no thread is inside the std barrier.
    fn drain(&self) {
        let mut outstanding = self.outstanding();
        if outstanding != 0 {
            log::debug!("waiting for {outstanding} thread(s) to leave the std barrier");
        }
        while outstanding != 0 {
            atomic_wait::wait(&self.outstanding, outstanding);
            outstanding = self.outstanding();
        }
    }
}

impl Drop for NativeBarrier {
    fn drop(&mut self) {
        self.drain();
    }
}

#[cfg(test)]
mod tests {
    use super::NativeBarrier;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn outstanding_is_zero_once_every_thread_returned() {
        let barrier = NativeBarrier::new(4);
        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..20 {
                        barrier.wait();
                    }
                });
            }
        });
        assert_eq!(barrier.outstanding(), 0);
    }

    #[test]
    fn drain_blocks_while_a_thread_is_inside() {
        let barrier = NativeBarrier::new(2);
        let drained = AtomicBool::new(false);
        thread::scope(|s| {
            s.spawn(|| barrier.wait());
            while barrier.outstanding() == 0 {
                thread::yield_now();
            }
            s.spawn(|| {
                barrier.drain();
                drained.store(true, Ordering::SeqCst);
            });
            thread::sleep(Duration::from_millis(20));
            assert!(!drained.load(Ordering::SeqCst));
            barrier.wait();
        });
        assert!(drained.load(Ordering::SeqCst));
    }
}
