//! Barrier built from counting semaphores.
//!
//! The first turnstile holds threads until the last one of the round arrives,
//! the second holds them until every thread has cleared the first, so that
//! the first turnstile (and the arrival counter) can be reused by the next
//! round. See sections 3.6.5 to 3.6.7 of Allen B. Downey's *The Little Book
//! of Semaphores*.
//!
//! A third semaphore, the gate, admits at most `participants` threads per
//! round. Threads beyond that wait at the gate until the round has fully
//! drained and then form the next one.

use std::sync::atomic::{AtomicU32, Ordering};

use cache_padded::CachePadded;

use crate::semaphore::Semaphore;

pub(crate) struct TurnstileBarrier {
    participants: u32,
    arrived: CachePadded<AtomicU32>,
    gate: Semaphore,
    entry: Semaphore,
    exit: Semaphore,
}

impl TurnstileBarrier {
    pub(crate) fn new(participants: u32) -> Self {
        Self {
            participants,
            arrived: CachePadded::new(AtomicU32::new(0)),
            gate: Semaphore::open(participants),
            entry: Semaphore::closed(),
            exit: Semaphore::closed(),
        }
    }

    pub(crate) fn wait(&self) {
        // Keeps `arrived` within `0..=participants`.
        self.gate.acquire();
        // Everybody in.
        self.pass(
            self.arrived.fetch_add(1, Ordering::AcqRel) + 1 == self.participants,
            &self.entry,
        );
        // Everybody out, which leaves `arrived` at 0 and `entry` without
        // permits before anyone can start the next round.
        let last = self.arrived.fetch_sub(1, Ordering::AcqRel) == 1;
        if last {
            self.gate.release(self.participants);
        }
        self.pass(last, &self.exit);
    }

    /// The thread that completed the phase lets its peers through, the
    /// others block on the turnstile.
    fn pass(&self, last: bool, turnstile: &Semaphore) {
        if last {
            turnstile.release(self.participants - 1);
        } else {
            turnstile.acquire();
        }
    }

    pub(crate) fn arrived(&self) -> u32 {
        self.arrived.load(Ordering::Relaxed)
    }
}

impl Drop for TurnstileBarrier {
    fn drop(&mut self) {
        // `&mut self` means no thread is left inside `wait`, so both phases
        // have fully drained.
        debug_assert_eq!(self.arrived(), 0, "barrier dropped mid-round");
        debug_assert_eq!(self.gate.permits(), self.participants);
        debug_assert_eq!(self.entry.permits(), 0);
        debug_assert_eq!(self.exit.permits(), 0);
    }
}
