//! Barrier built from a mutex and two condition variables.
//!
//! The arrival condvar releases a round. The exit condvar lets the destructor
//! wait for the last released thread to be done with the mutex: `exit_count`
//! holds one slot per released thread plus one for the destructor, and
//! whoever takes it to zero wakes the others.
//!
//! The exit condvar also holds back threads arriving while the previous
//! round is still draining, so they count towards the next round only once
//! every released thread has given back its slot.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

pub(crate) struct CondVarBarrier {
    participants: u32,
    state: Mutex<State>,
    arrival: Condvar,
    exit: Condvar,
}

#[derive(Debug)]
struct State {
    arrived: u32,
    exit_count: u64,
    generation: u64,
}

impl CondVarBarrier {
    pub(crate) fn new(participants: u32) -> Self {
        Self {
            participants,
            state: Mutex::new(State {
                arrived: 0,
                // The destructor's slot.
                exit_count: 1,
                generation: 0,
            }),
            arrival: Condvar::new(),
            exit: Condvar::new(),
        }
    }

    // Nothing panics while holding the lock, so a poisoned state is still
    // consistent.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn wait(&self) {
        let mut state = self
            .exit
            .wait_while(self.lock(), |state| state.exit_count > 1)
            .unwrap_or_else(PoisonError::into_inner);
        state.arrived += 1;
        if state.arrived == self.participants {
            state.arrived = 0;
            state.exit_count = u64::from(self.participants) + 1;
            state.generation = state.generation.wrapping_add(1);
            self.arrival.notify_all();
        } else {
            let generation = state.generation;
            state = self
                .arrival
                .wait_while(state, |state| state.generation == generation)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.exit_count -= 1;
        // 1: the round has drained, 0: the destructor may proceed.
        if state.exit_count <= 1 {
            self.exit.notify_all();
        }
    }

    pub(crate) fn snapshot(&self) -> (u32, u64) {
        let state = self.lock();
        (state.arrived, state.exit_count)
    }
}

impl Drop for CondVarBarrier {
    fn drop(&mut self) {
        let mut state = self.lock();
        state.exit_count -= 1;
        if state.exit_count != 0 {
            log::debug!(
                "waiting for {} released thread(s) to leave the barrier",
                state.exit_count
            );
            drop(
                self.exit
                    .wait_while(state, |state| state.exit_count != 0)
                    .unwrap_or_else(PoisonError::into_inner),
            );
        }
    }
}
