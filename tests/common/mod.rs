#![allow(dead_code)]

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use turnstile::{Barrier, Strategy};

/// Generous enough for a loaded CI machine, short enough to notice a hang.
pub const TIMEOUT: Duration = Duration::from_secs(30);

/// Runs `f` on a background thread and fails if it does not finish within
/// `timeout`. A hung thread is leaked.
pub fn within<F>(timeout: Duration, f: F)
where
    F: FnOnce() + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        f();
        let _ = tx.send(());
    });
    match rx.recv_timeout(timeout) {
        Ok(()) => {}
        Err(RecvTimeoutError::Timeout) => panic!("still blocked after {timeout:?}"),
        Err(RecvTimeoutError::Disconnected) => panic!("the test thread panicked"),
    }
}

/// Spawns `participants` scoped threads running `f(thread index)`, all
/// sharing `barrier`.
pub fn spawn_participants<F>(barrier: &Barrier, participants: usize, f: F)
where
    F: Fn(&Barrier, usize) + Sync,
{
    thread::scope(|s| {
        for id in 0..participants {
            let f = &f;
            s.spawn(move || f(barrier, id));
        }
    });
}

pub fn barrier(participants: usize, strategy: Strategy) -> Barrier {
    Barrier::with_strategy(participants, strategy).unwrap()
}
