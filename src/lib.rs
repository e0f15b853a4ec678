#![forbid(unsafe_code)]

//! A reusable barrier: blocks a fixed number of threads until all of them
//! have arrived, releases them together, and is immediately ready for the
//! next round.
//!
//! # Barrier vs std's Barrier
//!
//! [`Barrier`] has the same contract as [`std::sync::Barrier`], with a few
//! differences:
//!
//! * The synchronization [`Strategy`] is selectable: std's cyclic barrier,
//!   semaphore turnstiles, or a mutex with two condition variables. [`Strategy::host()`] picks one at build time.
//!
//! * A barrier created for 0 threads is not an error, it is an *invalid*
//!   barrier on which [`Barrier::wait`] never blocks.
//!
//! * Dropping a barrier blocks until every thread released by the last
//!   round has left [`Barrier::wait`], so the synchronization state is never
//!   torn down under a waking thread.
//!
//! * Nobody is elected leader: [`Barrier::wait`] returns `()`.
//!
//! # Examples
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::thread;
//! use turnstile::Barrier;
//!
//! let barrier = Barrier::new(4);
//! let done = AtomicUsize::new(0);
//!
//! thread::scope(|s| {
//!     for _ in 0..4 {
//!         s.spawn(|| {
//!             // First phase.
//!             done.fetch_add(1, Ordering::Relaxed);
//!
//!             // Block until all four threads finished the first phase.
//!             barrier.wait();
//!             assert_eq!(done.load(Ordering::Relaxed), 4);
//!
//!             // The same barrier can be used again.
//!             barrier.wait();
//!         });
//!     }
//! });
//! ```
//!
//! # Limitations
//!
//! There is no timeout and no cancellation: a thread whose peers never show
//! up stays blocked forever.
use std::{
    fmt::{self, Debug, Display},
    str::FromStr,
};

mod condvar;
mod error;
mod native;
mod semaphore;
mod turnstile;

pub use error::Error;

use condvar::CondVarBarrier;
use native::NativeBarrier;
use turnstile::TurnstileBarrier;

/// How a [`Barrier`] makes its threads wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Delegates to [`std::sync::Barrier`] and counts the threads inside it
    /// so that dropping waits for them.
    Native,
    /// Counting semaphores used as turnstiles: one to let a complete round
    /// in, one to let it out before the next round starts, and a gate
    /// admitting at most one round's worth of threads.
    Turnstile,
    /// A mutex and two condition variables, the second one signalling the
    /// destructor once the last released thread is out.
    CondVar,
}

impl Strategy {
    /// All strategies, in no particular order.
    pub const ALL: [Strategy; 3] = [Strategy::Native, Strategy::Turnstile, Strategy::CondVar];

    /// The strategy used by [`Barrier::new`] on this target.
    ///
    /// Linux and QNX get [`Native`](Strategy::Native), Windows gets
    /// [`Turnstile`](Strategy::Turnstile) and every other target gets
    /// [`CondVar`](Strategy::CondVar). The `force-turnstile` and
    /// `force-condvar` features override this choice.
    pub const fn host() -> Self {
        if cfg!(feature = "force-condvar") {
            Strategy::CondVar
        } else if cfg!(feature = "force-turnstile") {
            Strategy::Turnstile
        } else if cfg!(any(target_os = "linux", target_os = "nto")) {
            Strategy::Native
        } else if cfg!(windows) {
            Strategy::Turnstile
        } else {
            Strategy::CondVar
        }
    }

    fn name(self) -> &'static str {
        match self {
            Strategy::Native => "native",
            Strategy::Turnstile => "turnstile",
            Strategy::CondVar => "condvar",
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::host()
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownStrategy(s.to_owned()))
    }
}

/// A reusable barrier. See the [crate] documentation for more.
///
/// # Remarks
///
/// - There cannot be more than 2³² - 1 participants.
pub struct Barrier {
    participants: usize,
    imp: Imp,
}

enum Imp {
    Invalid,
    Native(NativeBarrier),
    Turnstile(TurnstileBarrier),
    CondVar(CondVarBarrier),
}

impl Barrier {
    /// The largest participant count a barrier accepts.
    pub const MAX_PARTICIPANTS: usize = u32::MAX as usize;

    /// Creates a barrier for `participants` threads using
    /// [`Strategy::host()`].
    ///
    /// # Panics
    ///
    /// Panics if `participants` is above [`Barrier::MAX_PARTICIPANTS`]. Use
    /// [`Barrier::try_new`] to get an error instead.
    pub fn new(participants: usize) -> Self {
        match Self::try_new(participants) {
            Ok(barrier) => barrier,
            Err(e) => panic!("{e}"),
        }
    }

    /// Creates a barrier for `participants` threads using
    /// [`Strategy::host()`].
    pub fn try_new(participants: usize) -> Result<Self, Error> {
        Self::with_strategy(participants, Strategy::host())
    }

    /// Creates a barrier for `participants` threads using `strategy`.
    ///
    /// A count of 0 gives an invalid barrier, see [`Barrier::is_valid`].
    pub fn with_strategy(participants: usize, strategy: Strategy) -> Result<Self, Error> {
        let count = u32::try_from(participants).map_err(|_| Error::TooManyParticipants {
            requested: participants,
            max: Self::MAX_PARTICIPANTS,
        })?;
        let imp = match (count, strategy) {
            (0, _) => Imp::Invalid,
            (n, Strategy::Native) => Imp::Native(NativeBarrier::new(n)),
            (n, Strategy::Turnstile) => Imp::Turnstile(TurnstileBarrier::new(n)),
            (n, Strategy::CondVar) => Imp::CondVar(CondVarBarrier::new(n)),
        };
        log::trace!("new barrier for {participants} thread(s), strategy: {strategy}");
        Ok(Self { participants, imp })
    }

    /// Whether the barrier was created for at least one thread.
    pub fn is_valid(&self) -> bool {
        !matches!(self.imp, Imp::Invalid)
    }

    /// The number of threads a round waits for.
    pub fn participants(&self) -> usize {
        self.participants
    }

    /// The strategy in use, `None` for an invalid barrier.
    pub fn strategy(&self) -> Option<Strategy> {
        match self.imp {
            Imp::Invalid => None,
            Imp::Native(_) => Some(Strategy::Native),
            Imp::Turnstile(_) => Some(Strategy::Turnstile),
            Imp::CondVar(_) => Some(Strategy::CondVar),
        }
    }

    /// Blocks until [`participants`](Barrier::participants) threads,
    /// including this one, have called `wait` since the last release.
    ///
    /// Everything a participant wrote before calling `wait` is visible to
    /// every participant of the same round once its `wait` returns.
    ///
    /// More threads than `participants` may share the barrier: the extra
    /// ones are held back until the current round is released and drained,
    /// and then make up the next round.
    ///
    /// Returns at once on an invalid barrier or a barrier for a single
    /// thread. Otherwise there is no way out but the arrival of the other
    /// threads: no timeout, no cancellation.
    pub fn wait(&self) {
        if self.participants <= 1 {
            return;
        }
        match &self.imp {
            Imp::Invalid => {}
            Imp::Native(barrier) => barrier.wait(),
            Imp::Turnstile(barrier) => barrier.wait(),
            Imp::CondVar(barrier) => barrier.wait(),
        }
    }
}

// Common traits implementations

impl Debug for Barrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Barrier");
        s.field("participants", &self.participants)
            .field("strategy", &self.strategy());
        match &self.imp {
            Imp::Invalid => {}
            Imp::Native(barrier) => {
                s.field("outstanding", &barrier.outstanding());
            }
            Imp::Turnstile(barrier) => {
                s.field("arrived", &barrier.arrived());
            }
            Imp::CondVar(barrier) => {
                let (arrived, exit_count) = barrier.snapshot();
                s.field("arrived", &arrived).field("exit count", &exit_count);
            }
        }
        s.finish()
    }
}
