//! Creates a barrier, runs one round on it, joins the participants and drops
//! the barrier at once, over and over. Meant to be run under Miri or a
//! sanitizer to catch the barrier being torn down under a waking thread.
//!
//! Usage: `stress-test [iterations] [participants] [strategy|all]`

use std::process::ExitCode;

use turnstile::{Barrier, Strategy};

const ITERATIONS: usize = 10_000;
const PARTICIPANTS: usize = 8;

fn teardown_once(participants: usize, strategy: Strategy) -> Result<(), String> {
    let barrier = Barrier::with_strategy(participants, strategy).map_err(|e| e.to_string())?;
    crossbeam_utils::thread::scope(|s| {
        for _ in 0..participants {
            s.spawn(|_| barrier.wait());
        }
    })
    .map_err(|_| format!("a {strategy} participant panicked"))?;
    drop(barrier);
    Ok(())
}

fn parse_args() -> Result<(usize, usize, Vec<Strategy>), String> {
    let mut args = std::env::args().skip(1);
    let iterations = match args.next() {
        Some(s) => s.parse::<usize>().map_err(|e| format!("iterations `{s}`: {e}"))?,
        None => ITERATIONS,
    };
    let participants = match args.next() {
        Some(s) => s.parse::<usize>().map_err(|e| format!("participants `{s}`: {e}"))?,
        None => PARTICIPANTS,
    };
    let strategies = match args.next().as_deref() {
        None | Some("all") => Strategy::ALL.to_vec(),
        Some(s) => vec![s.parse::<Strategy>().map_err(|e| e.to_string())?],
    };
    Ok((iterations, participants, strategies))
}

fn main() -> ExitCode {
    let (iterations, participants, strategies) = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    for strategy in strategies {
        for _ in 0..iterations {
            if let Err(e) = teardown_once(participants, strategy) {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        }
        println!("{strategy}: {iterations} x {participants} threads");
    }
    ExitCode::SUCCESS
}
