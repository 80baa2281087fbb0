use std::collections::HashSet;

use pagesim::engine::{Engine, Step, Summary};
use pagesim::error::Result;
use pagesim::memory::{PageNumber, Policy};
use pagesim::trace::{Access, AccessKind, Trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A random trace of `len` accesses over `pages` distinct page numbers.
pub fn random(seed: u64, len: usize, pages: PageNumber) -> Trace {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            let kind = if rng.gen_bool(0.3) { AccessKind::Store } else { AccessKind::Load };
            Access { kind, page: rng.gen_range(0..pages) }
        })
        .collect()
}

/// A random trace where most accesses stay within a small moving window of
/// pages, closer to what a real program does.
pub fn local(seed: u64, len: usize) -> Trace {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut base: PageNumber = 0;
    let mut pages = vec![];
    for _ in 0..len {
        if rng.gen_bool(0.05) {
            base += rng.gen_range(1..8);
        }
        pages.push(base + rng.gen_range(0..6));
    }
    Trace::from_pages(pages)
}

pub fn distinct_pages(trace: &Trace) -> usize {
    trace.pages().collect::<HashSet<_>>().len()
}

/// Replay the whole trace one step at a time.
pub fn replay(policy: Policy, frames: usize, trace: &Trace) -> Result<(Vec<Step>, Summary)> {
    let mut engine = Engine::new(policy, frames, trace)?;
    let steps = engine.steps().collect::<Result<Vec<_>>>()?;
    Ok((steps, engine.summary()))
}
