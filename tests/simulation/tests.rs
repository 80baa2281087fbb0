use log::info;
use pagesim::engine::{Engine, Outcome};
use pagesim::error::{Error, Result};
use pagesim::memory::{MemorySize, PageNumber, Policy};
use pagesim::trace::Trace;
use paste::paste;

use super::traces::{distinct_pages, local, random, replay};

const FRAME_COUNTS: [usize; 5] = [1, 2, 3, 7, 16];

macro_rules! test_policy {
    ($($name:ident: $policy:expr, )*) => {
        paste! {
        $(
            #[test]
            fn [< test_ $name _counters >]() -> Result<()> {
                setup!();
                for seed in 0..8 {
                    let trace = random(seed, 300, 24);
                    for frames in FRAME_COUNTS {
                        let (steps, summary) = replay($policy, frames, &trace)?;
                        let stats = summary.stats;
                        assert_eq!(trace.len() as u64, stats.hits + stats.misses);
                        assert_eq!(stats.misses, stats.page_faults);
                        assert_eq!(trace.len(), steps.len());

                        let hits = steps.iter().filter(|s| s.outcome == Outcome::Hit).count();
                        assert_eq!(stats.hits, hits as u64);
                        let ratios = summary.hit_ratio() + summary.miss_ratio();
                        assert!((ratios - 1.0).abs() < 1e-9);
                    }
                }
                Ok(())
            }

            #[test]
            fn [< test_ $name _deterministic >]() -> Result<()> {
                setup!();
                let trace = local(42, 500);
                for frames in FRAME_COUNTS {
                    let first = replay($policy, frames, &trace)?;
                    let second = replay($policy, frames, &trace)?;
                    assert_eq!(first, second);
                }
                Ok(())
            }

            #[test]
            fn [< test_ $name _batch_matches_incremental >]() -> Result<()> {
                setup!();
                let trace = local(7, 400);
                for frames in FRAME_COUNTS {
                    let mut batch = Engine::new($policy, frames, &trace)?;
                    let summary = batch.run()?;

                    let mut incremental = Engine::new($policy, frames, &trace)?;
                    while incremental.step()?.is_some() {}

                    assert_eq!(summary, incremental.summary());
                    assert_eq!(batch.directory(), incremental.directory());
                }
                Ok(())
            }

            #[test]
            fn [< test_ $name _enough_frames >]() -> Result<()> {
                setup!();
                let trace = random(3, 200, 10);
                let distinct = distinct_pages(&trace);
                for frames in [distinct, distinct + 1, 256] {
                    let (steps, summary) = replay($policy, frames, &trace)?;
                    assert!(steps.iter().all(|s| s.evicted.is_none()));
                    assert_eq!(distinct as u64, summary.stats.page_faults);
                }
                Ok(())
            }
        )*
        }
    };
}

test_policy! {
    fifo: Policy::Fifo,
    lru: Policy::Lru,
    optimal: Policy::Optimal,
    second_chance: Policy::SecondChance,
    clock: Policy::Clock,
}

#[test]
fn test_empty_trace() {
    setup!();
    let trace = Trace::default();
    for policy in Policy::ALL {
        assert_eq!(Some(Error::EmptyTrace), Engine::new(policy, 3, &trace).err());
        let result = Engine::with_memory(policy, MemorySize::Bits24, &trace);
        assert_eq!(Some(Error::EmptyTrace), result.err());
    }
}

#[test]
fn test_fifo_evicts_in_visiting_order() -> Result<()> {
    setup!();
    for frames in FRAME_COUNTS {
        let trace = Trace::from_pages((0..=frames as PageNumber).map(|p| p * 17 + 3));
        let (steps, _) = replay(Policy::Fifo, frames, &trace)?;
        let evicted = steps.iter().filter_map(|s| s.evicted).map(|e| e.page).collect::<Vec<_>>();
        assert_eq!(vec![trace[0].page], evicted);

        // 2N distinct pages evict the first N pages in visiting order.
        let pages = (0..2 * frames as PageNumber).map(|p| p * 17 + 3).collect::<Vec<_>>();
        let (steps, _) = replay(Policy::Fifo, frames, &Trace::from_pages(pages.clone()))?;
        let evicted = steps.iter().filter_map(|s| s.evicted).map(|e| e.page).collect::<Vec<_>>();
        assert_eq!(pages[..frames].to_vec(), evicted);
    }
    Ok(())
}

#[test]
fn test_optimal_has_fewest_faults() -> Result<()> {
    setup!();
    for seed in 0..8 {
        let trace = if seed % 2 == 0 { random(seed, 300, 20) } else { local(seed, 300) };
        for frames in FRAME_COUNTS {
            let (_, optimal) = replay(Policy::Optimal, frames, &trace)?;
            for policy in Policy::ALL {
                let (_, summary) = replay(policy, frames, &trace)?;
                info!("seed {} frames {}: {} faults {}", seed, frames, policy, summary.stats.page_faults);
                assert!(optimal.stats.page_faults <= summary.stats.page_faults);
            }
        }
    }
    Ok(())
}

#[test]
fn test_second_chance_is_clock() -> Result<()> {
    setup!();
    for seed in 0..4 {
        let trace = random(seed, 300, 12);
        for frames in FRAME_COUNTS {
            let (second_chance, _) = replay(Policy::SecondChance, frames, &trace)?;
            let (clock, _) = replay(Policy::Clock, frames, &trace)?;
            assert_eq!(second_chance, clock);
        }
    }
    Ok(())
}

#[test]
fn test_independent_passes() -> Result<()> {
    setup!();
    let trace = local(11, 300);
    for policy in Policy::ALL {
        let (expect, summary) = replay(policy, 4, &trace)?;

        // two engines over the same trace, driven in lockstep, do not interfere.
        let mut first = Engine::new(policy, 4, &trace)?;
        let mut second = Engine::new(policy, 4, &trace)?;
        let mut got = vec![];
        while let Some(step) = first.step()? {
            assert_eq!(Some(step), second.step()?);
            got.push(step);
        }
        assert_eq!(expect, got);
        assert_eq!(summary, first.summary());
        assert_eq!(summary, second.summary());
    }
    Ok(())
}

#[test]
fn test_pause_and_resume() -> Result<()> {
    setup!();
    let trace = random(5, 100, 9);
    let (expect, _) = replay(Policy::Optimal, 3, &trace)?;

    let mut engine = Engine::new(Policy::Optimal, 3, &trace)?;
    let mut got = engine.steps().take(40).collect::<Result<Vec<_>>>()?;
    assert_eq!(40, engine.position());
    got.extend(engine.steps().collect::<Result<Vec<_>>>()?);
    assert!(engine.is_finished());
    assert_eq!(expect, got);
    Ok(())
}
