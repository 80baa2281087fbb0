use std::fmt::{Display, Formatter};

use log::{debug, info};

use crate::error::{Error, Result};
use crate::internal_err;
use crate::memory::directory::PageDirectory;
use crate::memory::frame::{FrameIndex, FrameTable};
use crate::memory::replacer::{self, Replacer};
use crate::memory::{MemorySize, PageNumber, Policy};
use crate::trace::{AccessKind, Trace};

/// Hit and miss counters of a simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub hits: u64,
    pub misses: u64,
    /// Always equal to misses, every miss faults a page in.
    pub page_faults: u64,
}

impl Stats {
    pub fn total(&self) -> u64 {
        self.hits + self.misses
    }

    pub fn hit_ratio(&self) -> f64 {
        ratio(self.hits, self.total())
    }

    pub fn miss_ratio(&self) -> f64 {
        ratio(self.misses, self.total())
    }
}

fn ratio(n: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    n as f64 / total as f64
}

/// Aggregate result of a simulation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub policy: Policy,
    pub frames: usize,
    pub stats: Stats,
}

impl Summary {
    pub fn hit_ratio(&self) -> f64 {
        self.stats.hit_ratio()
    }

    pub fn miss_ratio(&self) -> f64 {
        self.stats.miss_ratio()
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Algorithm: {} ({} frames)", self.policy, self.frames)?;
        writeln!(f, "Hits: {}, Misses: {}", self.stats.hits, self.stats.misses)?;
        writeln!(f, "Total references: {}", self.stats.total())?;
        writeln!(f, "Page faults: {}", self.stats.page_faults)?;
        writeln!(f, "Hit ratio: {:.2}%", self.hit_ratio() * 100.0)?;
        write!(f, "Miss ratio: {:.2}%", self.miss_ratio() * 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Hit,
    Miss,
}

/// A page pushed out of its frame to make room for a faulting page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eviction {
    pub frame: FrameIndex,
    pub page: PageNumber,
}

/// Result of replaying a single access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Position of the access in the trace.
    pub index: usize,
    pub page: PageNumber,
    pub kind: AccessKind,
    pub outcome: Outcome,
    /// Frame the page was found in, or installed into.
    pub frame: FrameIndex,
    pub evicted: Option<Eviction>,
}

impl Display for Step {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.outcome {
            Outcome::Hit => write!(
                f,
                "Step {} - Hit: Page {} found in frame {}",
                self.index, self.page, self.frame
            ),
            Outcome::Miss => {
                write!(
                    f,
                    "Step {} - Miss: Page {} loaded into frame {}",
                    self.index, self.page, self.frame
                )?;
                if let Some(evicted) = self.evicted {
                    write!(f, ", evicted page {}", evicted.page)?;
                }
                Ok(())
            }
        }
    }
}

/// Engine replays a trace against a fixed number of physical frames.
///
/// Each access is looked up in the page directory. A hit only updates the
/// reference bookkeeping. A miss takes the next free frame, or once memory
/// is full evicts the frame chosen by the replacer, then installs the page.
///
/// The engine borrows the trace for its whole lifetime and owns all other
/// state, so independent runs over the same trace need independent engines.
/// It can be driven in one go with [`Engine::run`], or one access at a time
/// with [`Engine::step`], both share the same code path.
pub struct Engine<'a> {
    trace: &'a Trace,
    frames: FrameTable,
    directory: PageDirectory,
    replacer: Box<dyn Replacer + 'a>,
    stats: Stats,
    /// index of the next access to replay.
    position: usize,
}

impl<'a> Engine<'a> {
    pub fn new(policy: Policy, num_frames: usize, trace: &'a Trace) -> Result<Self> {
        let frames = FrameTable::new(num_frames)?;
        if trace.is_empty() {
            return Err(Error::EmptyTrace);
        }
        let directory = PageDirectory::new(num_frames);
        let replacer = replacer::new(policy, num_frames, trace);
        Ok(Engine { trace, frames, directory, replacer, stats: Stats::default(), position: 0 })
    }

    pub fn with_memory(policy: Policy, memory: MemorySize, trace: &'a Trace) -> Result<Self> {
        Self::new(policy, memory.frames(), trace)
    }

    pub fn policy(&self) -> Policy {
        self.replacer.policy()
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn summary(&self) -> Summary {
        Summary { policy: self.policy(), frames: self.frames.capacity(), stats: self.stats }
    }

    pub fn directory(&self) -> &PageDirectory {
        &self.directory
    }

    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    /// Index of the next access to replay.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.trace.len()
    }

    /// Replay every remaining access and return the aggregate result.
    pub fn run(&mut self) -> Result<Summary> {
        info!(
            "simulating {} accesses with {} over {} frames",
            self.trace.len() - self.position,
            self.policy(),
            self.frames.capacity()
        );
        while self.step()?.is_some() {}
        let summary = self.summary();
        info!(
            "hits: {}, misses: {}, page faults: {}",
            summary.stats.hits, summary.stats.misses, summary.stats.page_faults
        );
        Ok(summary)
    }

    /// Replay the next access, None once the trace is exhausted.
    pub fn step(&mut self) -> Result<Option<Step>> {
        let Some(&access) = self.trace.get(self.position) else {
            return Ok(None);
        };
        let index = self.position;
        let page = access.page;

        if let Some(frame) = self.directory.lookup(page) {
            self.stats.hits += 1;
            self.directory.reference(frame);
            self.replacer.record_hit(frame);
            self.position += 1;
            debug!("Step {} - Hit: Page {} found in frame {}", index, page, frame);
            return Ok(Some(Step {
                index,
                page,
                kind: access.kind,
                outcome: Outcome::Hit,
                frame,
                evicted: None,
            }));
        }

        self.stats.misses += 1;
        self.stats.page_faults += 1;
        debug!("Step {} - Miss: Page {} not found", index, page);

        let (frame, evicted) = self.place(index)?;
        self.directory.install(frame, page)?;
        self.frames.occupy(frame, page);
        self.replacer.record_install(frame, page);
        self.position += 1;

        Ok(Some(Step { index, page, kind: access.kind, outcome: Outcome::Miss, frame, evicted }))
    }

    /// Iterate over the remaining steps.
    pub fn steps(&mut self) -> Steps<'_, 'a> {
        Steps { engine: self }
    }

    /// Find a frame for the page faulting at `index`, free frames first.
    fn place(&mut self, index: usize) -> Result<(FrameIndex, Option<Eviction>)> {
        if let Some(frame) = self.frames.allocate_next_free() {
            return Ok((frame, None));
        }
        let frame = self.replacer.victim(&self.frames, index).ok_or_else(|| {
            internal_err!("no victim frame available with {} frames", self.frames.capacity())
        })?;
        let page = self
            .directory
            .invalidate(frame)
            .ok_or_else(|| internal_err!("victim frame {} has no resident page", frame))?;
        debug!("Step {} - Evict: Page {} from frame {}", index, page, frame);
        Ok((frame, Some(Eviction { frame, page })))
    }
}

/// Iterator over the remaining steps of an [`Engine`].
pub struct Steps<'e, 'a> {
    engine: &'e mut Engine<'a>,
}

impl Iterator for Steps<'_, '_> {
    type Item = Result<Step>;

    fn next(&mut self) -> Option<Self::Item> {
        self.engine.step().transpose()
    }
}
