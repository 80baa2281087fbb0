use super::frame::{FrameIndex, FrameTable};
use super::{PageNumber, Policy};

/// Replacer tracks frame usage for replacement in case physical memory is full.
pub trait Replacer {
    /// The policy this replacer implements.
    fn policy(&self) -> Policy;

    /// Choose the frame to evict. `position` is the index in the trace of the
    /// access that missed.
    ///
    /// Only called once every frame of `frames` is occupied. Return None if no
    /// frame is occupied at all.
    fn victim(&mut self, frames: &FrameTable, position: usize) -> Option<FrameIndex>;

    /// Record that `page` has just been installed into `frame` after a miss.
    fn record_install(&mut self, frame: FrameIndex, page: PageNumber);

    /// Record a hit on the page resident in `frame`.
    fn record_hit(&mut self, _frame: FrameIndex) {}
}

/// Random access to the accesses that are still ahead of the simulation.
///
/// Only the optimal replacer needs it, a trace that is consumed as a stream
/// can not provide it.
pub trait Lookahead {
    /// Position of the first access to `page` at or after `from`.
    fn next_use(&self, page: PageNumber, from: usize) -> Option<usize>;
}

impl Lookahead for [PageNumber] {
    fn next_use(&self, page: PageNumber, from: usize) -> Option<usize> {
        self.iter().skip(from).position(|&p| p == page).map(|i| i + from)
    }
}

/// Build the replacer for `policy` over `size` frames.
pub fn new<'a, L>(policy: Policy, size: usize, lookahead: &'a L) -> Box<dyn Replacer + 'a>
where
    L: Lookahead + ?Sized,
{
    match policy {
        Policy::Fifo => Box::new(FifoReplacer::new(size)),
        Policy::Lru => Box::new(LruReplacer::new(size)),
        Policy::Optimal => Box::new(OptimalReplacer::new(lookahead)),
        Policy::SecondChance | Policy::Clock => Box::new(ClockReplacer::new(policy, size)),
    }
}

/// FifoReplacer evicts frames in the order they were first filled.
///
/// Since frames are filled in index order and a victim is refilled right
/// away, a cursor walking the frames round robin is all the state needed.
pub struct FifoReplacer {
    size: usize,
    cursor: usize,
}

impl FifoReplacer {
    pub fn new(size: usize) -> Self {
        FifoReplacer { size, cursor: 0 }
    }
}

impl Replacer for FifoReplacer {
    fn policy(&self) -> Policy {
        Policy::Fifo
    }

    fn victim(&mut self, frames: &FrameTable, _position: usize) -> Option<FrameIndex> {
        frames.occupied().next()?;
        let victim = FrameIndex::new(self.cursor);
        self.cursor = (self.cursor + 1) % self.size;
        Some(victim)
    }

    fn record_install(&mut self, _frame: FrameIndex, _page: PageNumber) {}
}

/// LruReplacer approximates LRU with an age per frame.
///
/// The age counts the misses since the page of a frame was installed: every
/// install resets the age of the installed frame and bumps the age of every
/// other occupied frame. Hits leave the ages alone, so this is not textbook
/// LRU (a page hit a moment ago can still be the oldest one); eviction
/// decisions depend on exactly this rule.
///
/// The victim is the frame with the greatest age, the lowest index wins ties.
pub struct LruReplacer {
    /// None for frames that never had a page installed.
    ages: Vec<Option<usize>>,
}

impl LruReplacer {
    pub fn new(size: usize) -> Self {
        LruReplacer { ages: vec![None; size] }
    }

    pub fn age(&self, frame: FrameIndex) -> Option<usize> {
        self.ages[frame.get()]
    }
}

impl Replacer for LruReplacer {
    fn policy(&self) -> Policy {
        Policy::Lru
    }

    fn victim(&mut self, _frames: &FrameTable, _position: usize) -> Option<FrameIndex> {
        let mut oldest: Option<(usize, usize)> = None;
        for (i, age) in self.ages.iter().enumerate() {
            let Some(age) = *age else { continue };
            match oldest {
                Some((_, max)) if age <= max => {}
                _ => oldest = Some((i, age)),
            }
        }
        oldest.map(|(i, _)| FrameIndex::new(i))
    }

    fn record_install(&mut self, frame: FrameIndex, _page: PageNumber) {
        for (i, age) in self.ages.iter_mut().enumerate() {
            if i == frame.get() {
                *age = Some(0);
            } else if let Some(age) = age {
                *age += 1;
            }
        }
    }
}

/// OptimalReplacer implements Belady's MIN.
///
/// It evicts the frame whose page is used again farthest in the future. The
/// first frame (in index order) whose page is never used again is evicted
/// right away, without looking at the remaining frames.
pub struct OptimalReplacer<'a, L: Lookahead + ?Sized> {
    lookahead: &'a L,
}

impl<'a, L: Lookahead + ?Sized> OptimalReplacer<'a, L> {
    pub fn new(lookahead: &'a L) -> Self {
        OptimalReplacer { lookahead }
    }
}

impl<'a, L: Lookahead + ?Sized> Replacer for OptimalReplacer<'a, L> {
    fn policy(&self) -> Policy {
        Policy::Optimal
    }

    fn victim(&mut self, frames: &FrameTable, position: usize) -> Option<FrameIndex> {
        let mut first = None;
        let mut farthest = position;
        let mut victim = None;
        for (frame, page) in frames.occupied() {
            first.get_or_insert(frame);
            match self.lookahead.next_use(page, position) {
                None => return Some(frame),
                Some(at) if at > farthest => {
                    farthest = at;
                    victim = Some(frame);
                }
                Some(_) => {}
            }
        }
        victim.or(first)
    }

    fn record_install(&mut self, _frame: FrameIndex, _page: PageNumber) {}
}

/// ClockReplacer implements both second chance and clock, which are the same
/// algorithm: a hand sweeps the frames, a frame with its reference bit set
/// gets the bit cleared and is skipped, the first frame found with the bit
/// clear is the victim. Installs and hits set the bit.
///
/// The sweep ends within one revolution plus one step, since every skipped
/// frame has its bit cleared on the way.
pub struct ClockReplacer {
    policy: Policy,
    bits: Vec<bool>,
    hand: usize,
}

impl ClockReplacer {
    pub fn new(policy: Policy, size: usize) -> Self {
        ClockReplacer { policy, bits: vec![false; size], hand: 0 }
    }

    pub fn hand(&self) -> FrameIndex {
        FrameIndex::new(self.hand)
    }

    pub fn is_referenced(&self, frame: FrameIndex) -> bool {
        self.bits[frame.get()]
    }

    fn advance(&mut self) {
        self.hand = (self.hand + 1) % self.bits.len();
    }
}

impl Replacer for ClockReplacer {
    fn policy(&self) -> Policy {
        self.policy
    }

    fn victim(&mut self, frames: &FrameTable, _position: usize) -> Option<FrameIndex> {
        frames.occupied().next()?;
        for _ in 0..=self.bits.len() {
            let frame = self.hand;
            self.advance();
            if !self.bits[frame] {
                return Some(FrameIndex::new(frame));
            }
            self.bits[frame] = false;
        }
        None
    }

    fn record_install(&mut self, frame: FrameIndex, _page: PageNumber) {
        self.bits[frame.get()] = true;
    }

    fn record_hit(&mut self, frame: FrameIndex) {
        self.bits[frame.get()] = true;
    }
}
