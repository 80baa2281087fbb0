use std::fmt::{Display, Formatter};

use crate::config_err;
use crate::error::Result;

use super::PageNumber;

/// Index of a physical frame, always in range `[0, capacity)` of the
/// [`FrameTable`] that handed it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameIndex(usize);

impl FrameIndex {
    pub fn new(index: usize) -> Self {
        FrameIndex(index)
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Display for FrameIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content of a physical frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Slot {
    #[default]
    Empty,
    Occupied(PageNumber),
}

/// Fixed-size array of physical frames.
///
/// Frames are handed out in index order until the table is full. After
/// that the only way to get a frame is to evict one through a replacer.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTable {
    slots: Vec<Slot>,
    /// the next never-used frame, equals capacity once the table filled up.
    next_free: usize,
}

impl FrameTable {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(config_err!("physical memory must have at least one frame"));
        }
        Ok(FrameTable { slots: vec![Slot::Empty; capacity], next_free: 0 })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_full(&self) -> bool {
        self.next_free >= self.slots.len()
    }

    /// Take the next never-used frame, None if every frame has been used once
    /// and the caller has to evict.
    pub fn allocate_next_free(&mut self) -> Option<FrameIndex> {
        if self.is_full() {
            return None;
        }
        let frame = FrameIndex(self.next_free);
        self.next_free += 1;
        Some(frame)
    }

    pub fn occupy(&mut self, frame: FrameIndex, page: PageNumber) {
        self.slots[frame.0] = Slot::Occupied(page);
    }

    pub fn slot(&self, frame: FrameIndex) -> Slot {
        self.slots[frame.0]
    }

    pub fn page(&self, frame: FrameIndex) -> Option<PageNumber> {
        match self.slots[frame.0] {
            Slot::Occupied(page) => Some(page),
            Slot::Empty => None,
        }
    }

    /// Occupied frames in index order.
    pub fn occupied(&self) -> impl Iterator<Item = (FrameIndex, PageNumber)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match slot {
            Slot::Occupied(page) => Some((FrameIndex(i), *page)),
            Slot::Empty => None,
        })
    }
}
