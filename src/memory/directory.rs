use std::collections::HashMap;

use crate::error::Result;
use crate::internal_err;

use super::frame::FrameIndex;
use super::PageNumber;

/// A page directory entry. Entries are kept per frame, a stale entry stays
/// around with `valid` unset until the frame is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub page: PageNumber,
    pub frame: FrameIndex,
    pub referenced: bool,
    pub valid: bool,
}

/// The page directory keeps track of which virtual page lives in which
/// physical frame.
///
/// Entries are indexed by frame, so the latest install into a frame is
/// always the authoritative mapping for it. Resident pages are additionally
/// indexed by page number for hit detection.
#[derive(Debug, Clone, PartialEq)]
pub struct PageDirectory {
    entries: Vec<Option<DirectoryEntry>>,
    resident: HashMap<PageNumber, FrameIndex>,
}

impl PageDirectory {
    pub fn new(capacity: usize) -> Self {
        PageDirectory { entries: vec![None; capacity], resident: HashMap::with_capacity(capacity) }
    }

    /// Frame holding the given page, if the page is resident.
    pub fn lookup(&self, page: PageNumber) -> Option<FrameIndex> {
        self.resident.get(&page).copied()
    }

    /// Set the referenced bit of the valid entry mapped to `frame`.
    pub fn reference(&mut self, frame: FrameIndex) {
        if let Some(entry) = self.entries[frame.get()].as_mut().filter(|e| e.valid) {
            entry.referenced = true;
        }
    }

    /// Invalidate the valid entry mapped to `frame`, if any, and return the
    /// page that was resident there.
    pub fn invalidate(&mut self, frame: FrameIndex) -> Option<PageNumber> {
        let entry = self.entries[frame.get()].as_mut().filter(|e| e.valid)?;
        entry.valid = false;
        self.resident.remove(&entry.page);
        Some(entry.page)
    }

    /// Map `page` into `frame`. The previous owner of the frame must have
    /// been invalidated before.
    pub fn install(&mut self, frame: FrameIndex, page: PageNumber) -> Result<()> {
        let slot = &mut self.entries[frame.get()];
        if let Some(prev) = slot.filter(|e| e.valid) {
            return Err(internal_err!(
                "frame {} still maps page {}, invalidate it before installing page {}",
                frame,
                prev.page,
                page
            ));
        }
        if let Some(other) = self.resident.get(&page) {
            return Err(internal_err!("page {} is already resident in frame {}", page, other));
        }
        *slot = Some(DirectoryEntry { page, frame, referenced: true, valid: true });
        self.resident.insert(page, frame);
        Ok(())
    }

    /// Entry of the given frame, stale or not.
    pub fn entry(&self, frame: FrameIndex) -> Option<&DirectoryEntry> {
        self.entries[frame.get()].as_ref()
    }

    /// Valid entries in frame order.
    pub fn entries(&self) -> impl Iterator<Item = &DirectoryEntry> + '_ {
        self.entries.iter().flatten().filter(|e| e.valid)
    }

    /// Number of resident pages.
    pub fn len(&self) -> usize {
        self.resident.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resident.is_empty()
    }
}
