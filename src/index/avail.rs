//! Free-Space List
//!
//! Tracks reclaimed record slots by offset and size and serves best-fit
//! allocation requests.
//!
//! ## Responsibilities
//! - Keep free slots ordered ascending by size (insertion sort on insert)
//! - Best fit = first slot with `size >= requested` (smallest sufficient)
//! - Whole-file persistence after every mutation
//!
//! Adjacent free blocks are never coalesced; fragmentation accumulates.
//! That is a documented property of the format, not something this list
//! tries to repair.
//!
//! ## File Format
//! `offset|size` lines, ascending by size.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Result, StoreError};
use crate::record::FIELD_DELIMITER;

/// One reclaimed slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeSlot {
    /// Byte offset of the slot's status byte in the record file
    pub offset: u64,
    /// The slot's recorded capacity in bytes
    pub size: usize,
}

/// The free-space list for one table's record file
#[derive(Debug)]
pub struct AvailList {
    /// Mirror file path
    path: PathBuf,
    /// Free slots ordered ascending by size
    slots: Vec<FreeSlot>,
}

impl AvailList {
    /// Open the list, rehydrating from the mirror file if it exists
    pub fn open(path: PathBuf) -> Result<Self> {
        let mut list = Self {
            path,
            slots: Vec::new(),
        };
        list.load()?;
        Ok(list)
    }

    /// Insert a slot at its size-ordered position and persist.
    ///
    /// The new slot goes before the first entry of equal or larger size.
    pub fn insert(&mut self, slot: FreeSlot) -> Result<()> {
        let position = self
            .slots
            .iter()
            .position(|s| s.size >= slot.size)
            .unwrap_or(self.slots.len());
        self.slots.insert(position, slot);
        self.persist()
    }

    /// Remove a specific slot (by offset + size identity) and persist.
    ///
    /// Callers only ever remove a slot just returned by `best_fit`; an
    /// absent slot is ignored.
    pub fn remove(&mut self, slot: FreeSlot) -> Result<()> {
        match self.slots.iter().position(|s| *s == slot) {
            Some(i) => {
                self.slots.remove(i);
                self.persist()
            }
            None => {
                debug!(offset = slot.offset, size = slot.size, "free slot already absent");
                Ok(())
            }
        }
    }

    /// The smallest free slot with `size >= requested`, if any.
    ///
    /// Does not remove the slot — the caller removes it once the slot has
    /// actually been consumed.
    pub fn best_fit(&self, requested: usize) -> Option<FreeSlot> {
        self.slots.iter().copied().find(|s| s.size >= requested)
    }

    /// Number of free slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The ordered slots (for testing and debugging)
    pub fn slots(&self) -> &[FreeSlot] {
        &self.slots
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Rehydrate from the mirror file; a missing file means an empty list
    fn load(&mut self) -> Result<()> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        for line in contents.lines() {
            if line.is_empty() {
                continue;
            }
            let (offset, size) = line.split_once(FIELD_DELIMITER).ok_or_else(|| {
                StoreError::Corrupt(format!("malformed avail list line: {:?}", line))
            })?;
            let slot = FreeSlot {
                offset: offset.parse().map_err(|_| {
                    StoreError::Corrupt(format!("bad offset in avail list line: {:?}", line))
                })?,
                size: size.parse().map_err(|_| {
                    StoreError::Corrupt(format!("bad size in avail list line: {:?}", line))
                })?,
            };
            let position = self
                .slots
                .iter()
                .position(|s| s.size >= slot.size)
                .unwrap_or(self.slots.len());
            self.slots.insert(position, slot);
        }

        debug!(slots = self.slots.len(), "avail list loaded");
        Ok(())
    }

    /// Rewrite the mirror file from the in-memory state
    fn persist(&self) -> Result<()> {
        let mut contents = String::new();
        for slot in &self.slots {
            contents.push_str(&slot.offset.to_string());
            contents.push(FIELD_DELIMITER);
            contents.push_str(&slot.size.to_string());
            contents.push('\n');
        }
        fs::write(&self.path, contents)?;
        Ok(())
    }
}
