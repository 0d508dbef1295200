//! Primary Index
//!
//! Maps a primary key to the byte offset of its record slot.
//!
//! ## Responsibilities
//! - O(log n) key → offset lookup (binary search over a sorted array)
//! - Monotonic key generation (max + 1, never recycled)
//! - Whole-file persistence after every mutation
//!
//! ## File Format
//! `key|offset` lines, sorted by key.

use std::cmp::Ordering;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Result, StoreError};
use crate::record::{FIELD_DELIMITER, LENGTH_WIDTH};

/// One (primary key, offset) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub key: String,
    pub offset: u64,
}

/// Key ordering: by length, then lexicographic.
///
/// For zero-padded decimal keys this coincides with numeric order, so the
/// sorted invariant (and binary search) survives keys growing past the
/// 2-digit minimum width.
pub fn key_cmp(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// The primary index for one table
pub struct PrimaryIndex {
    /// Mirror file path
    path: PathBuf,
    /// Owning table name (for error reporting)
    table: &'static str,
    /// Entries sorted by `key_cmp`
    entries: Vec<IndexEntry>,
}

impl PrimaryIndex {
    /// Open the index, rehydrating from the mirror file if it exists
    pub fn open(path: PathBuf, table: &'static str) -> Result<Self> {
        let mut index = Self {
            path,
            table,
            entries: Vec::new(),
        };
        index.load()?;
        Ok(index)
    }

    /// Generate the next primary key: `"01"` for an empty table, otherwise
    /// the numeric maximum plus one, zero-padded to at least two digits.
    /// Keys are never recycled, even across deletes.
    pub fn new_id(&self) -> String {
        match self.entries.last().and_then(|e| e.key.parse::<u64>().ok()) {
            None => "01".to_string(),
            Some(max) => format!("{:0width$}", max + 1, width = LENGTH_WIDTH),
        }
    }

    /// Binary search for a key's record offset
    pub fn lookup(&self, key: &str) -> Option<u64> {
        self.entries
            .binary_search_by(|entry| key_cmp(&entry.key, key))
            .ok()
            .map(|i| self.entries[i].offset)
    }

    /// Whether the key is present
    pub fn contains(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Add an entry, restore the sorted invariant, persist
    pub fn add(&mut self, key: &str, offset: u64) -> Result<()> {
        self.entries.push(IndexEntry {
            key: key.to_string(),
            offset,
        });
        self.entries.sort_by(|a, b| key_cmp(&a.key, &b.key));
        self.persist()
    }

    /// Remove an entry by key; `NotFound` if absent
    pub fn remove(&mut self, key: &str) -> Result<()> {
        match self
            .entries
            .binary_search_by(|entry| key_cmp(&entry.key, key))
        {
            Ok(i) => {
                self.entries.remove(i);
                self.persist()
            }
            Err(_) => Err(StoreError::NotFound {
                table: self.table,
                key: key.to_string(),
            }),
        }
    }

    /// Number of indexed keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The sorted entries (for testing and debugging)
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Rehydrate from the mirror file; a missing file means an empty index
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
            let (key, offset) = line.split_once(FIELD_DELIMITER).ok_or_else(|| {
                StoreError::Corrupt(format!("malformed primary index line: {:?}", line))
            })?;
            let offset: u64 = offset.parse().map_err(|_| {
                StoreError::Corrupt(format!("bad offset in primary index line: {:?}", line))
            })?;
            self.entries.push(IndexEntry {
                key: key.to_string(),
                offset,
            });
        }

        // The mirror is written sorted, but re-sorting keeps the invariant
        // even if the file was edited by hand.
        self.entries.sort_by(|a, b| key_cmp(&a.key, &b.key));
        debug!(table = self.table, entries = self.entries.len(), "primary index loaded");
        Ok(())
    }

    /// Rewrite the mirror file from the in-memory state
    fn persist(&self) -> Result<()> {
        let mut contents = String::new();
        for entry in &self.entries {
            contents.push_str(&entry.key);
            contents.push(FIELD_DELIMITER);
            contents.push_str(&entry.offset.to_string());
            contents.push('\n');
        }
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl std::fmt::Debug for PrimaryIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimaryIndex")
            .field("table", &self.table)
            .field("entries", &self.entries)
            .finish()
    }
}
