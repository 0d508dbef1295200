//! Secondary Index
//!
//! Maps a secondary key to the ordered set of primary keys sharing it, via
//! singly linked lists stored in an index-based arena with a free-slot pool.
//! New primary keys are appended at the tail, so a list enumerates in
//! insertion order. Freed nodes are tombstoned and recycled before the
//! arena grows.
//!
//! Removing the last node of a key's list leaves the key mapped to the
//! empty sentinel rather than dropping it from the map.
//!
//! ## File Formats (two coupled mirrors)
//! ```text
//! secondary index file          label/slot file (node arena)
//! ┌───────────────────┐         ┌─────────────────────────────┐
//! │ secondaryKey|head │         │ slot|primaryKey,next        │
//! │ Alice|00          │         │ 00|01,02                    │
//! │ Bob|-1            │         │ 01|##,##      (free slot)   │
//! └───────────────────┘         │ 02|03,-1      (end of list) │
//!                               └─────────────────────────────┘
//! ```
//! Slot numbers and pointers are zero-padded to two digits; `-1` is the
//! end-of-list / empty-head sentinel and `##` marks a free arena slot.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Result, StoreError};
use crate::record::{FIELD_DELIMITER, LENGTH_WIDTH};

/// End-of-list / empty-head sentinel in the mirror files
const NIL: &str = "-1";

/// Free-slot sentinel in the label file
const FREE: &str = "##";

/// One arena slot
#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    /// Tombstoned slot available for reuse
    Free,
    /// Live node in some secondary key's list
    Used {
        primary: String,
        next: Option<usize>,
    },
}

/// The secondary index for one table
#[derive(Debug)]
pub struct SecondaryIndex {
    /// Mirror file: secondary key → head slot
    index_path: PathBuf,
    /// Mirror file: the node arena
    label_path: PathBuf,
    /// Owning table name (for error reporting)
    table: &'static str,
    /// Secondary key → head of its list (`None` = empty list, key retained)
    heads: BTreeMap<String, Option<usize>>,
    /// Node arena; slot numbers are indices into this vector
    arena: Vec<Node>,
}

impl SecondaryIndex {
    /// Open the index, rehydrating both mirror files if they exist
    pub fn open(index_path: PathBuf, label_path: PathBuf, table: &'static str) -> Result<Self> {
        let mut index = Self {
            index_path,
            label_path,
            table,
            heads: BTreeMap::new(),
            arena: Vec::new(),
        };
        index.load()?;
        Ok(index)
    }

    /// Link a primary key under a secondary key.
    ///
    /// An unseen (or emptied) secondary key gets the new node as its list
    /// head; otherwise the node is appended at the tail of the existing
    /// list. Persists both mirrors.
    pub fn add_key(&mut self, secondary: &str, primary: &str) -> Result<()> {
        let slot = self.alloc();

        match self.heads.get(secondary).copied() {
            None | Some(None) => {
                self.heads.insert(secondary.to_string(), Some(slot));
            }
            Some(Some(head)) => {
                let tail = self.tail_of(head)?;
                match &mut self.arena[tail] {
                    Node::Used { next, .. } => *next = Some(slot),
                    Node::Free => unreachable!("tail_of only returns used slots"),
                }
            }
        }

        self.arena[slot] = Node::Used {
            primary: primary.to_string(),
            next: None,
        };
        self.persist()
    }

    /// Unlink the first node holding `primary` from `secondary`'s list and
    /// return its slot to the free pool. Persists both mirrors.
    ///
    /// Fails with `NotFound` if the secondary key is unseen or the primary
    /// key is not in its list.
    pub fn remove_key(&mut self, secondary: &str, primary: &str) -> Result<()> {
        let head = match self.heads.get(secondary).copied() {
            Some(head) => head,
            None => {
                return Err(StoreError::NotFound {
                    table: self.table,
                    key: secondary.to_string(),
                })
            }
        };

        let mut prev: Option<usize> = None;
        let mut current = head;
        while let Some(slot) = current {
            let (node_primary, node_next) = self.used(slot)?;
            if node_primary == primary {
                match prev {
                    // Removing the head: the key keeps its map entry even
                    // when the list becomes empty.
                    None => {
                        self.heads.insert(secondary.to_string(), node_next);
                    }
                    Some(prev_slot) => match &mut self.arena[prev_slot] {
                        Node::Used { next, .. } => *next = node_next,
                        Node::Free => unreachable!("walked slots are used"),
                    },
                }
                self.arena[slot] = Node::Free;
                return self.persist();
            }
            prev = Some(slot);
            current = node_next;
        }

        Err(StoreError::NotFound {
            table: self.table,
            key: primary.to_string(),
        })
    }

    /// All primary keys under a secondary key, in insertion order.
    /// An unseen key yields an empty list.
    pub fn lookup_all(&self, secondary: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut current = match self.heads.get(secondary) {
            Some(head) => *head,
            None => return Ok(keys),
        };
        while let Some(slot) = current {
            let (primary, next) = self.used(slot)?;
            keys.push(primary.to_string());
            current = next;
        }
        Ok(keys)
    }

    /// Number of live nodes (for testing and debugging)
    pub fn live_nodes(&self) -> usize {
        self.arena
            .iter()
            .filter(|n| matches!(n, Node::Used { .. }))
            .count()
    }

    /// Arena size including free slots (for testing and debugging)
    pub fn arena_len(&self) -> usize {
        self.arena.len()
    }

    // =========================================================================
    // Arena Helpers
    // =========================================================================

    /// First free arena slot, growing the arena if the pool is empty
    fn alloc(&mut self) -> usize {
        match self.arena.iter().position(|n| *n == Node::Free) {
            Some(slot) => slot,
            None => {
                self.arena.push(Node::Free);
                self.arena.len() - 1
            }
        }
    }

    /// Read a slot expected to be in use
    fn used(&self, slot: usize) -> Result<(&str, Option<usize>)> {
        match self.arena.get(slot) {
            Some(Node::Used { primary, next }) => Ok((primary, *next)),
            Some(Node::Free) => Err(StoreError::Corrupt(format!(
                "secondary index list points at free slot {}",
                slot
            ))),
            None => Err(StoreError::Corrupt(format!(
                "secondary index list points outside the arena (slot {})",
                slot
            ))),
        }
    }

    /// Walk from `head` to the last node of its list
    fn tail_of(&self, head: usize) -> Result<usize> {
        let mut slot = head;
        loop {
            match self.used(slot)? {
                (_, Some(next)) => slot = next,
                (_, None) => return Ok(slot),
            }
        }
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Format a slot pointer for the mirror files
    fn format_ptr(ptr: Option<usize>) -> String {
        match ptr {
            None => NIL.to_string(),
            Some(slot) => format!("{:0width$}", slot, width = LENGTH_WIDTH),
        }
    }

    /// Parse a slot pointer from the mirror files
    fn parse_ptr(text: &str) -> Result<Option<usize>> {
        if text == NIL {
            return Ok(None);
        }
        text.parse()
            .map(Some)
            .map_err(|_| StoreError::Corrupt(format!("bad slot pointer {:?}", text)))
    }

    /// Rehydrate from both mirror files; missing files mean an empty index
    fn load(&mut self) -> Result<()> {
        let index_contents = match fs::read_to_string(&self.index_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        for line in index_contents.lines() {
            if line.is_empty() {
                continue;
            }
            let (key, head) = line.split_once(FIELD_DELIMITER).ok_or_else(|| {
                StoreError::Corrupt(format!("malformed secondary index line: {:?}", line))
            })?;
            self.heads.insert(key.to_string(), Self::parse_ptr(head)?);
        }

        let label_contents = match fs::read_to_string(&self.label_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        for line in label_contents.lines() {
            if line.is_empty() {
                continue;
            }
            // Slot numbers in the file are positional; nodes load in order.
            let (_, node) = line.split_once(FIELD_DELIMITER).ok_or_else(|| {
                StoreError::Corrupt(format!("malformed label list line: {:?}", line))
            })?;
            let (primary, next) = node.split_once(',').ok_or_else(|| {
                StoreError::Corrupt(format!("malformed label list node: {:?}", line))
            })?;
            if primary == FREE {
                self.arena.push(Node::Free);
            } else {
                self.arena.push(Node::Used {
                    primary: primary.to_string(),
                    next: Self::parse_ptr(next)?,
                });
            }
        }

        debug!(
            table = self.table,
            keys = self.heads.len(),
            nodes = self.arena.len(),
            "secondary index loaded"
        );
        Ok(())
    }

    /// Rewrite both mirror files from the in-memory state
    fn persist(&self) -> Result<()> {
        let mut index_contents = String::new();
        for (key, head) in &self.heads {
            index_contents.push_str(key);
            index_contents.push(FIELD_DELIMITER);
            index_contents.push_str(&Self::format_ptr(*head));
            index_contents.push('\n');
        }
        fs::write(&self.index_path, index_contents)?;

        let mut label_contents = String::new();
        for (slot, node) in self.arena.iter().enumerate() {
            label_contents.push_str(&Self::format_ptr(Some(slot)));
            label_contents.push(FIELD_DELIMITER);
            match node {
                Node::Free => {
                    label_contents.push_str(FREE);
                    label_contents.push(',');
                    label_contents.push_str(FREE);
                }
                Node::Used { primary, next } => {
                    label_contents.push_str(primary);
                    label_contents.push(',');
                    label_contents.push_str(&Self::format_ptr(*next));
                }
            }
            label_contents.push('\n');
        }
        fs::write(&self.label_path, label_contents)?;
        Ok(())
    }
}
