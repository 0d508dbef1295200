//! Index Module
//!
//! The three in-memory structures backing a table store, each mirrored to a
//! flat file that is rewritten wholesale after every mutation and rehydrated
//! at startup:
//!
//! - [`PrimaryIndex`] — sorted (key, offset) array, binary-searchable
//! - [`SecondaryIndex`] — secondary key → linked list of primary keys
//! - [`AvailList`] — reclaimed slots ordered by size, best-fit allocation
//!
//! The in-memory state is the single source of truth for offsets; the
//! on-disk mirrors exist only for rehydration.

mod avail;
mod primary;
mod secondary;

pub use avail::{AvailList, FreeSlot};
pub use primary::{key_cmp, IndexEntry, PrimaryIndex};
pub use secondary::SecondaryIndex;
