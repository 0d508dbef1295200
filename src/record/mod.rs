//! Record Module
//!
//! Textual encoding of variable-length records into fixed-capacity slots.
//!
//! ## Slot Format
//! ```text
//! ┌────────┬───┬──────────┬──────────────────────────────────┬────┐
//! │ Status │'|'│ Capacity │ Content                          │'\n'│
//! │ 1 byte │   │ 2+ dec   │ exactly `capacity` bytes         │    │
//! └────────┴───┴──────────┴──────────────────────────────────┴────┘
//! ```
//!
//! - Status: `' '` = active, `'*'` = tombstoned (deleted in place).
//! - Capacity: zero-padded decimal, minimum 2 digits, counting every byte
//!   between the capacity field and the trailing newline. The value is fixed
//!   for the life of the slot — a record rewritten into a reused slot keeps
//!   the slot's original capacity.
//! - Content: `|f1|f2|...|fn|` — the fields joined by the delimiter, with the
//!   leading and trailing delimiter included — followed by `'-'` filler when
//!   the live payload is shorter than the capacity.
//!
//! Example (a 20-byte payload written fresh, then an 18-byte payload
//! written into the same slot after delete + reuse):
//! ```text
//!  |20|01|Alice|1 Main St|
//!  |20|02|Bob|2 Oak Ave|--
//! ```

mod codec;
mod schema;

pub use codec::{decode, encode, payload_size, DecodedRecord};
pub use schema::TableSchema;

// =============================================================================
// Shared Constants (used by codec, store, scans)
// =============================================================================

/// Status byte marking an active record
pub const STATUS_ACTIVE: u8 = b' ';

/// Status byte marking a tombstoned record awaiting slot reuse
pub const STATUS_DELETED: u8 = b'*';

/// Field delimiter within a record slot and in the index mirror files
pub const FIELD_DELIMITER: char = '|';

/// Filler character for the unused tail of a reused slot
pub const PADDING: char = '-';

/// Minimum number of digits in the capacity field (and in generated keys)
pub const LENGTH_WIDTH: usize = 2;
