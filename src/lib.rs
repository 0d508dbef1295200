//! # Flatstore
//!
//! A record-oriented storage engine over flat files:
//! - Variable-length textual records in fixed-capacity slots
//! - Primary key index (sorted array, binary search) for offset lookup
//! - Multi-valued secondary index (arena-backed linked lists)
//! - Free-space list with best-fit slot reuse
//!
//! Two logical tables — doctors and appointments — are instantiated from a
//! single generic table store; appointments carry a foreign-key reference
//! into the doctor table.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CLI / Query Layer                       │
//! │              (menu loop, SELECT..FROM..WHERE)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Engine                               │
//! │        (doctors + appointments, FK enforcement)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     TableStore                              │
//! │            (one per table, generic over schema)             │
//! └──────┬──────────────┬──────────────┬───────────────┬────────┘
//!        │              │              │               │
//!        ▼              ▼              ▼               ▼
//! ┌────────────┐ ┌────────────┐ ┌────────────┐ ┌─────────────┐
//! │  Primary   │ │ Secondary  │ │   Avail    │ │   Record    │
//! │   Index    │ │   Index    │ │    List    │ │    Codec    │
//! └────────────┘ └────────────┘ └────────────┘ └─────────────┘
//! ```
//!
//! All index and free-list state is kept resident in memory and mirrored to
//! flat files that are rewritten wholesale after every mutation; the record
//! file itself is only ever patched in place (status byte, slot content).
//! Single-process, single-writer, synchronous — a second writer is outside
//! the design.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod index;
pub mod store;
pub mod records;
pub mod engine;
pub mod query;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::Config;
pub use engine::Engine;
pub use error::{Result, StoreError};
pub use records::{Appointment, Doctor};
pub use store::{TableStore, UpdateOutcome};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of flatstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
