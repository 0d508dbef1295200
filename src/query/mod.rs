//! Query Module
//!
//! A toy SQL-like read layer over the engine:
//!
//! ```text
//! SELECT <fields|*> FROM <doctors|appointments> [WHERE <field> = '<value>'];
//! ```
//!
//! The parser produces a [`Query`]; the executor plans it onto the engine's
//! lookup paths — primary index for `id`, secondary index for the table's
//! secondary field, a linear scan for everything else — and projects the
//! requested columns. Strictly a consumer of the public table operations;
//! no storage logic lives here.

mod executor;
mod parser;

pub use executor::{execute, QueryOutput};
pub use parser::{parse, Filter, Projection, Query, TableName};
