//! Table schema
//!
//! Declares the shape of a record kind: field names in serialized order
//! (primary key first) and which field, if any, carries the multi-valued
//! secondary index.

/// Static description of one table's record layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    /// Table name; also the stem of the table's on-disk file family
    pub name: &'static str,

    /// Declared field names, primary key first
    pub fields: &'static [&'static str],

    /// Index into `fields` of the secondary key, if the table has one
    pub secondary: Option<usize>,
}

impl TableSchema {
    /// Number of declared fields (including the primary key)
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Resolve a field name to its index
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| *f == name)
    }

    /// Whether the given field index is the table's secondary key
    pub fn is_secondary(&self, index: usize) -> bool {
        self.secondary == Some(index)
    }
}
