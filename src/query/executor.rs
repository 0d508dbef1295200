//! Query executor
//!
//! Plans a parsed query onto the cheapest available lookup path and
//! projects the requested columns:
//!
//! - `WHERE id = ..`          → primary index lookup
//! - `WHERE <secondary> = ..` → secondary index lookup
//! - `WHERE <other> = ..`     → linear scan (unindexed fields have no
//!   faster path)
//! - no WHERE                 → full scan in file order

use crate::engine::Engine;
use crate::error::{Result, StoreError};
use crate::record::LENGTH_WIDTH;
use crate::store::TableStore;

use super::{Filter, Projection, Query, TableName};

/// The rows produced by a query, plus the projected column names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Execute a parsed query against the engine
pub fn execute(engine: &Engine, query: &Query) -> Result<QueryOutput> {
    let store = match query.table {
        TableName::Doctors => engine.doctors(),
        TableName::Appointments => engine.appointments(),
    };
    let schema = store.schema();

    let columns: Vec<usize> = match &query.projection {
        Projection::All => (0..schema.field_count()).collect(),
        Projection::Fields(names) => names
            .iter()
            .map(|name| {
                schema
                    .field_index(name)
                    .ok_or_else(|| StoreError::UnknownField(name.clone()))
            })
            .collect::<Result<_>>()?,
    };

    let rows = match &query.filter {
        None => store.scan()?.collect::<Result<Vec<_>>>()?,
        Some(filter) => filtered_rows(store, filter)?,
    };

    Ok(QueryOutput {
        columns: columns.iter().map(|&i| schema.fields[i].to_string()).collect(),
        rows: rows
            .into_iter()
            .map(|row| columns.iter().map(|&i| row[i].clone()).collect())
            .collect(),
    })
}

fn filtered_rows(store: &TableStore, filter: &Filter) -> Result<Vec<Vec<String>>> {
    let schema = store.schema();
    let field = schema
        .field_index(&filter.field)
        .ok_or_else(|| StoreError::UnknownField(filter.field.clone()))?;
    let value = normalize_value(filter);

    if field == 0 {
        // Primary key: a miss is an empty result, not an error.
        return match store.get(&value) {
            Ok(row) => Ok(vec![row]),
            Err(StoreError::NotFound { .. }) => Ok(Vec::new()),
            Err(e) => Err(e),
        };
    }

    if schema.is_secondary(field) {
        return store.find_by_secondary(&value);
    }

    store.scan_by_field(field, &value)?.collect()
}

/// Queries may spell a single-digit id without its leading zero; pad it to
/// the generated-key minimum width before the lookup.
fn normalize_value(filter: &Filter) -> String {
    if filter.field == "id" && filter.value.len() < LENGTH_WIDTH {
        format!("{:0>width$}", filter.value, width = LENGTH_WIDTH)
    } else {
        filter.value.clone()
    }
}
