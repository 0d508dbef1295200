//! Query parser
//!
//! Parses `SELECT <fields> FROM <table> [WHERE <field> = '<value>']`.
//! Keywords, table and field names are case-insensitive; the condition
//! value keeps its case. A trailing semicolon is tolerated.

use crate::error::{Result, StoreError};

/// Which table a query targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableName {
    Doctors,
    Appointments,
}

/// Which columns to present
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// `SELECT *`
    All,
    /// An explicit comma-separated field list
    Fields(Vec<String>),
}

/// A `WHERE field = 'value'` condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub value: String,
}

/// A parsed query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub projection: Projection,
    pub table: TableName,
    pub filter: Option<Filter>,
}

/// Parse a query string
pub fn parse(input: &str) -> Result<Query> {
    let trimmed = input.trim().trim_end_matches(';').trim_end();
    // ASCII lowering keeps byte positions aligned with `trimmed`, so the
    // keyword offsets found here can slice the original text.
    let lower = trimmed.to_ascii_lowercase();

    if !lower.starts_with("select") {
        return Err(StoreError::Query(
            "expected SELECT <fields> FROM <table> [WHERE <field> = '<value>']".to_string(),
        ));
    }

    let from_pos = lower
        .find(" from ")
        .ok_or_else(|| StoreError::Query("missing FROM clause".to_string()))?;
    let where_pos = lower.find(" where ");

    let projection = parse_projection(&trimmed["select".len()..from_pos])?;

    let table_end = where_pos.unwrap_or(trimmed.len());
    let table = match lower[from_pos + " from ".len()..table_end].trim() {
        "doctors" => TableName::Doctors,
        "appointments" => TableName::Appointments,
        other => {
            return Err(StoreError::Query(format!(
                "unknown table {:?} (only 'doctors' and 'appointments' are supported)",
                other
            )))
        }
    };

    let filter = match where_pos {
        None => None,
        Some(pos) => Some(parse_condition(&trimmed[pos + " where ".len()..])?),
    };

    Ok(Query {
        projection,
        table,
        filter,
    })
}

fn parse_projection(text: &str) -> Result<Projection> {
    let text = text.trim();
    if text.is_empty() {
        return Err(StoreError::Query("empty field list".to_string()));
    }
    if text == "*" {
        return Ok(Projection::All);
    }

    let fields: Vec<String> = text
        .split(',')
        .map(|f| f.trim().to_ascii_lowercase())
        .filter(|f| !f.is_empty())
        .collect();
    if fields.is_empty() {
        return Err(StoreError::Query("empty field list".to_string()));
    }
    Ok(Projection::Fields(fields))
}

fn parse_condition(text: &str) -> Result<Filter> {
    let (field, value) = text.split_once('=').ok_or_else(|| {
        StoreError::Query(format!("condition {:?} is not of the form field = 'value'", text))
    })?;

    let field = field.trim().to_ascii_lowercase();
    if field.is_empty() {
        return Err(StoreError::Query("empty condition field".to_string()));
    }

    let value = value.trim();
    let value = value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .unwrap_or(value);
    if value.is_empty() {
        return Err(StoreError::Query("empty condition value".to_string()));
    }

    Ok(Filter {
        field,
        value: value.to_string(),
    })
}
