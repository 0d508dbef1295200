//! Lazy scans over a record file
//!
//! Iterates slots in file order, decoding as it goes and skipping
//! tombstones. Scans hold their own reader, so restarting a scan is just
//! asking the table store for a new one.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, StoreError};
use crate::record::{self, TableSchema};

/// Iterator over the active records of one table, in file order
#[derive(Debug)]
pub struct Scan {
    reader: BufReader<File>,
    schema: &'static TableSchema,
    line: String,
}

impl Scan {
    pub(crate) fn open(path: &Path, schema: &'static TableSchema) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            schema,
            line: String::new(),
        })
    }
}

impl Iterator for Scan {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }

            let decoded = match record::decode(&self.line) {
                Ok(decoded) => decoded,
                Err(e) => return Some(Err(e)),
            };
            if decoded.deleted {
                continue;
            }
            if decoded.fields.len() != self.schema.field_count() {
                return Some(Err(StoreError::Corrupt(format!(
                    "{} record has {} fields, expected {}",
                    self.schema.name,
                    decoded.fields.len(),
                    self.schema.field_count()
                ))));
            }
            return Some(Ok(decoded.fields));
        }
    }
}

/// A [`Scan`] filtered on one field's value
#[derive(Debug)]
pub struct ScanBy {
    inner: Scan,
    field: usize,
    value: String,
}

impl ScanBy {
    pub(crate) fn new(inner: Scan, field: usize, value: &str) -> Self {
        Self {
            inner,
            field,
            value: value.to_string(),
        }
    }
}

impl Iterator for ScanBy {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(fields) if fields[self.field] == self.value => return Some(Ok(fields)),
                Ok(_) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
