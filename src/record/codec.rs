//! Record codec
//!
//! Encoding and decoding of record slots (see the module docs in
//! `record::mod` for the slot layout).

use crate::error::{Result, StoreError};

use super::{FIELD_DELIMITER, LENGTH_WIDTH, PADDING, STATUS_ACTIVE, STATUS_DELETED};

/// A record decoded from its slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    /// Field values in declared order, primary key first
    pub fields: Vec<String>,
    /// The slot's recorded capacity in bytes
    pub capacity: usize,
    /// Whether the slot holds a tombstoned record
    pub deleted: bool,
}

/// Canonical payload size of a field row: the field bytes plus one delimiter
/// per field plus the leading delimiter.
pub fn payload_size<S: AsRef<str>>(fields: &[S]) -> usize {
    fields.iter().map(|f| f.as_ref().len()).sum::<usize>() + fields.len() + 1
}

/// Encode a field row into a full slot of the given capacity.
///
/// The capacity is either the canonical payload size (fresh append) or a
/// reused slot's recorded capacity; in the latter case the payload must fit
/// or encoding fails with `CapacityExceeded`. The returned bytes cover the
/// whole slot: status, capacity field, content, padding, newline.
pub fn encode<S: AsRef<str>>(fields: &[S], capacity: usize) -> Result<Vec<u8>> {
    let payload = payload_size(fields);
    if payload > capacity {
        return Err(StoreError::CapacityExceeded {
            needed: payload,
            capacity,
        });
    }

    let mut slot = Vec::with_capacity(capacity + LENGTH_WIDTH + 3);
    slot.push(STATUS_ACTIVE);
    slot.push(FIELD_DELIMITER as u8);
    slot.extend_from_slice(format!("{:0width$}", capacity, width = LENGTH_WIDTH).as_bytes());
    slot.push(FIELD_DELIMITER as u8);
    for field in fields {
        slot.extend_from_slice(field.as_ref().as_bytes());
        slot.push(FIELD_DELIMITER as u8);
    }
    slot.resize(slot.len() + (capacity - payload), PADDING as u8);
    slot.push(b'\n');

    Ok(slot)
}

/// Decode one slot line (with or without its trailing newline).
///
/// Tombstoned records decode normally and are reported via `deleted` so
/// scans can skip them. An empty line is an error — it means an offset
/// pointed past the end of the file or into a torn slot.
pub fn decode(line: &str) -> Result<DecodedRecord> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    if line.is_empty() {
        return Err(StoreError::Corrupt(
            "empty record line (offset past end of file?)".to_string(),
        ));
    }

    let deleted = match line.as_bytes()[0] {
        STATUS_ACTIVE => false,
        STATUS_DELETED => true,
        other => {
            return Err(StoreError::Corrupt(format!(
                "unknown record status byte {:?}",
                other as char
            )))
        }
    };

    // The body starts with the delimiter, so splitting yields an empty
    // leading element, then the capacity field, then the fields, then
    // whatever follows the final delimiter (empty or padding).
    let body = &line[1..];
    let mut parts: Vec<&str> = body.split(FIELD_DELIMITER).collect();
    if parts.len() < 4 || !parts[0].is_empty() {
        return Err(StoreError::Corrupt(format!(
            "malformed record line: {:?}",
            line
        )));
    }

    let capacity: usize = parts[1].parse().map_err(|_| {
        StoreError::Corrupt(format!("bad capacity field {:?} in record line", parts[1]))
    })?;
    let content_len = body.len() - 1 - parts[1].len();
    if content_len != capacity {
        return Err(StoreError::Corrupt(format!(
            "capacity field says {} bytes but slot content is {}",
            capacity, content_len
        )));
    }

    let tail = parts.pop().unwrap_or_default();
    if !tail.chars().all(|c| c == PADDING) {
        return Err(StoreError::Corrupt(format!(
            "record line does not end at a field delimiter: {:?}",
            line
        )));
    }

    let mut fields: Vec<String> = parts[2..].iter().map(|s| s.to_string()).collect();
    // Strip trailing filler from the last content field as well, in case an
    // in-place rewrite left padding inside the final delimiter.
    if let Some(last) = fields.last_mut() {
        let trimmed = last.trim_end_matches(PADDING).len();
        last.truncate(trimmed);
    }

    Ok(DecodedRecord {
        fields,
        capacity,
        deleted,
    })
}
