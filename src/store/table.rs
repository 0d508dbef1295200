//! Table Store
//!
//! Composes the record codec, primary index, secondary index, and
//! free-space list into the per-table storage engine.
//!
//! ## Responsibilities
//! - Assign primary keys and place records (slot reuse or tail append)
//! - Tombstone + reclaim slots on delete
//! - In-place update when the new payload fits the slot, delete + re-add
//!   (under a NEW primary key) when it does not
//! - Resolve id and secondary-key lookups to decoded records
//!
//! Every operation opens the record file for the duration of that call
//! only; no file handle outlives a public method.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Result, StoreError};
use crate::index::{AvailList, FreeSlot, PrimaryIndex, SecondaryIndex};
use crate::record::{self, DecodedRecord, TableSchema};

use super::{Scan, ScanBy};

/// How an update was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The new payload fit the slot; the record kept its offset and id
    InPlace,
    /// The record outgrew its slot and was deleted and re-added. The
    /// original primary key is gone — the record now lives under `new_id`.
    Reinserted { new_id: String },
}

/// The storage engine for one table
#[derive(Debug)]
pub struct TableStore {
    /// Declared record shape
    schema: &'static TableSchema,
    /// The record file
    record_path: PathBuf,
    /// Primary key → slot offset
    primary: PrimaryIndex,
    /// Secondary key → primary keys, when the schema declares one
    secondary: Option<SecondaryIndex>,
    /// Reclaimed slots for reuse
    avail: AvailList,
}

impl TableStore {
    /// Open or create a table's file family under `data_dir`
    pub fn open(data_dir: &Path, schema: &'static TableSchema) -> Result<Self> {
        let record_path = data_dir.join(format!("{}.rec", schema.name));

        // Touch the record file so per-operation opens cannot race creation
        OpenOptions::new()
            .append(true)
            .create(true)
            .open(&record_path)?;

        let primary = PrimaryIndex::open(data_dir.join(format!("{}.pk", schema.name)), schema.name)?;
        let secondary = match schema.secondary {
            Some(_) => Some(SecondaryIndex::open(
                data_dir.join(format!("{}.sk", schema.name)),
                data_dir.join(format!("{}.labels", schema.name)),
                schema.name,
            )?),
            None => None,
        };
        let avail = AvailList::open(data_dir.join(format!("{}.avail", schema.name)))?;

        Ok(Self {
            schema,
            record_path,
            primary,
            secondary,
            avail,
        })
    }

    /// Add a record from its payload fields (everything but the id, in
    /// declared order) and return the assigned primary key.
    ///
    /// Placement:
    /// 1. Assign the next primary key
    /// 2. Ask the free-space list for a best-fit slot
    /// 3. On a hit, rewrite that slot (the payload padded out to the slot's
    ///    recorded capacity) and remove it from the list
    /// 4. On a miss, append a fresh slot sized exactly to the payload
    /// 5. Update the primary and secondary indexes
    pub fn add(&mut self, payload: &[&str]) -> Result<String> {
        debug_assert_eq!(payload.len(), self.schema.field_count() - 1);

        let id = self.primary.new_id();
        let mut fields: Vec<&str> = Vec::with_capacity(payload.len() + 1);
        fields.push(&id);
        fields.extend_from_slice(payload);
        let payload_len = record::payload_size(&fields);

        let mut file = self.open_record_file()?;
        let (offset, reused) = match self.avail.best_fit(payload_len) {
            Some(slot) => {
                let bytes = record::encode(&fields, slot.size)?;
                file.seek(SeekFrom::Start(slot.offset))?;
                file.write_all(&bytes)?;
                self.avail.remove(slot)?;
                (slot.offset, true)
            }
            None => {
                let bytes = record::encode(&fields, payload_len)?;
                let offset = file.seek(SeekFrom::End(0))?;
                file.write_all(&bytes)?;
                (offset, false)
            }
        };
        drop(file);

        self.primary.add(&id, offset)?;
        if let Some(sec_field) = self.schema.secondary {
            if let Some(secondary) = self.secondary.as_mut() {
                secondary.add_key(fields[sec_field], &id)?;
            }
        }

        info!(
            table = self.schema.name,
            id = %id,
            offset,
            reused,
            "record added"
        );
        Ok(id)
    }

    /// Decode the record stored under `id`
    pub fn get(&self, id: &str) -> Result<Vec<String>> {
        let offset = self.offset_of(id)?;
        let decoded = self.read_at(offset)?;
        if decoded.deleted {
            return Err(self.not_found(id));
        }
        Ok(decoded.fields)
    }

    /// Replace one payload field of the record stored under `id`.
    ///
    /// When the new payload still fits the slot's recorded capacity the
    /// record is rewritten in place (secondary index membership adjusted if
    /// the changed field is the secondary key). When it does not fit, the
    /// record is deleted and re-added — under a new primary key, which the
    /// returned outcome reports.
    pub fn update_field(&mut self, id: &str, field: usize, value: &str) -> Result<UpdateOutcome> {
        if field == 0 || field >= self.schema.field_count() {
            return Err(StoreError::UnknownField(format!(
                "{} field #{}",
                self.schema.name, field
            )));
        }

        let offset = self.offset_of(id)?;
        let decoded = self.read_at(offset)?;
        if decoded.deleted {
            return Err(self.not_found(id));
        }

        let mut fields = decoded.fields;
        let old_value = std::mem::replace(&mut fields[field], value.to_string());
        let new_size = record::payload_size(&fields);

        if new_size <= decoded.capacity {
            if self.schema.is_secondary(field) {
                if let Some(secondary) = self.secondary.as_mut() {
                    secondary.remove_key(&old_value, id)?;
                    secondary.add_key(value, id)?;
                }
            }

            let bytes = record::encode(&fields, decoded.capacity)?;
            let mut file = self.open_record_file()?;
            file.seek(SeekFrom::Start(offset))?;
            file.write_all(&bytes)?;

            info!(
                table = self.schema.name,
                id = %id,
                offset,
                "record updated in place"
            );
            Ok(UpdateOutcome::InPlace)
        } else {
            // The record outgrew its slot: tombstone + free it, then add
            // the new payload as a fresh record. Identity is NOT preserved.
            self.delete(id)?;
            let payload: Vec<&str> = fields[1..].iter().map(String::as_str).collect();
            let new_id = self.add(&payload)?;

            info!(
                table = self.schema.name,
                old_id = %id,
                new_id = %new_id,
                "record outgrew its slot and was reinserted"
            );
            Ok(UpdateOutcome::Reinserted { new_id })
        }
    }

    /// Tombstone the record stored under `id`, reclaim its slot, and drop
    /// its index entries
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let offset = self.offset_of(id)?;
        let decoded = self.read_at(offset)?;

        {
            let mut file = self.open_record_file()?;
            file.seek(SeekFrom::Start(offset))?;
            file.write_all(&[record::STATUS_DELETED])?;
        }

        self.avail.insert(FreeSlot {
            offset,
            size: decoded.capacity,
        })?;
        self.primary.remove(id)?;
        if let Some(sec_field) = self.schema.secondary {
            if let Some(secondary) = self.secondary.as_mut() {
                secondary.remove_key(&decoded.fields[sec_field], id)?;
            }
        }

        info!(
            table = self.schema.name,
            id = %id,
            offset,
            capacity = decoded.capacity,
            "record deleted"
        );
        Ok(())
    }

    /// All records sharing a secondary key value, in insertion order.
    /// Empty for an unseen value or for a table without a secondary index.
    pub fn find_by_secondary(&self, value: &str) -> Result<Vec<Vec<String>>> {
        let secondary = match self.secondary.as_ref() {
            Some(secondary) => secondary,
            None => return Ok(Vec::new()),
        };
        let ids = secondary.lookup_all(value)?;
        ids.iter().map(|id| self.get(id)).collect()
    }

    /// Lazy scan over active records in file order. Each call reopens the
    /// record file, so a scan is restartable.
    pub fn scan(&self) -> Result<Scan> {
        Scan::open(&self.record_path, self.schema)
    }

    /// Lazy scan filtered on an arbitrary (unindexed) field. Linear cost by
    /// design — unindexed fields have no faster path.
    pub fn scan_by_field(&self, field: usize, value: &str) -> Result<ScanBy> {
        if field >= self.schema.field_count() {
            return Err(StoreError::UnknownField(format!(
                "{} field #{}",
                self.schema.name, field
            )));
        }
        Ok(ScanBy::new(self.scan()?, field, value))
    }

    /// Whether a record exists under `id` (the cross-table existence check)
    pub fn contains(&self, id: &str) -> bool {
        self.primary.contains(id)
    }

    /// The table's schema
    pub fn schema(&self) -> &'static TableSchema {
        self.schema
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// The primary index
    pub fn primary(&self) -> &PrimaryIndex {
        &self.primary
    }

    /// The secondary index, if the schema declares one
    pub fn secondary(&self) -> Option<&SecondaryIndex> {
        self.secondary.as_ref()
    }

    /// The free-space list
    pub fn avail(&self) -> &AvailList {
        &self.avail
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn open_record_file(&self) -> Result<File> {
        Ok(OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.record_path)?)
    }

    fn offset_of(&self, id: &str) -> Result<u64> {
        self.primary.lookup(id).ok_or_else(|| self.not_found(id))
    }

    fn not_found(&self, id: &str) -> StoreError {
        StoreError::NotFound {
            table: self.schema.name,
            key: id.to_string(),
        }
    }

    /// Read and decode the slot at `offset`
    fn read_at(&self, offset: u64) -> Result<DecodedRecord> {
        let file = File::open(&self.record_path)?;
        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(offset))?;
        let mut line = String::new();
        reader.read_line(&mut line)?;

        let decoded = record::decode(&line)?;
        if decoded.fields.len() != self.schema.field_count() {
            return Err(StoreError::Corrupt(format!(
                "{} record at offset {} has {} fields, expected {}",
                self.schema.name,
                offset,
                decoded.fields.len(),
                self.schema.field_count()
            )));
        }
        Ok(decoded)
    }
}
