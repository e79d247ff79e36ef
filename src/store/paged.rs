// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Slot-oriented record store backed by a single memory-mapped file.
//!
//! Allocation is append-only: a deleted slot's existence flag is cleared
//! but the slot is never reused (the workload this store targets is
//! append-biased; a caller may add free-list reuse on top without
//! changing observable semantics). The file grows by doubling its slot
//! capacity and remapping, rather than a fixed increment, since the
//! record width here is schema-dependent rather than a constant page
//! size.

use crate::error::{IndexError, IndexResult};
use crate::record::{Record, RecordLayout};
use memmap2::MmapMut;
use std::fs::{File, OpenOptions};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Initial file capacity, in slots, for a newly created store.
const INITIAL_CAPACITY_SLOTS: usize = 16;

/// A single table's worth of fixed-width records, memory-mapped for
/// random-access read/write.
#[derive(Debug)]
pub struct PagedRecordStore<R: Record> {
    file: File,
    mmap: MmapMut,
    layout: RecordLayout,
    path: PathBuf,
    /// Slot count the backing file currently has room for.
    capacity_slots: usize,
    /// One past the highest slot ever appended; `find_by_id` beyond this
    /// always returns `None` without touching the mapping.
    next_slot_id: i64,
    _marker: PhantomData<R>,
}

impl<R: Record> PagedRecordStore<R> {
    /// Open (creating if absent) the backing file at `path` for records
    /// of `layout`'s schema.
    pub fn open(path: &Path, layout: RecordLayout) -> IndexResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)?;

        let record_width = layout.record_width();
        let existing_len = file.metadata()?.len() as usize;
        let existing_slots = existing_len / record_width;

        let capacity_slots = existing_slots.max(INITIAL_CAPACITY_SLOTS);
        file.set_len((capacity_slots * record_width) as u64)?;

        let mmap = unsafe { MmapMut::map_mut(&file)? };

        Ok(Self {
            file,
            mmap,
            layout,
            path: path.to_path_buf(),
            capacity_slots,
            next_slot_id: existing_slots as i64,
            _marker: PhantomData,
        })
    }

    fn record_width(&self) -> usize {
        self.layout.record_width()
    }

    fn slot_offset(&self, slot_id: i64) -> usize {
        slot_id as usize * self.record_width()
    }

    /// Grow the backing file (doubling its slot capacity, never below
    /// `slot_id + 1` slots) and remap it.
    fn ensure_capacity(&mut self, slot_id: i64) -> IndexResult<()> {
        let required = slot_id as usize + 1;
        if required <= self.capacity_slots {
            return Ok(());
        }
        let new_capacity = (self.capacity_slots * 2).max(required);
        self.file
            .set_len((new_capacity * self.record_width()) as u64)?;
        self.mmap = unsafe { MmapMut::map_mut(&self.file)? };
        self.capacity_slots = new_capacity;
        Ok(())
    }

    /// Write `obj` into a newly allocated slot and return its id.
    pub fn append(&mut self, obj: &R) -> IndexResult<i64> {
        let slot_id = self.next_slot_id;
        self.write_slot(slot_id, obj)?;
        self.next_slot_id += 1;
        Ok(slot_id)
    }

    /// Overwrite the record at `slot_id`, which must already have been
    /// assigned by a prior [`Self::append`].
    pub fn put(&mut self, slot_id: i64, obj: &R) -> IndexResult<()> {
        if slot_id < 0 || slot_id >= self.next_slot_id {
            return Err(IndexError::MissingRecord { slot_id });
        }
        self.write_slot(slot_id, obj)
    }

    fn write_slot(&mut self, slot_id: i64, obj: &R) -> IndexResult<()> {
        self.ensure_capacity(slot_id)?;
        let bytes = self.layout.encode(obj)?;
        let offset = self.slot_offset(slot_id);
        self.mmap[offset..offset + bytes.len()].copy_from_slice(&bytes);
        self.mmap.flush_range(offset, bytes.len())?;
        Ok(())
    }

    /// Read the record at `slot_id`, or `None` if it was never written,
    /// is beyond the allocated range, or has a cleared existence flag.
    pub fn find_by_id(&self, slot_id: i64) -> IndexResult<Option<R>> {
        if slot_id < 0 || slot_id >= self.next_slot_id {
            return Ok(None);
        }
        let offset = self.slot_offset(slot_id);
        let width = self.record_width();
        self.layout.decode(&self.mmap[offset..offset + width])
    }

    /// Clear the existence flag of `slot_id`'s record; the slot itself
    /// is never reused.
    pub fn delete(&mut self, slot_id: i64) -> IndexResult<()> {
        if slot_id < 0 || slot_id >= self.next_slot_id {
            return Err(IndexError::MissingRecord { slot_id });
        }
        let offset = self.slot_offset(slot_id);
        let tombstone = RecordLayout::tombstone_byte();
        self.mmap[offset..offset + tombstone.len()].copy_from_slice(&tombstone);
        self.mmap.flush_range(offset, tombstone.len())?;
        Ok(())
    }

    /// Remove the backing file entirely. Consumes the store since the
    /// mapping and handle are no longer valid afterward.
    pub fn destroy(self) -> IndexResult<()> {
        let path = self.path.clone();
        drop(self);
        std::fs::remove_file(&path)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "paged_test.rs"]
mod paged_test;
