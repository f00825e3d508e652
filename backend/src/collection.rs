//! The caller-owned result of one enumeration.

use crate::record::ProcessRecord;
use crate::ring::{Arena, RingId};
use crate::types::{EnumError, ProcessInfo};

/// Process records in discovery order.
///
/// Dropping the collection destroys every record it still holds, which is how
/// a failed enumeration rolls back.
pub struct ProcessCollection {
    arena: Arena<ProcessRecord>,
    ring: RingId,
    len: usize,
}

impl ProcessCollection {
    pub fn new() -> Result<Self, EnumError> {
        let mut arena = Arena::new();
        let ring = arena
            .new_ring()
            .map_err(|_| EnumError::AllocationFailure)?;
        Ok(Self {
            arena,
            ring,
            len: 0,
        })
    }

    /// Appends at the tail. The record is destroyed if no slot can be allocated.
    pub fn push_back(&mut self, record: ProcessRecord) -> Result<(), EnumError> {
        // The ring handle is private and never freed, so only allocation can fail.
        self.arena
            .push_back(self.ring, record)
            .map_err(|_| EnumError::AllocationFailure)?;
        self.len += 1;
        Ok(())
    }

    pub fn pop_front(&mut self) -> Option<ProcessRecord> {
        let record = self.arena.pop_front(self.ring)?;
        self.len -= 1;
        Some(record)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty(self.ring)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessRecord> + '_ {
        self.arena.iter(self.ring).map(|(_, record)| record)
    }

    /// Hands every record to the caller, front to back, leaving the collection
    /// empty even if the iterator is dropped part way.
    pub fn drain(&mut self) -> impl Iterator<Item = ProcessRecord> + '_ {
        self.len = 0;
        self.arena.drain(self.ring)
    }

    /// Keeps only the records matching `keep`, destroying the rest in place.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&ProcessRecord) -> bool,
    {
        let mut cursor = self.arena.cursor(self.ring);
        while let Some(node) = cursor.next(&self.arena) {
            let drop_it = self.arena.get(node).is_some_and(|record| !keep(record));
            if drop_it && self.arena.remove(node).is_ok() {
                self.len -= 1;
            }
        }
    }

    pub fn into_infos(self) -> Vec<ProcessInfo> {
        self.into_iter().map(ProcessInfo::from).collect()
    }
}

impl std::fmt::Debug for ProcessCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Owning iterator; each record leaves the collection as it is yielded.
pub struct IntoIter {
    collection: ProcessCollection,
}

impl Iterator for IntoIter {
    type Item = ProcessRecord;

    fn next(&mut self) -> Option<ProcessRecord> {
        self.collection.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.collection.len, Some(self.collection.len))
    }
}

impl ExactSizeIterator for IntoIter {}

impl IntoIterator for ProcessCollection {
    type Item = ProcessRecord;
    type IntoIter = IntoIter;

    fn into_iter(self) -> IntoIter {
        IntoIter { collection: self }
    }
}
