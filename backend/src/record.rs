//! Process records and the factory seam the enumerator creates them through.

use crate::types::{EnumError, ProcessInfo};

/// Longest process name kept, in bytes.
pub const MAX_NAME_LEN: usize = 255;

/// One process discovered during enumeration.
///
/// Immutable once created. Dropping a record destroys it; dropping `None` in
/// its place is a no-op.
#[derive(Debug, PartialEq, Eq)]
pub struct ProcessRecord {
    pid: i32,
    name: String,
}

impl ProcessRecord {
    /// Copies a bounded, newline-stripped `name` into owned storage.
    ///
    /// Storage is obtained with a fallible reservation, so an exhausted heap
    /// surfaces as [`EnumError::AllocationFailure`] instead of aborting.
    pub fn create(pid: i32, name: &str) -> Result<Self, EnumError> {
        let name = bounded_name(name);
        let mut owned = String::new();
        owned
            .try_reserve_exact(name.len())
            .map_err(|_| EnumError::AllocationFailure)?;
        owned.push_str(name);
        Ok(Self { pid, name: owned })
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_parts(self) -> (i32, String) {
        (self.pid, self.name)
    }
}

impl From<ProcessRecord> for ProcessInfo {
    fn from(record: ProcessRecord) -> Self {
        let (pid, name) = record.into_parts();
        ProcessInfo { pid, name }
    }
}

/// Cuts `raw` to [`MAX_NAME_LEN`] bytes on a char boundary, then drops one
/// trailing newline.
pub fn bounded_name(raw: &str) -> &str {
    let mut end = raw.len().min(MAX_NAME_LEN);
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    let cut = &raw[..end];
    cut.strip_suffix('\n').unwrap_or(cut)
}

/// Creates records on behalf of the enumerator.
pub trait RecordFactory {
    fn create(&mut self, pid: i32, name: &str) -> Result<ProcessRecord, EnumError>;
}

/// Default factory: plain [`ProcessRecord::create`].
#[derive(Debug, Default, Clone, Copy)]
pub struct HeapFactory;

impl RecordFactory for HeapFactory {
    fn create(&mut self, pid: i32, name: &str) -> Result<ProcessRecord, EnumError> {
        ProcessRecord::create(pid, name)
    }
}

impl<F: RecordFactory + ?Sized> RecordFactory for &mut F {
    fn create(&mut self, pid: i32, name: &str) -> Result<ProcessRecord, EnumError> {
        (**self).create(pid, name)
    }
}
