//! The on-disk object store contract the cache sits in front of (spec §6).

use crate::error::CacheError;
use crate::id::ObjectId;

/// The disk-facing object layer the cache wraps.
///
/// Implementations are expected to be atomic and crash-consistent per call;
/// the cache relies on that and adds nothing of its own beyond the write-back
/// ordering described in spec §4.4/§4.5. Block-level methods operate in
/// block-sized units addressed by zero-based index, with
/// [`CacheConfig::metadata_block_index`](crate::config::CacheConfig::metadata_block_index)
/// reserved for the object's metadata.
pub trait ObjectStore: Send {
    /// Current size, in bytes, of the named object.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ObjectNotExists`] if disk has no such id.
    fn object_size(&self, id: &ObjectId) -> Result<u64, CacheError>;

    /// Reads one block's worth of bytes at `block_index` into `buf`, which
    /// is exactly one block long. Returns the number of meaningful bytes
    /// (less than a full block only for the final, partial block of an
    /// object whose size isn't block-aligned).
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ObjectNotExists`] if disk has no such id, or
    /// [`CacheError::Io`] on any other disk failure.
    fn get_object(&self, id: &ObjectId, block_index: u32, buf: &mut [u8]) -> Result<usize, CacheError>;

    /// Creates a new, empty object with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ObjectExists`] if the id is taken,
    /// [`CacheError::ObjectTableFull`] if disk has no free id slots, or
    /// [`CacheError::NoDiskSpace`] if disk is full.
    fn add_object(&mut self, id: &ObjectId) -> Result<(), CacheError>;

    /// Writes `buf` to `block_index` of an existing object, growing it if
    /// this block lies past the current end.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ObjectNotExists`] if disk has no such id, or
    /// [`CacheError::NoDiskSpace`] if disk cannot grow to fit.
    fn write_object(&mut self, id: &ObjectId, block_index: u32, buf: &[u8]) -> Result<(), CacheError>;

    /// Removes an object and frees its disk space.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ObjectNotExists`] if disk has no such id.
    fn delete_object(&mut self, id: &ObjectId) -> Result<(), CacheError>;

    /// Truncates or extends an object to exactly `new_size` bytes,
    /// discarding or zero-filling as needed.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ObjectNotExists`] if disk has no such id, or
    /// [`CacheError::NoDiskSpace`] if growing requires space disk doesn't have.
    fn rewrite_object(&mut self, id: &ObjectId, new_size: u64) -> Result<(), CacheError>;
}
