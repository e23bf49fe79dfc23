//! An in-memory [`ObjectStore`] test double, standing in for a real disk the
//! way the teacher crate's `cache-simulator` stood in for a production
//! traffic source. Useful for exercising `obj_cache::ObjectCache` without a
//! filesystem, and for the CLI in `src/main.rs`.

use std::collections::HashMap;

use obj_cache::{CacheError, ObjectId, ObjectStore};

/// A byte-addressed, size-bounded in-memory disk.
///
/// Enforces the same two capacity limits a real object store would:
/// a maximum object count ([`CacheError::ObjectTableFull`]) and a maximum
/// total byte budget ([`CacheError::NoDiskSpace`]).
pub struct MemoryDisk {
    objects: HashMap<Vec<u8>, Vec<u8>>,
    max_objects: usize,
    max_bytes: u64,
    bytes_used: u64,
}

impl MemoryDisk {
    /// Builds an empty disk accepting at most `max_objects` objects and
    /// `max_bytes` bytes of total object content.
    pub fn new(max_objects: usize, max_bytes: u64) -> Self {
        Self {
            objects: HashMap::new(),
            max_objects,
            max_bytes,
            bytes_used: 0,
        }
    }

    /// Number of objects currently stored.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Total bytes currently occupied across all objects.
    pub fn bytes_used(&self) -> u64 {
        self.bytes_used
    }
}

impl ObjectStore for MemoryDisk {
    fn object_size(&self, id: &ObjectId) -> Result<u64, CacheError> {
        self.objects
            .get(id.as_bytes())
            .map(|d| d.len() as u64)
            .ok_or(CacheError::ObjectNotExists)
    }

    fn get_object(&self, id: &ObjectId, block_index: u32, buf: &mut [u8]) -> Result<usize, CacheError> {
        let data = self.objects.get(id.as_bytes()).ok_or(CacheError::ObjectNotExists)?;
        let start = block_index as usize * buf.len();
        if start >= data.len() {
            return Ok(0);
        }
        let end = (start + buf.len()).min(data.len());
        let n = end - start;
        buf[..n].copy_from_slice(&data[start..end]);
        Ok(n)
    }

    fn add_object(&mut self, id: &ObjectId) -> Result<(), CacheError> {
        if self.objects.contains_key(id.as_bytes()) {
            return Err(CacheError::ObjectExists);
        }
        if self.objects.len() >= self.max_objects {
            return Err(CacheError::ObjectTableFull);
        }
        self.objects.insert(id.as_bytes().to_vec(), Vec::new());
        Ok(())
    }

    fn write_object(&mut self, id: &ObjectId, block_index: u32, buf: &[u8]) -> Result<(), CacheError> {
        let start = block_index as usize * buf.len();
        let needed_len = start + buf.len();
        let data = self.objects.get_mut(id.as_bytes()).ok_or(CacheError::ObjectNotExists)?;
        let old_len = data.len();
        if needed_len > old_len {
            let growth = (needed_len - old_len) as u64;
            if self.bytes_used + growth > self.max_bytes {
                return Err(CacheError::NoDiskSpace);
            }
            data.resize(needed_len, 0);
            self.bytes_used += growth;
        }
        data[start..start + buf.len()].copy_from_slice(buf);
        Ok(())
    }

    fn delete_object(&mut self, id: &ObjectId) -> Result<(), CacheError> {
        let data = self.objects.remove(id.as_bytes()).ok_or(CacheError::ObjectNotExists)?;
        self.bytes_used -= data.len() as u64;
        Ok(())
    }

    fn rewrite_object(&mut self, id: &ObjectId, new_size: u64) -> Result<(), CacheError> {
        let data = self.objects.get_mut(id.as_bytes()).ok_or(CacheError::ObjectNotExists)?;
        let old_len = data.len() as u64;
        if new_size > old_len {
            let growth = new_size - old_len;
            if self.bytes_used + growth > self.max_bytes {
                return Err(CacheError::NoDiskSpace);
            }
            self.bytes_used += growth;
        } else {
            self.bytes_used -= old_len - new_size;
        }
        data.resize(new_size as usize, 0);
        Ok(())
    }
}
