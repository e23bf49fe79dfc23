//! Shared in-memory disk double for the integration test suite.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use obj_cache::{CacheError, ObjectId, ObjectStore};

/// A handle that outlives the [`MemStore`] it was created alongside (which
/// the cache takes ownership of), letting a test flip a one-shot write
/// failure on from the outside.
#[derive(Clone)]
pub struct FailSwitch(Arc<AtomicBool>);

impl FailSwitch {
    /// Causes the next call to [`ObjectStore::write_object`] on the
    /// associated store to fail with [`CacheError::NoDiskSpace`] without
    /// mutating anything.
    pub fn fail_next_write(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// An in-memory [`ObjectStore`] with an optional one-shot write failure,
/// used to exercise the cache's error-propagation path (spec §7).
pub struct MemStore {
    block_size: usize,
    objects: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
    fail_next_write: Arc<AtomicBool>,
}

impl MemStore {
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            objects: Mutex::new(HashMap::new()),
            fail_next_write: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Builds a store alongside a [`FailSwitch`] that can trigger a one-shot
    /// write failure from outside, even after the store has been moved into
    /// an [`obj_cache::ObjectCache`].
    pub fn with_fail_switch(block_size: usize) -> (Self, FailSwitch) {
        let store = Self::new(block_size);
        let switch = FailSwitch(Arc::clone(&store.fail_next_write));
        (store, switch)
    }
}

impl ObjectStore for MemStore {
    fn object_size(&self, id: &ObjectId) -> Result<u64, CacheError> {
        let objects = self.objects.lock().unwrap();
        objects.get(id.as_bytes()).map(|d| d.len() as u64).ok_or(CacheError::ObjectNotExists)
    }

    fn get_object(&self, id: &ObjectId, block_index: u32, buf: &mut [u8]) -> Result<usize, CacheError> {
        let objects = self.objects.lock().unwrap();
        let data = objects.get(id.as_bytes()).ok_or(CacheError::ObjectNotExists)?;
        let start = block_index as usize * self.block_size;
        if start >= data.len() {
            return Ok(0);
        }
        let end = (start + buf.len()).min(data.len());
        let n = end - start;
        buf[..n].copy_from_slice(&data[start..end]);
        Ok(n)
    }

    fn add_object(&mut self, id: &ObjectId) -> Result<(), CacheError> {
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(id.as_bytes()) {
            return Err(CacheError::ObjectExists);
        }
        objects.insert(id.as_bytes().to_vec(), Vec::new());
        Ok(())
    }

    fn write_object(&mut self, id: &ObjectId, block_index: u32, buf: &[u8]) -> Result<(), CacheError> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(CacheError::NoDiskSpace);
        }
        let mut objects = self.objects.lock().unwrap();
        let data = objects.get_mut(id.as_bytes()).ok_or(CacheError::ObjectNotExists)?;
        let start = block_index as usize * self.block_size;
        if data.len() < start + buf.len() {
            data.resize(start + buf.len(), 0);
        }
        data[start..start + buf.len()].copy_from_slice(buf);
        Ok(())
    }

    fn delete_object(&mut self, id: &ObjectId) -> Result<(), CacheError> {
        let mut objects = self.objects.lock().unwrap();
        objects.remove(id.as_bytes()).map(|_| ()).ok_or(CacheError::ObjectNotExists)
    }

    fn rewrite_object(&mut self, id: &ObjectId, new_size: u64) -> Result<(), CacheError> {
        let mut objects = self.objects.lock().unwrap();
        let data = objects.get_mut(id.as_bytes()).ok_or(CacheError::ObjectNotExists)?;
        data.resize(new_size as usize, 0);
        Ok(())
    }
}
