//! The cache façade (spec §4.5): the single public type, wrapping the
//! acquire/validate/transfer/write-back/release sequence into each of the
//! six disk-shaped operations under one cache-wide lock (spec §5's "sleeping
//! mutex"). Grounded in the teacher crate's top-level `LruCache` as the
//! shape of a public entry point over an internal policy engine, with the
//! single-lock model taken from `obj_cache_add`/`obj_cache_write`/
//! `obj_cache_read`/`obj_cache_delete` in
//! `examples/original_source/kernel/obj_cache.c`, each of which runs under
//! one global `obj_cache_lock`.

use std::fmt;

use parking_lot::Mutex;

use crate::config::CacheConfig;
use crate::error::CacheError;
use crate::hints::contiguous_window;
use crate::id::ObjectId;
use crate::metrics::CacheMetrics;
use crate::orchestrator::{
    acquire_and_validate, copy_in, copy_out, flush_dirty, invalidate_object, peek_metadata_size, read_metadata_size,
    release_all,
};
use crate::pool::BlockPool;
use crate::store::ObjectStore;

struct CacheState<S> {
    store: S,
    pool: BlockPool,
    metrics: CacheMetrics,
    /// One-shot buffer for the object last read whole from disk because it
    /// was too large to admit into the pool (spec §9's graft from the
    /// sticky-buffer variant; see `examples/original_source/obj_cache.c`'s
    /// `last_object_from_disk_id`/`last_object_from_disk_buffer`). Holding
    /// exactly one makes a second read of the same oversized object free
    /// without growing the pool's admission limits.
    sticky: Option<(ObjectId, Box<[u8]>)>,
}

/// A bounded, write-through LRU cache sitting in front of an
/// [`ObjectStore`], as described by spec §1's "object cache" component.
///
/// All operations serialize on a single internal lock (spec §5): there is
/// no read/write distinction and no per-object locking, matching the
/// original's single `obj_cache_lock`.
pub struct ObjectCache<S: ObjectStore> {
    config: CacheConfig,
    inner: Mutex<CacheState<S>>,
}

impl<S: ObjectStore> fmt::Debug for ObjectCache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectCache").field("config", &self.config).finish_non_exhaustive()
    }
}

impl<S: ObjectStore> ObjectCache<S> {
    /// Builds a cache over `store`, preallocating `config.pool_entries()`
    /// pool slots up front (spec §3 "Lifecycle": the pool never grows).
    pub fn new(store: S, config: CacheConfig) -> Self {
        let pool = BlockPool::new(config.pool_entries().get(), config.block_size());
        Self {
            config,
            inner: Mutex::new(CacheState {
                store,
                pool,
                metrics: CacheMetrics::default(),
                sticky: None,
            }),
        }
    }

    /// The configuration this cache was built with.
    #[inline]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// A snapshot of the current hit/miss counters.
    pub fn metrics(&self) -> CacheMetrics {
        self.inner.lock().metrics
    }

    /// Validates `name` as an [`ObjectId`] under this cache's configured
    /// name length limit.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ObjectNameTooLong`] if `name` exceeds the
    /// configured limit.
    pub fn object_id(&self, name: impl Into<Vec<u8>>) -> Result<ObjectId, CacheError> {
        ObjectId::new(name, &self.config)
    }

    /// Creates a new, empty object.
    ///
    /// Fills blocks `[0, ⌈data.len()/B⌉)` with `data` (spec §4.5's `add`
    /// table row).
    ///
    /// # Errors
    ///
    /// See [`ObjectStore::add_object`] and [`ObjectStore::write_object`]. On
    /// a disk failure while staging `data`, any blocks this call admitted
    /// for `id` are invalidated before the error is returned.
    pub fn add(&self, id: &ObjectId, data: &[u8]) -> Result<(), CacheError> {
        let mut state = self.inner.lock();
        state.store.add_object(id)?;
        invalidate_object(&mut state.pool, id, self.config.max_blocks_per_object());
        if data.is_empty() {
            return Ok(());
        }

        if data.len() as u64 > self.config.max_cacheable_object_size() {
            // Too large to stage through the pool; write it straight
            // through, mirroring `write`'s too-large-to-cache fallback.
            self.write_direct(&mut state, id, 0, data)?;
            return Ok(());
        }

        let hints = contiguous_window(0, data.len(), self.config.block_size(), self.config.max_blocks_per_object(), 0);
        let acquired = acquire_and_validate(&mut state.pool, &state.store, id, &hints)?;
        copy_in(&mut state.pool, &acquired, self.config.block_size(), 0, data);
        let flush_result = flush_dirty(&mut state.pool, &mut state.store, id, &acquired);
        release_all(&mut state.pool, &acquired);
        if let Err(err) = flush_result {
            invalidate_object(&mut state.pool, id, self.config.max_blocks_per_object());
            return Err(err);
        }
        state.pool.invalidate(id, crate::pool::BlockSlot::Meta);
        Ok(())
    }

    /// Permanently removes an object and evicts anything cached for it.
    ///
    /// # Errors
    ///
    /// See [`ObjectStore::delete_object`].
    pub fn delete(&self, id: &ObjectId) -> Result<(), CacheError> {
        let mut state = self.inner.lock();
        state.store.delete_object(id)?;
        invalidate_object(&mut state.pool, id, self.config.max_blocks_per_object());
        if state.sticky.as_ref().is_some_and(|(sid, _)| sid == id) {
            state.sticky = None;
        }
        Ok(())
    }

    /// Current size, in bytes, of `id`.
    ///
    /// Returned from the cached metadata block if present; otherwise this
    /// queries disk directly and does *not* admit the result into the pool
    /// (spec §4.5's `size` table row), unlike `read`/`write`, which cache
    /// the size as a side effect of needing it to compute their range.
    ///
    /// # Errors
    ///
    /// See [`ObjectStore::object_size`].
    pub fn size(&self, id: &ObjectId) -> Result<u64, CacheError> {
        let mut state = self.inner.lock();
        let (size, touched_disk) = peek_metadata_size(&state.pool, &state.store, id)?;
        state.metrics.record(touched_disk);
        Ok(size)
    }

    /// Truncates or extends `id` to exactly `new_size` bytes, discarding any
    /// cached content that no longer reflects disk.
    ///
    /// # Errors
    ///
    /// See [`ObjectStore::rewrite_object`].
    pub fn rewrite(&self, id: &ObjectId, new_size: u64) -> Result<(), CacheError> {
        let mut state = self.inner.lock();
        state.store.rewrite_object(id, new_size)?;
        invalidate_object(&mut state.pool, id, self.config.max_blocks_per_object());
        if state.sticky.as_ref().is_some_and(|(sid, _)| sid == id) {
            state.sticky = None;
        }
        Ok(())
    }

    /// Drops any cached content for `id` without touching disk. Not part of
    /// the disk-shaped operation table but useful for a caller that knows
    /// an object changed out from under the cache (spec §1's mention of
    /// invalidation alongside the other façade operations).
    pub fn invalidate(&self, id: &ObjectId) {
        let mut state = self.inner.lock();
        invalidate_object(&mut state.pool, id, self.config.max_blocks_per_object());
        if state.sticky.as_ref().is_some_and(|(sid, _)| sid == id) {
            state.sticky = None;
        }
    }

    /// Reads up to `out.len()` bytes of `id` starting at `offset`, returning
    /// the number of bytes actually read (short only at end of object).
    ///
    /// Objects larger than [`CacheConfig::max_cacheable_object_size`] are
    /// never admitted into the pool; they are read straight through to a
    /// sticky one-shot buffer instead (spec §9).
    ///
    /// # Errors
    ///
    /// See [`ObjectStore::get_object`] and [`ObjectStore::object_size`].
    pub fn read(&self, id: &ObjectId, offset: u64, out: &mut [u8]) -> Result<usize, CacheError> {
        let mut state = self.inner.lock();
        let (size, size_touched_disk) = read_metadata_size(&mut state.pool, &state.store, id)?;

        if size > self.config.max_cacheable_object_size() {
            self.read_oversized(&mut state, id, size)?;
            // Oversized objects never enter the pool, so every read of one
            // counts as a miss even when the sticky one-shot buffer already
            // holds it (spec §8 property 6: "for objects above the
            // max-cacheable size both [reads] are misses").
            state.metrics.record(true);
            let CacheState { sticky, .. } = &*state;
            let (_, buf) = sticky.as_ref().expect("read_oversized always populates the sticky buffer");
            let start = (offset as usize).min(buf.len());
            let end = (start + out.len()).min(buf.len());
            let n = end - start;
            out[..n].copy_from_slice(&buf[start..end]);
            return Ok(n);
        }

        if offset >= size {
            state.metrics.record(size_touched_disk);
            return Ok(0);
        }
        let to_read = out.len().min((size - offset) as usize);
        let hints = contiguous_window(
            offset,
            to_read,
            self.config.block_size(),
            self.config.max_blocks_per_object(),
            self.config.padding_blocks(),
        );
        let acquired = acquire_and_validate(&mut state.pool, &state.store, id, &hints)?;
        let n = copy_out(&state.pool, &acquired, self.config.block_size(), offset, &mut out[..to_read]);
        release_all(&mut state.pool, &acquired);
        state.metrics.record(size_touched_disk || acquired.touched_disk());
        Ok(n)
    }

    fn read_oversized(&self, state: &mut CacheState<S>, id: &ObjectId, size: u64) -> Result<(), CacheError> {
        if state.sticky.as_ref().is_some_and(|(sid, _)| sid == id) {
            return Ok(());
        }
        let mut buf = vec![0u8; size as usize].into_boxed_slice();
        let block_size = self.config.block_size();
        let mut block_index = 0u32;
        let mut cursor = 0usize;
        while cursor < buf.len() {
            let end = (cursor + block_size).min(buf.len());
            let want = end - cursor;
            let n = state.store.get_object(id, block_index, &mut buf[cursor..end])?;
            cursor += n;
            block_index += 1;
            if n < want {
                break;
            }
        }
        state.sticky = Some((id.clone(), buf));
        Ok(())
    }

    /// Writes `data` to `id` starting at `offset`, growing the object if the
    /// write runs past its current size, write-through (spec §5: no success
    /// return with unflushed pool content).
    ///
    /// # Errors
    ///
    /// See [`ObjectStore::write_object`].
    pub fn write(&self, id: &ObjectId, offset: u64, data: &[u8]) -> Result<(), CacheError> {
        if data.is_empty() {
            return Ok(());
        }
        let max_size = self.config.max_cacheable_object_size();
        if offset + data.len() as u64 > max_size {
            // Falls outside what the pool can represent; hand the whole
            // write straight to disk and drop anything cached for this id.
            let mut state = self.inner.lock();
            self.write_direct(&mut state, id, offset, data)?;
            invalidate_object(&mut state.pool, id, self.config.max_blocks_per_object());
            state.sticky = None;
            return Ok(());
        }

        let mut state = self.inner.lock();
        let hints = contiguous_window(
            offset,
            data.len(),
            self.config.block_size(),
            self.config.max_blocks_per_object(),
            self.config.padding_blocks(),
        );
        let acquired = acquire_and_validate(&mut state.pool, &state.store, id, &hints)?;
        copy_in(&mut state.pool, &acquired, self.config.block_size(), offset, data);
        let flush_result = flush_dirty(&mut state.pool, &mut state.store, id, &acquired);
        release_all(&mut state.pool, &acquired);
        if let Err(err) = flush_result {
            // A disk failure partway through the flush can leave blocks
            // that were never reached still DIRTY with data that never
            // made it to disk (spec §4.6's `DIRTY --disk_write_fail-->
            // invalidate` transition, and §4.5's failure-atomicity
            // contract). Rather than work out exactly which blocks landed
            // before the failure, drop everything cached for this id so
            // the next access re-fetches the true on-disk content.
            invalidate_object(&mut state.pool, id, self.config.max_blocks_per_object());
            if state.sticky.as_ref().is_some_and(|(sid, _)| sid == id) {
                state.sticky = None;
            }
            return Err(err);
        }
        // Data blocks are still valid (just written); only the cached size
        // may be stale.
        state.pool.invalidate(id, crate::pool::BlockSlot::Meta);
        if state.sticky.as_ref().is_some_and(|(sid, _)| sid == id) {
            state.sticky = None;
        }
        state.metrics.record(acquired.touched_disk());
        Ok(())
    }

    fn write_direct(&self, state: &mut CacheState<S>, id: &ObjectId, offset: u64, data: &[u8]) -> Result<(), CacheError> {
        let block_size = self.config.block_size();
        let mut cursor = 0usize;
        let mut block_index = (offset / block_size as u64) as u32;
        let mut in_block = (offset % block_size as u64) as usize;
        while cursor < data.len() {
            let n = (block_size - in_block).min(data.len() - cursor);
            if n == block_size {
                state.store.write_object(id, block_index, &data[cursor..cursor + n])?;
            } else {
                let mut buf = vec![0u8; block_size];
                // Best-effort read-modify-write: preserve whatever this block
                // already holds outside the bytes this call touches.
                let _ = state.store.get_object(id, block_index, &mut buf);
                buf[in_block..in_block + n].copy_from_slice(&data[cursor..cursor + n]);
                state.store.write_object(id, block_index, &buf)?;
            }
            cursor += n;
            in_block = 0;
            block_index += 1;
        }
        state.metrics.record(true);
        Ok(())
    }
}
