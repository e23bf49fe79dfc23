//! Block I/O orchestrator (spec §4.4): the six-step acquire, validate,
//! transfer, write back, release sequence every façade operation is built
//! from. Grounded in `obj_cache_get_bufs` / `validate_bufs` /
//! `obj_cache_copy_to_bufs` / `obj_cache_copy_from_bufs` (see
//! `examples/original_source/kernel/obj_cache.c`).

use crate::error::CacheError;
use crate::flags::BlockFlags;
use crate::hints::{expand, Hint};
use crate::id::ObjectId;
use crate::pool::{BlockPool, BlockSlot};
use crate::store::ObjectStore;

/// A run of pool entries acquired for one façade call, in ascending block
/// order. Always released via [`release_all`] before the call returns.
pub(crate) struct Acquired {
    /// `(block_index, pool_index)` pairs, ascending by `block_index`.
    blocks: Vec<(u32, usize)>,
    /// Whether any block in this acquisition had to be fetched from disk.
    touched_disk: bool,
}

impl Acquired {
    fn pool_index_for(&self, block_index: u32) -> usize {
        self.blocks
            .iter()
            .find(|(b, _)| *b == block_index)
            .map(|(_, idx)| *idx)
            .expect("block_index not covered by this acquisition")
    }

    /// Whether satisfying this acquisition required at least one disk read
    /// (façade-call-granularity hit/miss accounting, spec §4.5).
    pub(crate) fn touched_disk(&self) -> bool {
        self.touched_disk
    }
}

/// Acquires every block named by `hints`, fetching any that aren't already
/// valid. On a disk error partway through, everything acquired so far is
/// released before the error is returned (step "all-or-nothing" from spec §4.4).
pub(crate) fn acquire_and_validate(
    pool: &mut BlockPool,
    store: &dyn ObjectStore,
    id: &ObjectId,
    hints: &[Hint],
) -> Result<Acquired, CacheError> {
    let mut blocks = Vec::new();
    let mut touched_disk = false;
    for (block_index, flags) in expand(hints) {
        let (idx, _hit) = pool.acquire(id, BlockSlot::Data(block_index), flags);
        match fetch_if_invalid(pool, store, id, idx, block_index) {
            Ok(fetched) => touched_disk |= fetched,
            Err(e) => {
                pool.release(idx);
                release_all(pool, &Acquired { blocks, touched_disk });
                return Err(e);
            }
        }
        blocks.push((block_index, idx));
    }
    Ok(Acquired { blocks, touched_disk })
}

/// Fetches a block from disk if its cached copy isn't valid. Returns whether
/// disk was actually touched.
fn fetch_if_invalid(
    pool: &mut BlockPool,
    store: &dyn ObjectStore,
    id: &ObjectId,
    idx: usize,
    block_index: u32,
) -> Result<bool, CacheError> {
    if pool.entry(idx).is_valid() {
        return Ok(false);
    }
    let entry = pool.entry_mut(idx);
    let len = store.get_object(id, block_index, entry.data_mut())?;
    entry.mark_clean(len);
    Ok(true)
}

/// Releases every block in `acquired` back to the pool.
pub(crate) fn release_all(pool: &mut BlockPool, acquired: &Acquired) {
    for &(_, idx) in &acquired.blocks {
        pool.release(idx);
    }
}

/// Copies up to `out.len()` bytes starting at byte `offset` (relative to the
/// start of the object) out of the acquired blocks into `out`. Returns the
/// number of bytes actually copied, which is short only when the read runs
/// past the end of valid data in the final acquired block.
pub(crate) fn copy_out(
    pool: &BlockPool,
    acquired: &Acquired,
    block_size: usize,
    offset: u64,
    out: &mut [u8],
) -> usize {
    let mut copied = 0;
    let mut remaining = out.len();
    let mut cursor = offset;

    while remaining > 0 {
        let block_index = (cursor / block_size as u64) as u32;
        let in_block = (cursor % block_size as u64) as usize;
        let idx = acquired.pool_index_for(block_index);
        let entry = pool.entry(idx);
        let available = entry.len().saturating_sub(in_block);
        if available == 0 {
            break;
        }
        let n = remaining.min(available);
        out[copied..copied + n].copy_from_slice(&entry.data()[in_block..in_block + n]);
        copied += n;
        remaining -= n;
        cursor += n as u64;
    }
    copied
}

/// Copies `data` into the acquired blocks starting at byte `offset`,
/// marking every touched block dirty. The caller is responsible for flushing
/// (write-through) before releasing; see [`flush_dirty`].
pub(crate) fn copy_in(
    pool: &mut BlockPool,
    acquired: &Acquired,
    block_size: usize,
    offset: u64,
    data: &[u8],
) {
    let mut written = 0;
    let mut cursor = offset;

    while written < data.len() {
        let block_index = (cursor / block_size as u64) as u32;
        let in_block = (cursor % block_size as u64) as usize;
        let idx = acquired.pool_index_for(block_index);
        let entry = pool.entry_mut(idx);
        let n = (block_size - in_block).min(data.len() - written);
        let new_len = entry.len().max(in_block + n);
        entry.data_mut()[in_block..in_block + n].copy_from_slice(&data[written..written + n]);
        entry.mark_dirty(new_len);
        written += n;
        cursor += n as u64;
    }
}

/// Writes every dirty block in `acquired` back to disk, in ascending block
/// order, clearing `DIRTY` as each one lands (spec §5's write-through rule:
/// no façade call returns success with unflushed data in the pool).
pub(crate) fn flush_dirty(
    pool: &mut BlockPool,
    store: &mut dyn ObjectStore,
    id: &ObjectId,
    acquired: &Acquired,
) -> Result<(), CacheError> {
    for &(block_index, idx) in &acquired.blocks {
        let entry = pool.entry_mut(idx);
        if !entry.is_dirty() {
            continue;
        }
        store.write_object(id, block_index, entry.data())?;
        let len = entry.len();
        entry.mark_clean(len);
    }
    Ok(())
}

/// Returns the object's size, consulting the cached metadata block before
/// falling back to [`ObjectStore::object_size`]. The metadata block holds an
/// opportunistic cached copy of the size as 8 little-endian bytes (spec §3
/// "metadata block"); it carries no independent truth and is never written
/// back to disk, only invalidated whenever the object's size may have
/// changed (see [`invalidate_object`]).
pub(crate) fn read_metadata_size(
    pool: &mut BlockPool,
    store: &dyn ObjectStore,
    id: &ObjectId,
) -> Result<(u64, bool), CacheError> {
    let (idx, _hit) = pool.acquire(id, BlockSlot::Meta, BlockFlags::empty());
    let result = (|| {
        let mut touched_disk = false;
        if !pool.entry(idx).is_valid() {
            let size = store.object_size(id)?;
            let entry = pool.entry_mut(idx);
            entry.data_mut()[..8].copy_from_slice(&size.to_le_bytes());
            entry.mark_clean(8);
            touched_disk = true;
        }
        let bytes = pool.entry(idx).data();
        let mut le = [0u8; 8];
        le.copy_from_slice(&bytes[..8]);
        Ok((u64::from_le_bytes(le), touched_disk))
    })();
    pool.release(idx);
    result
}

/// Returns the object's size exactly as [`read_metadata_size`] does when the
/// metadata block is already cached, but never admits it into the pool on a
/// miss: spec §4.5's `size` op is explicit that it should "query disk, do
/// not admit", unlike `read`/`write`, which need the size to compute the
/// range they operate on anyway and so are allowed to cache it opportunistically.
pub(crate) fn peek_metadata_size(pool: &BlockPool, store: &dyn ObjectStore, id: &ObjectId) -> Result<(u64, bool), CacheError> {
    if let Some(idx) = pool.lookup(id, BlockSlot::Meta) {
        let entry = pool.entry(idx);
        if entry.is_valid() {
            let bytes = entry.data();
            let mut le = [0u8; 8];
            le.copy_from_slice(&bytes[..8]);
            return Ok((u64::from_le_bytes(le), false));
        }
    }
    let size = store.object_size(id)?;
    Ok((size, true))
}

/// Drops every cached block belonging to `id`, data and metadata alike
/// (used by delete, by writes/rewrites that may have changed the object's
/// size, and by the façade's `invalidate`).
pub(crate) fn invalidate_object(pool: &mut BlockPool, id: &ObjectId, max_blocks_per_object: u32) {
    for block_index in 0..max_blocks_per_object {
        pool.invalidate(id, BlockSlot::Data(block_index));
    }
    pool.invalidate(id, BlockSlot::Meta);
}
