//! The fixed-size block pool: spec §3's "pool entry" and §4.2's
//! acquire/release contract.

use crate::flags::BlockFlags;
use crate::id::ObjectId;
use crate::lru_index::LruIndex;

/// Which block within an object a pool entry caches: one of the data
/// blocks, or the distinguished metadata block that carries only the
/// object's size (spec §3's "metadata block").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum BlockSlot {
    /// A data block, indexed `0..max_blocks_per_object`.
    Data(u32),
    /// The metadata block (tagged explicitly rather than overloading a
    /// sentinel index value in the data representation, per spec §9's
    /// design note on the original's tagged union).
    Meta,
}

/// One slot in the preallocated cache array.
pub(crate) struct PoolEntry {
    id: Option<ObjectId>,
    slot: BlockSlot,
    flags: BlockFlags,
    data: Box<[u8]>,
    len: usize,
    /// Debug bookkeeping only: catches acquire/release mismatches. Not part
    /// of the on-disk-facing state.
    acquired: bool,
}

impl PoolEntry {
    fn free(block_size: usize) -> Self {
        Self {
            id: None,
            slot: BlockSlot::Data(0),
            flags: BlockFlags::empty(),
            data: vec![0u8; block_size].into_boxed_slice(),
            len: 0,
            acquired: false,
        }
    }

    /// `true` for an unoccupied slot (spec invariant 5: empty id means free).
    pub(crate) fn is_free(&self) -> bool {
        self.id.is_none()
    }

    pub(crate) fn matches(&self, id: &ObjectId, slot: BlockSlot) -> bool {
        self.id.as_ref() == Some(id) && self.slot == slot
    }

    pub(crate) fn flags(&self) -> BlockFlags {
        self.flags
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.flags.contains(BlockFlags::VALID)
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.flags.contains(BlockFlags::DIRTY)
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub(crate) fn buf_capacity(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Marks the entry valid with `len` meaningful bytes, clearing `DIRTY`
    /// (content now matches what disk has, or is about to have).
    pub(crate) fn mark_clean(&mut self, len: usize) {
        self.len = len;
        self.flags.insert(BlockFlags::VALID);
        self.flags.remove(BlockFlags::DIRTY);
    }

    /// Marks the entry dirty after a user copy-in: newer than disk.
    pub(crate) fn mark_dirty(&mut self, len: usize) {
        self.len = len;
        self.flags.insert(BlockFlags::VALID | BlockFlags::DIRTY);
    }

    fn invalidate(&mut self) {
        self.id = None;
        self.flags = BlockFlags::empty();
        self.len = 0;
    }
}

/// The fixed-size, preallocated block pool plus its LRU ordering.
///
/// Entries are allocated once at construction (spec §3 "Lifecycle") and
/// never grow or shrink; admitting a new `(object, block)` pair always
/// means reusing the current LRU victim.
pub(crate) struct BlockPool {
    entries: Vec<PoolEntry>,
    lru: LruIndex,
}

impl BlockPool {
    pub(crate) fn new(entry_count: usize, block_size: usize) -> Self {
        let entries = (0..entry_count).map(|_| PoolEntry::free(block_size)).collect();
        Self {
            entries,
            lru: LruIndex::new(entry_count),
        }
    }

    pub(crate) fn entry(&self, idx: usize) -> &PoolEntry {
        &self.entries[idx]
    }

    pub(crate) fn entry_mut(&mut self, idx: usize) -> &mut PoolEntry {
        &mut self.entries[idx]
    }

    /// Linear scan for an entry matching `(id, slot)`. Intentionally O(n):
    /// the pool is small (hundreds to low thousands of entries) and callers
    /// always touch contiguous index ranges, so a hash index buys nothing
    /// (spec §4.1's stated rationale).
    pub(crate) fn lookup(&self, id: &ObjectId, slot: BlockSlot) -> Option<usize> {
        self.entries.iter().position(|e| e.matches(id, slot))
    }

    /// Acquires the entry for `(id, slot)`, admitting it to the pool if
    /// necessary. Returns `(index, hit)` where `hit` is `true` if the block
    /// was already cached.
    ///
    /// The victim scan skips any entry already `acquired` by the current
    /// call's working set (xv6 bio's equivalent of a nonzero `refcnt`):
    /// without this, a block acquired earlier in the same façade call (most
    /// commonly a `NO_CACHE` padding block, demoted straight to the tail on
    /// acquire) would be immediately re-picked as the victim for the very
    /// next block the same call acquires, silently aliasing two block
    /// indices onto one pool entry.
    ///
    /// # Panics
    ///
    /// Panics if every unpinned entry is still `DIRTY`, or if the whole pool
    /// is pinned by the current call's working set — both are internal-
    /// consistency violations (spec §7's "internal inconsistencies are
    /// fatal" policy); a dirty entry must already have been flushed by a
    /// prior whole-object write-back before it can ever become a victim
    /// (spec §3 "Lifecycle").
    pub(crate) fn acquire(&mut self, id: &ObjectId, slot: BlockSlot, flags: BlockFlags) -> (usize, bool) {
        if let Some(idx) = self.lookup(id, slot) {
            debug_assert!(!self.entries[idx].acquired, "double-acquire of pool entry {idx}");
            self.entries[idx].acquired = true;
            if flags.contains(BlockFlags::NO_CACHE) {
                self.lru.demote(idx);
            } else {
                self.lru.promote(idx);
            }
            self.entries[idx].flags.insert(flags);
            return (idx, true);
        }

        let idx = self
            .lru
            .iter_from_tail()
            .find(|&i| !self.entries[i].acquired)
            .expect("no free pool entry: every entry is pinned by the current call's working set");
        assert!(
            !self.entries[idx].is_dirty(),
            "pool entry {idx} was evicted while still dirty"
        );
        let entry = &mut self.entries[idx];
        entry.invalidate();
        entry.id = Some(id.clone());
        entry.slot = slot;
        entry.flags = flags;
        entry.acquired = true;
        if flags.contains(BlockFlags::NO_CACHE) {
            self.lru.demote(idx);
        } else {
            self.lru.promote(idx);
        }
        (idx, false)
    }

    /// Releases a previously-acquired entry back to the LRU list. A no-op
    /// beyond working-set bookkeeping: the single cache-wide lock means
    /// there is no pin count to maintain (spec §4.2).
    pub(crate) fn release(&mut self, idx: usize) {
        debug_assert!(self.entries[idx].acquired, "release of non-acquired pool entry {idx}");
        self.entries[idx].acquired = false;
    }

    /// Invalidates the entry for `(id, slot)` if cached, parking it at the
    /// LRU tail (spec invariant 5: free slots sit at the tail).
    pub(crate) fn invalidate(&mut self, id: &ObjectId, slot: BlockSlot) {
        if let Some(idx) = self.lookup(id, slot) {
            self.entries[idx].invalidate();
            self.lru.demote(idx);
        }
    }
}
