//! Cache configuration.
//!
//! Mirrors the teacher crate's per-algorithm config structs
//! (`config::LruCacheConfig` and friends): a single, dedicated struct that is
//! the one entry point for constructing the cache, with named constructors
//! instead of scattered magic numbers.
//!
//! # Deployment knobs
//!
//! [`CacheConfig::xv6_defaults`] reproduces the constants pinned by the
//! original object-filesystem's `obj_cache.c`: a 1 KiB block, 8 data blocks
//! per cacheable object (so an 8 KiB object is the largest one the cache
//! will hold), 800 pool entries, and one block of padding around a partial
//! read/write's touched window. `max_object_name_length` is not fixed by the
//! retrieved source, so it defaults to a documented, overridable value.

use core::fmt;
use core::num::NonZeroUsize;

/// Configuration for an [`crate::ObjectCache`].
///
/// All fields are validated by [`CacheConfig::new`]; once constructed, a
/// `CacheConfig` is guaranteed internally consistent (metadata block index
/// is outside the data block range, capacity is non-zero, etc).
#[derive(Clone, Copy)]
pub struct CacheConfig {
    block_size: NonZeroUsize,
    max_blocks_per_object: u32,
    pool_entries: NonZeroUsize,
    padding_blocks: u32,
    max_object_name_length: usize,
}

impl CacheConfig {
    /// Builds a configuration from explicit values.
    ///
    /// # Panics
    ///
    /// Panics if `pool_entries` is smaller than `max_blocks_per_object + 1`
    /// (a single cacheable object plus its metadata block must fit), since
    /// no useful cache could be built otherwise.
    pub fn new(
        block_size: NonZeroUsize,
        max_blocks_per_object: u32,
        pool_entries: NonZeroUsize,
        padding_blocks: u32,
        max_object_name_length: usize,
    ) -> Self {
        assert!(
            pool_entries.get() as u64 > u64::from(max_blocks_per_object),
            "pool_entries must exceed max_blocks_per_object so at least one object fits"
        );
        Self {
            block_size,
            max_blocks_per_object,
            pool_entries,
            padding_blocks,
            max_object_name_length,
        }
    }

    /// The constants pinned by the original xv6 object-filesystem cache:
    /// 1 KiB blocks, 8 blocks per cacheable object, 800 pool entries, one
    /// block of padding, and a 128-byte id limit.
    pub fn xv6_defaults() -> Self {
        Self::new(
            NonZeroUsize::new(1024).unwrap(),
            8,
            NonZeroUsize::new(800).unwrap(),
            1,
            128,
        )
    }

    /// Size in bytes of a single pool entry's data area.
    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size.get()
    }

    /// Maximum number of data blocks a cacheable object may span. Objects
    /// larger than `max_blocks_per_object * block_size` bytes are never
    /// admitted into the pool; see [`CacheConfig::max_cacheable_object_size`].
    #[inline]
    pub fn max_blocks_per_object(&self) -> u32 {
        self.max_blocks_per_object
    }

    /// Total number of preallocated pool entries.
    #[inline]
    pub fn pool_entries(&self) -> NonZeroUsize {
        self.pool_entries
    }

    /// Number of blocks of padding cached on each side of a partial
    /// read/write's touched window (see the allocation hint processor).
    #[inline]
    pub fn padding_blocks(&self) -> u32 {
        self.padding_blocks
    }

    /// Maximum length, in bytes, of an object id.
    #[inline]
    pub fn max_object_name_length(&self) -> usize {
        self.max_object_name_length
    }

    /// The reserved block index that carries an object's metadata
    /// (currently just its size). Always one past the last data block.
    #[inline]
    pub fn metadata_block_index(&self) -> u32 {
        self.max_blocks_per_object
    }

    /// Largest object size, in bytes, that the cache will admit into the
    /// pool. Larger objects are read straight through to a caller-owned
    /// buffer (optionally via the sticky one-shot disk buffer).
    #[inline]
    pub fn max_cacheable_object_size(&self) -> u64 {
        u64::from(self.max_blocks_per_object) * self.block_size.get() as u64
    }
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("block_size", &self.block_size)
            .field("max_blocks_per_object", &self.max_blocks_per_object)
            .field("pool_entries", &self.pool_entries)
            .field("padding_blocks", &self.padding_blocks)
            .field("max_object_name_length", &self.max_object_name_length)
            .finish()
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::xv6_defaults()
    }
}
