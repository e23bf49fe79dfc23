//! Allocation hint processor (spec §4.3).
//!
//! A hint tells the block I/O orchestrator which blocks of an object it is
//! about to touch, and how to treat them: an ordinary read/write hits
//! [`BlockFlags::empty`], while a block that is only a transport step (a
//! block that must be read or written but never belongs in cache once the
//! call returns) is tagged [`BlockFlags::NO_CACHE`]. Grounded in the
//! hint-driven object cache's `struct bufs_alloc_hint` and
//! `obj_cache_set_contiguous_area_hints` (see
//! `examples/original_source/kernel/obj_cache.c`), translated from an
//! array-of-structs terminated by a zero-count sentinel into a plain
//! `Vec<Hint>`.

use crate::flags::BlockFlags;

/// One contiguous run of blocks sharing the same cache treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Hint {
    /// First block index covered by this hint.
    pub(crate) start: u32,
    /// Number of blocks covered, always at least 1.
    pub(crate) count: u32,
    /// Flags to apply when acquiring each covered block.
    pub(crate) flags: BlockFlags,
}

impl Hint {
    fn end(&self) -> u32 {
        self.start + self.count
    }
}

/// Builds the hint list for a partial read or write touching the byte range
/// `[offset, offset + len)` of an object whose blocks are `block_size`
/// bytes each.
///
/// The touched block range is cached normally; `padding_blocks` blocks on
/// either side are pulled in too (so a subsequent access near this one is
/// likely to hit), but tagged `NO_CACHE` since this call has no reason to
/// believe they'll be reused — mirroring
/// `obj_cache_set_contiguous_area_hints`'s padding window.
pub(crate) fn contiguous_window(
    offset: u64,
    len: usize,
    block_size: usize,
    max_blocks_per_object: u32,
    padding_blocks: u32,
) -> Vec<Hint> {
    if len == 0 {
        return Vec::new();
    }

    let block_size = block_size as u64;
    let first_touched = (offset / block_size) as u32;
    let last_touched = ((offset + len as u64 - 1) / block_size) as u32;

    let padded_start = first_touched.saturating_sub(padding_blocks);
    let padded_end = (last_touched + padding_blocks + 1).min(max_blocks_per_object);

    let mut hints = Vec::with_capacity(3);
    if padded_start < first_touched {
        hints.push(Hint {
            start: padded_start,
            count: first_touched - padded_start,
            flags: BlockFlags::NO_CACHE,
        });
    }
    hints.push(Hint {
        start: first_touched,
        count: last_touched - first_touched + 1,
        flags: BlockFlags::empty(),
    });
    if last_touched + 1 < padded_end {
        hints.push(Hint {
            start: last_touched + 1,
            count: padded_end - (last_touched + 1),
            flags: BlockFlags::NO_CACHE,
        });
    }
    hints
}

/// A single hint covering every data block of an object, used by
/// whole-object operations (add, rewrite, delete) that have no partial
/// window to preserve.
pub(crate) fn whole_object(max_blocks_per_object: u32) -> Vec<Hint> {
    vec![Hint {
        start: 0,
        count: max_blocks_per_object,
        flags: BlockFlags::empty(),
    }]
}

/// Flattens a hint list into `(block_index, flags)` pairs in ascending
/// order. Hints are expected to be ordered and non-overlapping, matching the
/// original's documented precondition on `bufs_alloc_hint` arrays.
pub(crate) fn expand(hints: &[Hint]) -> impl Iterator<Item = (u32, BlockFlags)> + '_ {
    hints.iter().flat_map(|h| (h.start..h.end()).map(move |i| (i, h.flags)))
}
