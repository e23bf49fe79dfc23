//! Pool entry flags.

use bitflags::bitflags;

bitflags! {
    /// Flags carried by a single pool entry, matching the `B_VALID`/`B_DIRTY`
    /// flags on the original `struct buf`, plus the cache-specific
    /// `NO_CACHE` hint described in spec §3/§4.3.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BlockFlags: u8 {
        /// Data area matches on-disk content for this block (unless also `DIRTY`).
        const VALID = 0b001;
        /// Content is newer than disk and must be flushed before this entry
        /// can be invalidated or reused.
        const DIRTY = 0b010;
        /// This entry was acquired to transport data through and must be
        /// parked at the LRU tail immediately on release.
        const NO_CACHE = 0b100;
    }
}
