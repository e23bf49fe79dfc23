//! Error types surfaced by the object cache and the object store it wraps.
//!
//! The variants mirror the error kinds the on-disk object layer is expected
//! to report (see [`crate::store::ObjectStore`]); the cache itself only adds
//! [`CacheError::ObjectNameTooLong`], which it can check before ever calling
//! into disk.

/// Errors returned by [`crate::ObjectCache`] operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A lookup or mutation referred to an id that disk does not have.
    #[error("object does not exist")]
    ObjectNotExists,

    /// `add` was called for an id that disk already has.
    #[error("object already exists")]
    ObjectExists,

    /// The supplied object id is longer than the configured limit.
    #[error("object name too long: {len} bytes exceeds the {max}-byte limit")]
    ObjectNameTooLong {
        /// Length of the id that was rejected.
        len: usize,
        /// Configured limit that was exceeded.
        max: usize,
    },

    /// The disk rejected a mutation because the device is out of space.
    #[error("no space left on device")]
    NoDiskSpace,

    /// The disk has no free id slots left in its object table.
    #[error("object table is full")]
    ObjectTableFull,

    /// Any other disk failure, surfaced verbatim from the object store.
    #[error("disk I/O error: {0}")]
    Io(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, CacheError>;
