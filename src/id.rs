//! Object identifiers.
//!
//! An object id is a byte string, compared byte-exact, up to
//! [`CacheConfig::max_object_name_length`](crate::config::CacheConfig::max_object_name_length).
//! It is deliberately not `Hash` — the LRU index looks entries up with a
//! linear scan (see `src/lru_index.rs`), matching the xv6 cache's
//! `obj_id_cmp` loop rather than pulling in a hash table for a pool that
//! tops out in the low thousands of entries.

use std::fmt;

use crate::config::CacheConfig;
use crate::error::CacheError;

/// A validated, byte-exact object identifier.
#[derive(Clone, Eq, PartialEq)]
pub struct ObjectId(Box<[u8]>);

impl ObjectId {
    /// Validates and wraps a byte string as an object id.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ObjectNameTooLong`] if `bytes` exceeds
    /// `config.max_object_name_length()`.
    pub fn new(bytes: impl Into<Vec<u8>>, config: &CacheConfig) -> Result<Self, CacheError> {
        let bytes = bytes.into();
        let max = config.max_object_name_length();
        if bytes.len() > max {
            return Err(CacheError::ObjectNameTooLong {
                len: bytes.len(),
                max,
            });
        }
        Ok(Self(bytes.into_boxed_slice()))
    }

    /// The raw bytes of this id.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match core::str::from_utf8(&self.0) {
            Ok(s) => write!(f, "ObjectId({s:?})"),
            Err(_) => write!(f, "ObjectId({:?})", self.0),
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match core::str::from_utf8(&self.0) {
            Ok(s) => write!(f, "{s}"),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}
