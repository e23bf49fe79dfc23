//! Hit/miss accounting, kept at façade-call granularity to match the
//! original's `cache_get_object`/`cache_object_size` behavior: one call that
//! touches several blocks counts as a single hit unless at least one of
//! those blocks had to come from disk (see
//! `examples/original_source/obj_cache.c`'s `last_object_from_disk_id`
//! sentinel, which this module's `disk_touched` flag replaces).

use std::collections::BTreeMap;
use std::fmt;

/// Running hit/miss counters for one [`crate::ObjectCache`], reported the
/// way the teacher crate's `metrics` module formats its own counters: a
/// small, ad hoc struct rather than a full metrics-crate integration.
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheMetrics {
    hits: u64,
    misses: u64,
}

impl CacheMetrics {
    /// Number of façade calls that were satisfied without touching disk.
    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of façade calls that required at least one disk read.
    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Fraction of calls that hit, `0.0` if there have been no calls yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub(crate) fn record(&mut self, disk_touched: bool) {
        if disk_touched {
            self.misses += 1;
        } else {
            self.hits += 1;
        }
    }

    /// A snapshot suitable for structured logging, keyed the way the
    /// teacher's own metrics reporting is keyed (sorted, stable field names).
    pub fn as_map(&self) -> BTreeMap<&'static str, u64> {
        let mut map = BTreeMap::new();
        map.insert("hits", self.hits);
        map.insert("misses", self.misses);
        map
    }
}

impl fmt::Display for CacheMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits={} misses={} hit_rate={:.3}",
            self.hits,
            self.misses,
            self.hit_rate()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_is_zero_with_no_calls() {
        assert_eq!(CacheMetrics::default().hit_rate(), 0.0);
    }

    #[test]
    fn records_hits_and_misses_separately() {
        let mut m = CacheMetrics::default();
        m.record(false);
        m.record(false);
        m.record(true);
        assert_eq!(m.hits(), 2);
        assert_eq!(m.misses(), 1);
        assert!((m.hit_rate() - (2.0 / 3.0)).abs() < 1e-9);
    }
}
