//! End-to-end scenarios straight out of the xv6 object cache's test corpus
//! (`examples/original_source/obj_fs_tests.c`), lettered A-F to match the
//! scenario list this crate's design document enumerates.

mod common;

use std::num::NonZeroUsize;

use common::MemStore;
use obj_cache::{CacheConfig, CacheError, ObjectCache};

fn config(block_size: usize, max_blocks: u32, pool_entries: usize, padding: u32) -> CacheConfig {
    CacheConfig::new(
        NonZeroUsize::new(block_size).unwrap(),
        max_blocks,
        NonZeroUsize::new(pool_entries).unwrap(),
        padding,
        64,
    )
}

/// Scenario A: round trip. `add("greet", "hello")` then a full read returns
/// exactly what was written, and the second read of the same object is a hit.
#[test]
fn scenario_a_round_trip() {
    let cache = ObjectCache::new(MemStore::new(8), config(8, 4, 16, 1));
    let id = cache.object_id("greet").unwrap();
    cache.add(&id, b"hello").unwrap();

    let mut buf = [0u8; 5];
    let n = cache.read(&id, 0, &mut buf).unwrap();
    assert_eq!(n, 5);
    assert_eq!(&buf, b"hello");

    let hits_before = cache.metrics().hits();
    let n = cache.read(&id, 0, &mut buf).unwrap();
    assert_eq!(n, 5);
    assert_eq!(&buf, b"hello");
    assert_eq!(cache.metrics().hits(), hits_before + 1);
}

/// Scenario B: partial overwrite. Object "alpha", 26 bytes of the alphabet;
/// overwriting 4 bytes at offset 2 leaves everything else untouched.
#[test]
fn scenario_b_partial_overwrite() {
    let cache = ObjectCache::new(MemStore::new(8), config(8, 8, 32, 1));
    let id = cache.object_id("alpha").unwrap();
    cache.add(&id, b"abcdefghijklmnopqrstuvwxyz").unwrap();

    cache.write(&id, 2, b"1234").unwrap();

    let mut buf = [0u8; 26];
    let n = cache.read(&id, 0, &mut buf).unwrap();
    assert_eq!(n, 26);
    assert_eq!(&buf, b"ab1234ghijklmnopqrstuvwxyz");
}

/// Scenario C: append grow. Writing past the current end extends the object
/// and the new size is reported thereafter.
#[test]
fn scenario_c_append_grow() {
    let cache = ObjectCache::new(MemStore::new(8), config(8, 4, 16, 1));
    let id = cache.object_id("log").unwrap();
    cache.add(&id, b"abc").unwrap();

    cache.write(&id, 3, b"123").unwrap();

    let mut buf = [0u8; 6];
    let n = cache.read(&id, 0, &mut buf).unwrap();
    assert_eq!(n, 6);
    assert_eq!(&buf, b"abc123");
    assert_eq!(cache.size(&id).unwrap(), 6);
}

/// Scenario D: delete. After deletion the id is gone from both cache and disk.
#[test]
fn scenario_d_delete() {
    let cache = ObjectCache::new(MemStore::new(8), config(8, 4, 16, 1));
    let id = cache.object_id("tmp").unwrap();
    cache.add(&id, b"x").unwrap();

    cache.delete(&id).unwrap();

    assert!(matches!(cache.size(&id), Err(CacheError::ObjectNotExists)));
}

/// Scenario E: uncacheable size. An object larger than the configured
/// max-cacheable size is read straight through on every call (both misses),
/// and still returns the right bytes.
#[test]
fn scenario_e_uncacheable_size() {
    // max cacheable size = 4 blocks * 8 bytes = 32 bytes.
    let cache = ObjectCache::new(MemStore::new(8), config(8, 4, 16, 1));
    let id = cache.object_id("big").unwrap();
    let payload: Vec<u8> = (0u8..64).collect();
    cache.add(&id, &payload).unwrap();
    assert!(u64::from(payload.len() as u32) > cache.config().max_cacheable_object_size());

    let mut buf = vec![0u8; payload.len()];

    let misses_before = cache.metrics().misses();
    let n = cache.read(&id, 0, &mut buf).unwrap();
    assert_eq!(n, payload.len());
    assert_eq!(buf, payload);
    let misses_after_first = cache.metrics().misses();
    assert_eq!(misses_after_first, misses_before + 1);

    // Second read of the *same* oversized object is served from the sticky
    // one-shot buffer rather than hitting disk again, but is still recorded
    // as a miss (it never touched the block pool).
    let n = cache.read(&id, 0, &mut buf).unwrap();
    assert_eq!(n, payload.len());
    assert_eq!(buf, payload);
}

/// Scenario F: eviction. Filling the pool with `N+1` distinct objects evicts
/// the least-recently-used one; reading it again is a miss, while the most
/// recently read object is still a hit.
#[test]
fn scenario_f_eviction() {
    // 1 data block + 1 metadata block per object => pool of 2*N entries
    // holds exactly N objects.
    const N: usize = 4;
    let cache = ObjectCache::new(MemStore::new(8), config(8, 1, 2 * N, 0));

    let ids: Vec<_> = (0..=N).map(|i| cache.object_id(format!("o{i}")).unwrap()).collect();
    for id in &ids {
        cache.add(id, b"x").unwrap();
        // Adding already pulls this object's data block into the pool;
        // clear it so the read loop below starts from a cold cache, matching
        // the scenario's premise of reading N+1 *already-written* objects.
        cache.invalidate(id);
    }

    let mut buf = [0u8; 1];
    for id in &ids {
        cache.read(id, 0, &mut buf).unwrap();
    }

    // o0 was the least-recently-used object's worth of blocks by the time
    // o[N] was read, so re-reading it now must miss again.
    let misses_before = cache.metrics().misses();
    cache.read(&ids[0], 0, &mut buf).unwrap();
    assert_eq!(cache.metrics().misses(), misses_before + 1);

    // The most recently read object is still cached.
    let hits_before = cache.metrics().hits();
    cache.read(&ids[N], 0, &mut buf).unwrap();
    assert_eq!(cache.metrics().hits(), hits_before + 1);
}

/// Property 7: a failed write leaves the cache and disk holding the
/// pre-write bytes, and the next read returns them unchanged.
#[test]
fn failed_write_leaves_prior_bytes_intact() {
    let (store, fail_switch) = MemStore::with_fail_switch(8);
    let cache = ObjectCache::new(store, config(8, 4, 16, 1));
    let id = cache.object_id("fragile").unwrap();
    cache.add(&id, b"before").unwrap();

    fail_switch.fail_next_write();
    assert!(cache.write(&id, 0, b"after!").is_err());

    let mut buf = [0u8; 6];
    let n = cache.read(&id, 0, &mut buf).unwrap();
    assert_eq!(n, 6);
    assert_eq!(&buf, b"before");
}
