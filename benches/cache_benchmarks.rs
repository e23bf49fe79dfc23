// Benchmarks for the object cache's façade operations under criterion.
use std::collections::HashMap;
use std::num::NonZeroUsize;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use obj_cache::{CacheConfig, CacheError, ObjectCache, ObjectId, ObjectStore};

struct MemStore {
    block_size: usize,
    objects: HashMap<Vec<u8>, Vec<u8>>,
}

impl MemStore {
    fn new(block_size: usize) -> Self {
        Self { block_size, objects: HashMap::new() }
    }
}

impl ObjectStore for MemStore {
    fn object_size(&self, id: &ObjectId) -> Result<u64, CacheError> {
        self.objects.get(id.as_bytes()).map(|d| d.len() as u64).ok_or(CacheError::ObjectNotExists)
    }

    fn get_object(&self, id: &ObjectId, block_index: u32, buf: &mut [u8]) -> Result<usize, CacheError> {
        let data = self.objects.get(id.as_bytes()).ok_or(CacheError::ObjectNotExists)?;
        let start = block_index as usize * self.block_size;
        if start >= data.len() {
            return Ok(0);
        }
        let end = (start + buf.len()).min(data.len());
        let n = end - start;
        buf[..n].copy_from_slice(&data[start..end]);
        Ok(n)
    }

    fn add_object(&mut self, id: &ObjectId) -> Result<(), CacheError> {
        self.objects.insert(id.as_bytes().to_vec(), Vec::new());
        Ok(())
    }

    fn write_object(&mut self, id: &ObjectId, block_index: u32, buf: &[u8]) -> Result<(), CacheError> {
        let data = self.objects.get_mut(id.as_bytes()).ok_or(CacheError::ObjectNotExists)?;
        let start = block_index as usize * self.block_size;
        if data.len() < start + buf.len() {
            data.resize(start + buf.len(), 0);
        }
        data[start..start + buf.len()].copy_from_slice(buf);
        Ok(())
    }

    fn delete_object(&mut self, id: &ObjectId) -> Result<(), CacheError> {
        self.objects.remove(id.as_bytes()).map(|_| ()).ok_or(CacheError::ObjectNotExists)
    }

    fn rewrite_object(&mut self, id: &ObjectId, new_size: u64) -> Result<(), CacheError> {
        let data = self.objects.get_mut(id.as_bytes()).ok_or(CacheError::ObjectNotExists)?;
        data.resize(new_size as usize, 0);
        Ok(())
    }
}

const POOL_ENTRIES: usize = 1_000;
const BLOCK_SIZE: usize = 1024;
const OBJECT_COUNT: usize = 200;

fn populated_cache() -> (ObjectCache<MemStore>, Vec<ObjectId>) {
    let config = CacheConfig::new(
        NonZeroUsize::new(BLOCK_SIZE).unwrap(),
        8,
        NonZeroUsize::new(POOL_ENTRIES).unwrap(),
        1,
        64,
    );
    let cache = ObjectCache::new(MemStore::new(BLOCK_SIZE), config);
    let ids: Vec<_> = (0..OBJECT_COUNT)
        .map(|i| {
            let id = cache.object_id(format!("obj-{i}")).unwrap();
            cache.add(&id, &vec![i as u8; BLOCK_SIZE * 2]).unwrap();
            id
        })
        .collect();
    (cache, ids)
}

fn bench_read_hit(c: &mut Criterion) {
    let (cache, ids) = populated_cache();
    let mut buf = vec![0u8; BLOCK_SIZE];
    // Warm every entry once so the benchmark measures cache hits.
    for id in &ids {
        cache.read(id, 0, &mut buf).unwrap();
    }

    c.bench_function("read_hit", |b| {
        b.iter(|| {
            for id in &ids {
                let n = cache.read(black_box(id), 0, &mut buf).unwrap();
                black_box(n);
            }
        });
    });
}

fn bench_write_through(c: &mut Criterion) {
    let (cache, ids) = populated_cache();
    let payload = vec![0xAAu8; BLOCK_SIZE];

    c.bench_function("write_through", |b| {
        b.iter(|| {
            for id in &ids {
                cache.write(black_box(id), 0, black_box(&payload)).unwrap();
            }
        });
    });
}

fn bench_size_query(c: &mut Criterion) {
    let (cache, ids) = populated_cache();

    c.bench_function("size_query", |b| {
        b.iter(|| {
            for id in &ids {
                black_box(cache.size(black_box(id)).unwrap());
            }
        });
    });
}

criterion_group!(benches, bench_read_hit, bench_write_through, bench_size_query);
criterion_main!(benches);
