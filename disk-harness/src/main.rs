//! A small CLI for driving an [`obj_cache::ObjectCache`] over an in-memory
//! disk, in the spirit of the teacher crate's `cache-simulator` binary.

use clap::{Parser, Subcommand};
use obj_cache::{CacheConfig, ObjectCache};
use rand::{Rng, SeedableRng};

use disk_harness::MemoryDisk;

/// Drives an object cache against an in-memory disk.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Preallocated pool entries.
    #[arg(long, default_value = "800")]
    pool_entries: usize,

    /// Block size in bytes.
    #[arg(long, default_value = "1024")]
    block_size: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an object, write `data` to it, read it back, and print what came out.
    Roundtrip {
        /// Object id.
        id: String,
        /// Data to write, interpreted as raw bytes of the given string.
        data: String,
    },
    /// Run `operations` random add/write/read/delete calls and report hit rate.
    Fuzz {
        /// Number of operations to perform.
        #[arg(default_value = "10000")]
        operations: usize,
        /// Number of distinct object ids to cycle through.
        #[arg(long, default_value = "64")]
        ids: usize,
        /// RNG seed, for reproducible runs.
        #[arg(long, default_value = "0")]
        seed: u64,
    },
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let config = CacheConfig::new(
        std::num::NonZeroUsize::new(args.block_size).expect("block size must be nonzero"),
        8,
        std::num::NonZeroUsize::new(args.pool_entries).expect("pool entries must be nonzero"),
        1,
        128,
    );
    let disk = MemoryDisk::new(4096, 256 * 1024 * 1024);
    let cache = ObjectCache::new(disk, config);

    match args.command {
        Commands::Roundtrip { id, data } => roundtrip(&cache, &id, data.as_bytes()),
        Commands::Fuzz { operations, ids, seed } => fuzz(&cache, operations, ids, seed),
    }
}

fn roundtrip(cache: &ObjectCache<MemoryDisk>, id: &str, data: &[u8]) {
    let object_id = cache.object_id(id).expect("id within configured length limit");
    cache.add(&object_id, data).expect("add");

    let mut buf = vec![0u8; data.len()];
    let n = cache.read(&object_id, 0, &mut buf).expect("read");
    log::info!("read {n} bytes back: {:?}", String::from_utf8_lossy(&buf[..n]));
    println!("{}", String::from_utf8_lossy(&buf[..n]));
}

fn fuzz(cache: &ObjectCache<MemoryDisk>, operations: usize, ids: usize, seed: u64) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let names: Vec<_> = (0..ids).map(|i| format!("obj-{i}")).collect();
    let mut created = vec![false; ids];

    for _ in 0..operations {
        let idx = rng.gen_range(0..ids);
        let id = cache.object_id(&names[idx]).unwrap();
        match rng.gen_range(0..4) {
            0 if !created[idx] => {
                if cache.add(&id, &[]).is_ok() {
                    created[idx] = true;
                }
            }
            1 if created[idx] => {
                let len = rng.gen_range(1..512);
                let data: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
                let offset = rng.gen_range(0..4096);
                let _ = cache.write(&id, offset, &data);
            }
            2 if created[idx] => {
                let mut buf = vec![0u8; 256];
                let _ = cache.read(&id, 0, &mut buf);
            }
            3 if created[idx] => {
                if cache.delete(&id).is_ok() {
                    created[idx] = false;
                }
            }
            _ => {}
        }
    }

    let metrics = cache.metrics();
    println!("{operations} operations over {ids} ids: {metrics}");
}
