// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use bough_cache::{Cache, DownloadCache, DownloadConfig, Fetch, FetchError, InlineSpawner, Policy};
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

struct Echo;

impl Fetch for Echo {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        Ok(vec![0; url.len() * 64])
    }
}

fn bench_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("bough_cache");

    for n in [64_usize, 1024] {
        group.bench_function(format!("get_hit(n={n})"), |b| {
            let cache: Cache<usize> = Cache::new();
            let held: Vec<_> = (0..n)
                .map(|i| cache.add(i, &i, Policy::RemoveUnreferenced))
                .collect();
            let mut i = 0;
            b.iter(|| {
                i = (i + 1) % n;
                black_box(cache.get(&i));
            });
            drop(held);
        });

        // Every insert of a new key sweeps unreferenced entries first.
        group.bench_function(format!("add_with_sweep(n={n})"), |b| {
            b.iter_batched(
                || {
                    let cache: Cache<usize> = Cache::new();
                    for i in 0..n {
                        drop(cache.add(i, &i, Policy::RemoveUnreferenced));
                    }
                    cache
                },
                |cache| black_box(cache.add(n, &n, Policy::RemoveUnreferenced)),
                BatchSize::SmallInput,
            );
        });
    }

    group.bench_function("download_cached_hit", |b| {
        let downloads =
            DownloadCache::with_spawner(Arc::new(Echo), InlineSpawner, DownloadConfig::default());
        drop(downloads.download("https://example.com/hit"));
        b.iter(|| black_box(downloads.download("https://example.com/hit").wait()));
    });

    group.bench_function("download_purge(256)", |b| {
        b.iter_batched(
            || {
                let downloads = DownloadCache::with_spawner(
                    Arc::new(Echo),
                    InlineSpawner,
                    DownloadConfig::default(),
                );
                for i in 0..256 {
                    drop(downloads.download(&format!("https://example.com/{i}")));
                }
                downloads
            },
            |downloads| black_box(downloads.purge(4096)),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_cache);
criterion_main!(benches);
