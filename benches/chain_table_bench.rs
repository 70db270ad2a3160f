use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use chained_table::{ChainTable, TableConfig};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_insert_fresh_100k(c: &mut Criterion) {
    c.bench_function("chain_table::insert_fresh_100k", |b| {
        b.iter_batched(
            ChainTable::<String, u64>::new,
            |mut t| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    let _ = t.insert(key(x), i as u64);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_insert_presized_100k(c: &mut Criterion) {
    c.bench_function("chain_table::insert_presized_100k", |b| {
        b.iter_batched(
            || {
                let t: ChainTable<String, u64> = ChainTable::with_config(
                    TableConfig::new().initial_capacity(65_536),
                    Default::default(),
                );
                t
            },
            |mut t| {
                for (i, x) in lcg(3).take(100_000).enumerate() {
                    let _ = t.insert(key(x), i as u64);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_overwrite_10k(c: &mut Criterion) {
    c.bench_function("chain_table::overwrite_10k", |b| {
        let keys: Vec<String> = lcg(4).take(10_000).map(key).collect();
        b.iter_batched(
            || {
                let mut t = ChainTable::new();
                for (i, k) in keys.iter().enumerate() {
                    t.insert(k.clone(), i as u64);
                }
                t
            },
            |mut t| {
                for (i, k) in keys.iter().enumerate() {
                    black_box(t.insert(k.clone(), (i + 1) as u64));
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_remove_random_10k(c: &mut Criterion) {
    c.bench_function("chain_table::remove_random_10k_of_110k", |b| {
        b.iter_batched(
            || {
                let mut t = ChainTable::new();
                let keys: Vec<String> = lcg(5).take(110_000).map(key).collect();
                for (i, k) in keys.iter().enumerate() {
                    t.insert(k.clone(), i as u64);
                }
                // Precompute 10k unique indices via LCG
                let n = keys.len();
                let mut sel = std::collections::HashSet::with_capacity(10_000);
                let mut s = 0x9e3779b97f4a7c15u64;
                while sel.len() < 10_000 {
                    s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                    sel.insert((s as usize) % n);
                }
                let to_remove: Vec<String> = sel.into_iter().map(|i| keys[i].clone()).collect();
                (t, to_remove)
            },
            |(mut t, to_remove)| {
                for k in &to_remove {
                    let _ = t.remove(k);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("chain_table::get_hit", |b| {
        let mut t = ChainTable::new();
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        for (i, k) in keys.iter().enumerate() {
            t.insert(k.clone(), i as u64);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(t.get(k));
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("chain_table::get_miss", |b| {
        let mut t = ChainTable::new();
        for (i, x) in lcg(11).take(10_000).enumerate() {
            t.insert(key(x), i as u64);
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            // generate keys unlikely in the table
            let k = key(miss.next().unwrap());
            black_box(t.get(&k));
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert_fresh_100k, bench_insert_presized_100k, bench_overwrite_10k,
        bench_remove_random_10k, bench_get_hit, bench_get_miss
}
criterion_main!(benches);
