use buffer::Buffer;
use criterion::{criterion_group, criterion_main, Criterion};

const N: u64 = 10_000;
const VAL_SIZE: usize = 100;

fn buffer_put_sequential(c: &mut Criterion) {
    c.bench_function("buffer_put_10k_sequential", |b| {
        b.iter(|| {
            let mut buf = Buffer::new();
            for i in 0..N {
                buf.put(format!("k{:06}", i).into_bytes(), vec![b'x'; VAL_SIZE])
                    .unwrap();
            }
        });
    });
}

fn buffer_get_hit(c: &mut Criterion) {
    let mut buf = Buffer::new();
    for i in 0..N {
        buf.put(format!("k{:06}", i).into_bytes(), vec![b'x'; VAL_SIZE])
            .unwrap();
    }

    c.bench_function("buffer_get_hit_10k", |b| {
        b.iter(|| {
            for i in 0..N {
                let key = format!("k{:06}", i).into_bytes();
                criterion::black_box(buf.get(&key));
            }
        });
    });
}

fn buffer_get_miss(c: &mut Criterion) {
    let mut buf = Buffer::new();
    for i in 0..N {
        buf.put(format!("k{:06}", i).into_bytes(), vec![b'x'; VAL_SIZE])
            .unwrap();
    }

    c.bench_function("buffer_get_miss_10k", |b| {
        b.iter(|| {
            for i in 0..N {
                let key = format!("miss{:06}", i).into_bytes();
                criterion::black_box(buf.get(&key));
            }
        });
    });
}

fn buffer_overwrite_same_key(c: &mut Criterion) {
    c.bench_function("buffer_overwrite_same_key_10k", |b| {
        b.iter(|| {
            let mut buf = Buffer::new();
            for _ in 0..N {
                buf.put(b"k".to_vec(), vec![b'x'; VAL_SIZE]).unwrap();
            }
        });
    });
}

fn buffer_drain_sorted(c: &mut Criterion) {
    c.bench_function("buffer_drain_sorted_10k", |b| {
        b.iter(|| {
            let mut buf = Buffer::new();
            for i in 0..N {
                buf.put(format!("k{:06}", i).into_bytes(), vec![b'x'; VAL_SIZE])
                    .unwrap();
            }
            criterion::black_box(buf.drain_sorted());
        });
    });
}

fn buffer_iter(c: &mut Criterion) {
    let mut buf = Buffer::new();
    for i in 0..N {
        buf.put(format!("k{:06}", i).into_bytes(), vec![b'x'; VAL_SIZE])
            .unwrap();
    }

    c.bench_function("buffer_iter_10k", |b| {
        b.iter(|| {
            let count = buf.iter().count();
            criterion::black_box(count);
        });
    });
}

criterion_group!(
    benches,
    buffer_put_sequential,
    buffer_get_hit,
    buffer_get_miss,
    buffer_overwrite_same_key,
    buffer_drain_sorted,
    buffer_iter,
);

criterion_main!(benches);
