use criterion::{
    black_box, BatchSize, BenchmarkId, Criterion, Throughput, {criterion_group, criterion_main},
};
use unionx::{variant_schema, Handle, UnionStore};

variant_schema! {
    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Value {
        Flag(u8),
        Int(i32),
        Float(f64),
        Block([u64; 8]),
    }
}

fn value(n: u64) -> Value {
    match n % 4 {
        0 => Value::Flag(n as u8),
        1 => Value::Int(n as i32),
        2 => Value::Float(n as f64),
        _ => Value::Block([n; 8]),
    }
}

fn filled(size: u64) -> (UnionStore<'static, Value>, Vec<Handle>) {
    let mut store = UnionStore::new().unwrap();
    let handles = (0..size).map(|n| store.append(&value(n)).unwrap()).collect();
    (store, handles)
}

fn append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");
    for size in [100u64, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*size));
        group.bench_with_input(BenchmarkId::new("unionx", size), size, |b, &size| {
            b.iter(|| filled(size))
        });
        // Baseline: one maximally sized slot per value.
        group.bench_with_input(BenchmarkId::new("vec", size), size, |b, &size| {
            b.iter(|| (0..size).map(value).collect::<Vec<Value>>())
        });
    }
    group.finish();
}

fn get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    for size in [100u64, 1_000, 10_000].iter() {
        let (store, handles) = filled(*size);
        group.throughput(Throughput::Elements(*size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &handles, |b, handles| {
            b.iter(|| {
                for h in handles {
                    black_box(store.get(*h).unwrap());
                }
            })
        });
    }
    group.finish();
}

fn swap_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("swap_remove");
    for size in [100u64, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*size));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter_batched(
                || filled(size),
                // Removing in reverse append order never relocates a slot
                // that a later handle still names.
                |(mut store, handles)| {
                    for h in handles.iter().rev() {
                        black_box(store.swap_remove(*h).unwrap());
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, append, get, swap_remove);
criterion_main!(benches);
