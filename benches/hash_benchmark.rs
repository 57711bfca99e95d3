//! Performance benchmarks for HashEngine
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hashengine::engine::{Engine, FastPathPolicy};
use hashengine::hasher::{Algorithm, Binding};
use hashengine::module::ModuleRuntime;
use hashengine::native::NativeRuntime;
use hashengine::{EngineConfig, MAX_HEAP};

fn build_engine(rt: &tokio::runtime::Runtime, algorithm: Algorithm) -> Engine {
    rt.block_on(async {
        let binary = algorithm.artifact();
        let module = NativeRuntime::new().compile(&binary).await.unwrap();
        let instance = module.instantiate().await.unwrap();
        Engine::bind(
            binary,
            instance,
            algorithm.default_digest_size(),
            &EngineConfig::default(),
        )
        .unwrap()
    })
}

fn bench_fast_path(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("single_shot");

    for size in [64usize, 1024, MAX_HEAP - 1] {
        let data: Vec<u8> = (0..size).map(|i| (i % 256) as u8).collect();
        group.throughput(Throughput::Bytes(size as u64));

        for (label, policy) in [("fast_path", FastPathPolicy::ShortInput), ("full_sequence", FastPathPolicy::Never)] {
            let mut engine = build_engine(&rt, Algorithm::Sha256);
            group.bench_with_input(BenchmarkId::new(label, size), &data, |b, data| {
                b.iter(|| black_box(engine.calculate(data, policy, 256, 0).unwrap()));
            });
        }
    }

    group.finish();
}

fn bench_streaming(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("streaming");
    let data = vec![0xa5u8; 4 * 1024 * 1024];
    group.throughput(Throughput::Bytes(data.len() as u64));

    for algorithm in [Algorithm::Md5, Algorithm::Sha256, Algorithm::Crc32, Algorithm::Blake2s, Algorithm::Xxhash64] {
        let binding = Binding::for_algorithm(algorithm);
        let mut engine = build_engine(&rt, algorithm);
        group.bench_function(algorithm.name(), |b| {
            b.iter(|| {
                if let Some(staged) = binding.staged() {
                    engine.write_arena(staged, 0).unwrap();
                }
                engine.init(binding.init_param()).unwrap();
                engine.update(&data).unwrap();
                black_box(engine.digest(hashengine::OutputKind::Binary, 0).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut engine = build_engine(&rt, Algorithm::Blake2s);
    engine.init(256).unwrap();
    engine.update(b"snapshot me").unwrap();
    let snapshot = engine.save().unwrap();

    c.bench_function("save_load_blake2s", |b| {
        b.iter(|| {
            engine.load(black_box(&snapshot)).unwrap();
            black_box(engine.save().unwrap())
        });
    });
}

criterion_group!(benches, bench_fast_path, bench_streaming, bench_snapshot);
criterion_main!(benches);
