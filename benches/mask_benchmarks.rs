use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use maskgate::authz::decision::authorize;
use maskgate::core::{RoleMask, RoleVocabulary};

fn vocabulary(size: usize) -> RoleVocabulary {
    RoleVocabulary::new((0..size).map(|i| format!("role_{i}"))).unwrap()
}

fn bench_mask_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("mask_codec");

    // Benchmark different vocabulary sizes
    for size in [4, 16, 64].iter() {
        let vocabulary = vocabulary(*size);
        let roles: Vec<String> = vocabulary.iter().step_by(2).map(str::to_string).collect();
        let mask: RoleMask = vocabulary.encode(&roles);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("encode", size), size, |b, _size| {
            b.iter(|| vocabulary.encode(black_box(&roles)));
        });

        group.bench_with_input(BenchmarkId::new("decode", size), size, |b, _size| {
            b.iter(|| vocabulary.decode(black_box(mask)));
        });

        group.bench_with_input(BenchmarkId::new("has_any", size), size, |b, _size| {
            b.iter(|| vocabulary.has_any(black_box(mask), ["role_1", "role_2"]));
        });
    }
    group.finish();
}

fn bench_authorize(c: &mut Criterion) {
    let mut group = c.benchmark_group("authorize");

    let actual = ["download", "fork", "edit"];

    group.bench_function("allowed", |b| {
        b.iter(|| authorize("roles", black_box(&["delete", "edit"]), black_box(&actual)).is_ok());
    });

    group.bench_function("denied_with_message", |b| {
        b.iter(|| {
            authorize("roles", black_box(&["delete", "admin"]), black_box(&actual))
                .map_err(|denied| denied.to_string())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_mask_codec, bench_authorize);

criterion_main!(benches);
