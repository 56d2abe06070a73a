use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use uniresolve_core::{PackageDescriptor, Registry, Resolver, ResolverSettings};
use uniresolve_util::path::{normalize, relative_to};

/// A monorepo with `count` packages named `pkg-0`..`pkg-N`.
fn monorepo(count: usize) -> (TempDir, PathBuf, Registry) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    let descriptors = (0..count)
        .map(|i| {
            let pkg = root.join("packages").join(format!("pkg-{i}"));
            fs::create_dir_all(pkg.join("src")).unwrap();
            fs::write(pkg.join("src/index.js"), "").unwrap();
            PackageDescriptor::new(pkg)
                .with_name(format!("pkg-{i}"))
                .with_dest("dist")
        })
        .collect();
    let registry = Registry::from_descriptors(descriptors).unwrap();
    (dir, root, registry)
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    for count in [4, 32, 256] {
        let (_dir, root, registry) = monorepo(count);
        let resolver = Resolver::new(ResolverSettings::default(), registry);
        let origin = root.join("packages/pkg-0/src/index.js");
        let last = format!("pkg-{}/lib/util", count - 1);

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("prefix", count), &origin, |b, origin| {
            b.iter(|| resolver.resolve(black_box("~/lib/util"), origin, true));
        });
        group.bench_with_input(BenchmarkId::new("cross_package", count), &origin, |b, origin| {
            b.iter(|| resolver.resolve(black_box(&last), origin, true));
        });
        group.bench_with_input(BenchmarkId::new("module", count), &origin, |b, origin| {
            b.iter(|| resolver.resolve(black_box("react"), origin, true));
        });
    }

    group.finish();
}

fn bench_path_algebra(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_algebra");
    let path = Path::new("/repo/packages/pkg-a/src/./lib/../util/index.js");
    let base = Path::new("/repo/packages/pkg-c/src/components/button");

    group.bench_function("normalize", |b| b.iter(|| normalize(black_box(path))));
    group.bench_function("relative_to", |b| {
        b.iter(|| relative_to(black_box(path), black_box(base)));
    });

    group.finish();
}

criterion_group!(benches, bench_resolve, bench_path_algebra);
criterion_main!(benches);
