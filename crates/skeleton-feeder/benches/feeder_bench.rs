//! Benchmarks for the skeleton feeder pipeline.
//!
//! All benchmark inputs are built from closed-form expressions and every
//! randomised transform uses a seeded `StdRng`, so benchmark numbers are
//! reproducible run to run.
//!
//! Run with:
//!
//! ```bash
//! cargo bench -p skeleton-feeder
//! ```
//!
//! Criterion HTML reports are written to `target/criterion/`.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array4;
use rand::{rngs::StdRng, SeedableRng};
use skeleton_feeder::{
    assembler::{Modality, SampleAssembler},
    dataset::{DataLoader, SkeletonDataset, SyntheticConfig, SyntheticSkeletonDataset},
    geometry::{
        bone_difference, center_on_root, compute_resize_weights, random_rot, valid_crop_resize,
        CropResize, IntervalPolicy,
    },
    metrics::top_k,
    skeleton::{BoneTree, NTU_ROOT_JOINT, NUM_JOINTS, NUM_PERSONS},
};

/// One 300-frame NTU-sized sequence with `n_valid` valid frames.
fn sequence(n_valid: usize) -> Array4<f32> {
    Array4::from_shape_fn((3, 300, NUM_JOINTS, NUM_PERSONS), |(c, t, v, p)| {
        if t >= n_valid {
            0.0
        } else {
            1.0 + (c + v + p) as f32 * 0.01 + t as f32 * 0.001
        }
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Geometry benchmarks
// ─────────────────────────────────────────────────────────────────────────────

/// Crop/resize of one sequence to 64 frames for varying valid lengths.
fn bench_crop_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("valid_crop_resize");
    let crop = CropResize {
        interval: IntervalPolicy::Random { low: 0.5, high: 1.0 },
        ..CropResize::default()
    };

    for n_valid in [32_usize, 103, 300] {
        let data = sequence(n_valid);
        group.bench_with_input(BenchmarkId::new("valid", n_valid), &n_valid, |b, &n| {
            let mut rng = StdRng::seed_from_u64(0);
            b.iter(|| {
                let _ = valid_crop_resize(black_box(data.view()), n, &crop, &mut rng);
            });
        });
    }

    group.finish();
}

fn bench_resize_weights(c: &mut Criterion) {
    c.bench_function("compute_resize_weights_300_64", |b| {
        b.iter(|| {
            let _ = compute_resize_weights(black_box(300), black_box(64));
        });
    });
}

fn bench_transforms(c: &mut Criterion) {
    let data = sequence(64).slice(ndarray::s![.., ..64, .., ..]).to_owned();
    let tree = BoneTree::ntu();
    let mut rng = StdRng::seed_from_u64(0);

    c.bench_function("random_rot_64", |b| {
        b.iter(|| {
            let _ = random_rot(black_box(&data), 0.3, &mut rng);
        });
    });
    c.bench_function("bone_difference_64", |b| {
        b.iter(|| {
            let _ = bone_difference(black_box(&data), &tree);
        });
    });
    c.bench_function("center_on_root_64", |b| {
        b.iter(|| {
            let _ = center_on_root(black_box(&data), NTU_ROOT_JOINT);
        });
    });
}

// ─────────────────────────────────────────────────────────────────────────────
// Pipeline benchmarks
// ─────────────────────────────────────────────────────────────────────────────

/// Full per-sample pipeline in both modalities.
fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble");
    let data = sequence(150);

    for modality in [Modality::Joint, Modality::Bone] {
        let asm = SampleAssembler::new(
            CropResize {
                interval: IntervalPolicy::Random { low: 0.5, high: 1.0 },
                ..CropResize::default()
            },
            true,
            0.3,
            modality,
            true,
            BoneTree::ntu(),
        );
        group.bench_function(format!("{modality:?}"), |b| {
            let mut rng = StdRng::seed_from_u64(0);
            b.iter(|| {
                let _ = asm.assemble(black_box(data.view()), &mut rng);
            });
        });
    }

    group.finish();
}

/// Full-epoch batched iteration at varying dataset sizes.
fn bench_synthetic_epoch(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthetic_epoch");

    for n_samples in [64_usize, 256] {
        let dataset = SyntheticSkeletonDataset::new(n_samples, SyntheticConfig::default())
            .expect("default synthetic config must be valid");

        group.bench_with_input(BenchmarkId::new("samples", n_samples), &n_samples, |b, _| {
            b.iter(|| {
                let loader = DataLoader::new(&dataset, 32, true, 42);
                let n: usize = loader.iter().filter_map(Result::ok).map(|batch| batch.len()).sum();
                black_box(n);
            });
        });
    }

    group.finish();
}

fn bench_synthetic_get(c: &mut Criterion) {
    let dataset = SyntheticSkeletonDataset::new(1000, SyntheticConfig::default())
        .expect("default synthetic config must be valid");

    c.bench_function("synthetic_dataset_get", |b| {
        b.iter(|| {
            let _ = dataset.get(black_box(42)).expect("sample 42 must exist");
        });
    });
}

// ─────────────────────────────────────────────────────────────────────────────
// Metric benchmarks
// ─────────────────────────────────────────────────────────────────────────────

fn bench_top_k(c: &mut Criterion) {
    let n = 16_487_usize;
    let scores = ndarray::Array2::from_shape_fn((n, 60), |(i, j)| ((i * 31 + j * 17) % 97) as f32);
    let labels: Vec<usize> = (0..n).map(|i| i % 60).collect();

    c.bench_function("top5_ntu60_xsub_test", |b| {
        b.iter(|| {
            let _ = top_k(black_box(scores.view()), &labels, 5);
        });
    });
}

criterion_group!(
    benches,
    bench_crop_resize,
    bench_resize_weights,
    bench_transforms,
    bench_assemble,
    bench_synthetic_epoch,
    bench_synthetic_get,
    bench_top_k,
);
criterion_main!(benches);
