use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use image::{Rgba, RgbaImage};
use moodboard_core::prelude::*;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

fn generate_sizes(count: usize, min_size: u32, max_size: u32) -> Vec<(u32, u32)> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(count as u64);
    (0..count)
        .map(|_| {
            (
                rng.gen_range(min_size..=max_size),
                rng.gen_range(min_size..=max_size),
            )
        })
        .collect()
}

fn bench_shelf_pack(c: &mut Criterion) {
    let mut group = c.benchmark_group("shelf_pack");

    for count in [50, 200, 1000] {
        let sizes = generate_sizes(count, 64, 1024);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("canvas_4096", count), &sizes, |b, sizes| {
            b.iter(|| {
                let items = sizes
                    .iter()
                    .enumerate()
                    .map(|(i, &(w, h))| PackItem::new(i, w, h));
                black_box(pack(items, 4096, 4096))
            });
        });
    }

    group.finish();
}

fn bench_compose(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose");
    group.sample_size(20);

    for count in [3, 9] {
        let images: Vec<RgbaImage> = generate_sizes(count, 128, 512)
            .into_iter()
            .enumerate()
            .map(|(i, (w, h))| RgbaImage::from_pixel(w, h, Rgba([i as u8, 64, 128, 255])))
            .collect();
        let items = images
            .iter()
            .enumerate()
            .map(|(i, img)| PackItem::new(i, img.width(), img.height()));
        let outcome = pack(items, 2048, 2048);

        group.bench_with_input(BenchmarkId::new("board", count), &images, |b, images| {
            b.iter(|| black_box(compose(&outcome.bins, images)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_shelf_pack, bench_compose);
criterion_main!(benches);
