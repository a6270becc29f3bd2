// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the canvas stages of one round: building the matte
// and mask for a 1280x964 photo grown by 5%, and normalising the filled result
// back to the starting width.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use outcrop_canvas::{Raster, build_mask, build_matte, centered_offset, normalize, plan};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn photo(width: u32, height: u32) -> Raster {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    Raster::from_dynamic(DynamicImage::ImageRgb8(img))
}

fn bench_composite(c: &mut Criterion) {
    let original = photo(1280, 964);
    let p = plan(1280, 964, 1.05);
    let offset = centered_offset(1280, 964, &p);

    c.bench_function("matte (1280x964 -> 1344x1012)", |b| {
        b.iter(|| black_box(build_matte(black_box(&original), &p, offset, [0, 0, 0, 255])));
    });

    c.bench_function("mask (1280x964 -> 1344x1012)", |b| {
        b.iter(|| black_box(build_mask(black_box(&original), &p, offset)));
    });
}

fn bench_normalize(c: &mut Criterion) {
    let filled = photo(1344, 1012);

    c.bench_function("normalize (1344x1012 -> 1280)", |b| {
        b.iter(|| black_box(normalize(black_box(filled.clone()), 1280)));
    });
}

criterion_group!(benches, bench_composite, bench_normalize);
criterion_main!(benches);
