use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rvibrant::median_cut::ColorHist;
use rvibrant::Filter;

fn gradient(width: usize, height: usize) -> Vec<u8> {
    (0..width * height)
        .flat_map(|i| {
            let (x, y) = (i % width, i / width);
            [
                (x * 255 / width) as u8,
                (y * 255 / height) as u8,
                ((x ^ y) & 0xff) as u8,
                255,
            ]
        })
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    let pixels = gradient(1024, 768);
    let filter = Filter::default_filter();

    c.bench_function("color_hist 1024x768 quality 1", |b| {
        b.iter(|| ColorHist::from_pixels(black_box(&pixels), 1, &filter))
    });
    c.bench_function("color_hist 1024x768 quality 5", |b| {
        b.iter(|| ColorHist::from_pixels(black_box(&pixels), 5, &filter))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
