use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{DynamicImage, Rgba, RgbaImage};
use rvibrant::{Palette, Result, Vibrant};

fn image() -> DynamicImage {
    let img = RgbaImage::from_fn(800, 600, |x, y| {
        Rgba([
            (x * 255 / 800) as u8,
            (y * 255 / 600) as u8,
            ((x + y) % 256) as u8,
            255,
        ])
    });
    DynamicImage::ImageRgba8(img)
}

fn palette(vibrant: &Vibrant) -> Result<Palette> {
    vibrant.palette()
}

fn criterion_benchmark(c: &mut Criterion) {
    let img = image();
    let vibrant = Vibrant::from_image(&img);
    let scaled = Vibrant::from_image(&img).max_dimension(256);

    c.bench_function("palette 800x600", |b| {
        b.iter(|| palette(black_box(&vibrant)))
    });
    c.bench_function("palette 800x600 max_dimension 256", |b| {
        b.iter(|| palette(black_box(&scaled)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
