use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec4;
use rand::Rng;
use texture_pipeline::*;

fn random_image(width: u32, height: u32) -> Image {
    let mut rng = rand::thread_rng();
    let mut image = Image::new(width, height, ColorFormat::ARGB8888).unwrap();
    for y in 0..height {
        for x in 0..width {
            let color = Vec4::new(rng.gen(), rng.gen(), rng.gen(), rng.gen());
            image.write(x, y, 0, color);
        }
    }
    image
}

fn bench_mips(c: &mut Criterion, format: OutputColorFormat, filter: FilterType, size: u32) {
    let image = random_image(size, size);
    let mut options = MipGenOptions::default();
    options.output_format = format;
    options.filter = filter;
    let runtime = RuntimeSettings::default();

    let name = format!("{} {:?} {}x{}", format, filter, size, size);
    c.bench_function(&name, |b| {
        b.iter(|| {
            let mips = black_box(&image).generate_mip_set(&options, &runtime);
            black_box(mips).unwrap();
        });
    });
}

pub fn filters(c: &mut Criterion) {
    for filter in [
        FilterType::Point,
        FilterType::Box,
        FilterType::Triangle,
        FilterType::Cubic,
        FilterType::Kaiser,
        FilterType::PointComposite,
    ] {
        bench_mips(c, OutputColorFormat::ARGB8888, filter, 512);
    }
}

pub fn formats(c: &mut Criterion) {
    use OutputColorFormat::*;

    for format in [ARGB4444, RGB565, AL88, HalfMap, RGBE, DXT1, DXT5] {
        bench_mips(c, format, FilterType::Box, 512);
    }
    // padded and cropped for compression
    bench_mips(c, DXT1, FilterType::Box, 500);
}

pub fn swizzle(c: &mut Criterion) {
    let image = random_image(1024, 1024);
    let mut options = MipGenOptions::default();
    options.filter = FilterType::Box;
    let mips = image
        .generate_mip_set(&options, &RuntimeSettings::default())
        .unwrap();

    c.bench_function("swizzle ARGB8888 1024x1024", |b| {
        b.iter(|| {
            let mut mips = mips.clone();
            black_box(mips.swizzle());
        });
    });
}

criterion_group!(benches, filters, formats, swizzle);
criterion_main!(benches);
