use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::RngCore;
use texture_pipeline::*;

fn random_bytes(len: usize) -> Vec<u8> {
    let mut out = vec![0; len];
    let mut rng = rand::thread_rng();
    rng.fill_bytes(&mut out);
    out
}

/// A DDS file with random data for every level.
fn random_file(format: OutputColorFormat, size: u32, levels: u32) -> Vec<u8> {
    let mut mips = MipSet::new();
    mips.width = size;
    mips.height = size;
    mips.format = format;
    mips.levels_used = levels;
    for level in 0..levels as usize {
        let width = (size >> level).max(1);
        let len = format.level_size(width, width, 1);
        mips.levels[0][level] = MipInfo {
            width,
            height: width,
            depth: 1,
            data: random_bytes(len),
        };
        mips.datasize[level] = len;
    }

    let mut file = Vec::new();
    mips.write_dds(&mut file).unwrap();
    file
}

fn bench_load(c: &mut Criterion, format: OutputColorFormat) {
    let file = random_file(format, 1024, 11);

    c.bench_function(&format!("load {} mip set", format), |b| {
        b.iter(|| {
            let result = load_dds_to_mip_set(
                black_box(&mut Cursor::new(file.as_slice())),
                &Options::default(),
            );
            black_box(result).unwrap();
        });
    });
    c.bench_function(&format!("load {} image", format), |b| {
        b.iter(|| {
            let result = load_dds(
                black_box(&mut Cursor::new(file.as_slice())),
                &RangeFitCodec,
                &Options::default(),
            );
            black_box(result).unwrap();
        });
    });
}

pub fn load(c: &mut Criterion) {
    use OutputColorFormat::*;

    for format in [ARGB8888, RGB565, AL88, FloatMap, HalfMap, DXT1, DXT5] {
        bench_load(c, format);
    }
}

pub fn write(c: &mut Criterion) {
    let file = random_file(OutputColorFormat::ARGB8888, 1024, 11);
    let mips = load_dds_to_mip_set(&mut Cursor::new(file.as_slice()), &Options::default()).unwrap();

    c.bench_function("write ARGB8888 mip set", |b| {
        let mut out = Vec::with_capacity(file.len());
        b.iter(|| {
            out.clear();
            black_box(&mips).write_dds(&mut out).unwrap();
        });
    });
}

criterion_group!(benches, load, write);
criterion_main!(benches);
