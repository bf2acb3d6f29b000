use std::io::{Cursor, ErrorKind};

use glam::Vec4;
use texture_pipeline::*;

mod util;

fn load_mips(file: &[u8]) -> Result<MipSet, DecodeError> {
    load_dds_to_mip_set(&mut Cursor::new(file), &Options::default())
}

fn load_image(file: &[u8], options: &Options) -> Result<Image, DecodeError> {
    load_dds(&mut Cursor::new(file), &RangeFitCodec, options)
}

fn assert_same_data(a: &MipSet, b: &MipSet) {
    assert_eq!((a.width, a.height, a.depth), (b.width, b.height, b.depth));
    assert_eq!(a.texture_type, b.texture_type);
    assert_eq!(a.levels_used, b.levels_used);
    assert_eq!(a.datasize, b.datasize);
    for (face_a, face_b) in a.faces().zip(b.faces()) {
        for (level, (a, b)) in face_a.iter().zip(face_b).enumerate() {
            assert_eq!(a.data, b.data, "level {}", level);
            assert_eq!((a.width, a.height), (b.width, b.height), "level {}", level);
        }
    }
}

fn l16_file(values: &[u16; 4]) -> Vec<u8> {
    let header = Header {
        flags: DdsFlags::REQUIRED | DdsFlags::PITCH,
        height: 2,
        width: 2,
        pitch_or_linear_size: 4,
        depth: None,
        mipmap_count: 0,
        pixel_format: PixelFormat::new_masks(PixelFormatFlags::LUMINANCE, 16, [0xFFFF, 0, 0, 0]),
        caps: DdsCaps::TEXTURE,
        caps2: DdsCaps2::empty(),
    };
    let mut file = Vec::new();
    header.write(&mut file).unwrap();
    for v in values {
        file.extend_from_slice(&v.to_le_bytes());
    }
    file
}

#[test]
fn mip_sets_round_trip() {
    let mut rng = util::create_rng();
    let image = util::random_image(&mut rng, 16, 16, ColorFormat::ARGB8888);

    for format in OutputColorFormat::ALL {
        let mips = image
            .generate_mip_set(&util::options(format), &RuntimeSettings::default())
            .unwrap();
        let file = util::write_to_vec(&mips);

        let data_len: usize = mips.datasize.iter().sum();
        assert_eq!(file.len(), 128 + data_len, "{}", format);

        let loaded = load_mips(&file).unwrap();
        let expected = match format {
            OutputColorFormat::RGBE => OutputColorFormat::ARGB8888,
            _ => format,
        };
        assert_eq!(loaded.format, expected);
        assert!(!loaded.swizzled);
        assert_same_data(&mips, &loaded);
    }
}

#[test]
fn non_square_levels_round_trip() {
    let image = util::random_image(&mut util::create_rng(), 32, 4, ColorFormat::ARGB8888);
    let mips = image
        .generate_mip_set(
            &util::options(OutputColorFormat::ARGB1555),
            &RuntimeSettings::default(),
        )
        .unwrap();
    assert_eq!(mips.levels_used, 6);

    let loaded = load_mips(&util::write_to_vec(&mips)).unwrap();
    assert_same_data(&mips, &loaded);
    assert_eq!(
        (loaded.levels[0][5].width, loaded.levels[0][5].height),
        (1, 1)
    );
}

#[test]
fn rgbe_needs_an_option() {
    let image = util::solid_image(4, 4, Vec4::new(4.0, 2.0, 0.5, 1.0));
    let mips = image
        .generate_mip_set(
            &util::options(OutputColorFormat::RGBE),
            &RuntimeSettings::default(),
        )
        .unwrap();
    let file = util::write_to_vec(&mips);

    let mut options = Options::default();
    options.argb8888_as_rgbe = true;
    let loaded = load_dds_to_mip_set(&mut Cursor::new(&file), &options).unwrap();
    assert_eq!(loaded.format, OutputColorFormat::RGBE);
    assert_same_data(&mips, &loaded);

    let hdr = load_image(&file, &options).unwrap();
    assert_eq!(hdr.format(), ColorFormat::RGBE);
    util::assert_close(hdr.read(3, 3, 0), Vec4::new(4.0, 2.0, 0.5, 1.0), 0.05);
}

#[test]
fn padded_rows_are_stripped() {
    let mut options = util::options(OutputColorFormat::A8);
    options.levels = 1;
    let image = util::random_image(&mut util::create_rng(), 4, 4, ColorFormat::ARGB8888);
    let mips = image.generate_mip_set(&options, &RuntimeSettings::default()).unwrap();
    let file = util::write_to_vec(&mips);

    let mut padded = file[..128].to_vec();
    util::set_header_int(&mut padded, 5, 8);
    for row in file[128..].chunks_exact(4) {
        padded.extend_from_slice(row);
        padded.extend_from_slice(&[0xAB; 4]);
    }

    let decoder = DdsDecoder::new(&mut Cursor::new(&padded)).unwrap();
    assert_eq!(decoder.layout().main().row_pitch, Some(8));
    assert_eq!(decoder.layout().data_len(), 32);

    let loaded = load_mips(&padded).unwrap();
    assert_eq!(loaded.levels[0][0].data, mips.levels[0][0].data);
    assert_eq!(loaded.datasize[0], 16);
}

#[test]
fn cube_maps_round_trip() {
    let mut rng = util::create_rng();
    let mut cube = Image::new_with_depth(8, 8, 0, ColorFormat::ARGB8888).unwrap();
    for face in 0..CUBE_NUM_FACES {
        util::fill_random(&mut rng, &mut cube, face);
    }

    let mips = cube
        .generate_mip_set(
            &util::options(OutputColorFormat::ARGB8888),
            &RuntimeSettings::default(),
        )
        .unwrap();
    let file = util::write_to_vec(&mips);
    let loaded = load_mips(&file).unwrap();
    assert_eq!(loaded.texture_type, TextureType::Cube);
    assert_eq!(loaded.depth, 0);
    assert_same_data(&mips, &loaded);

    let image = load_image(&file, &Options::default()).unwrap();
    assert!(image.is_cube_map());
    for face in 0..CUBE_NUM_FACES {
        util::assert_close(image.read(7, 2, face), cube.read(7, 2, face), 0.5 / 255.0 + 1e-6);
    }
}

#[test]
fn partial_cube_maps() {
    let mut rng = util::create_rng();
    let mut cube = Image::new_with_depth(4, 4, 0, ColorFormat::ARGB8888).unwrap();
    for face in 0..CUBE_NUM_FACES {
        util::fill_random(&mut rng, &mut cube, face);
    }
    let mut options = util::options(OutputColorFormat::ARGB8888);
    options.levels = 1;
    let mips = cube.generate_mip_set(&options, &RuntimeSettings::default()).unwrap();
    let file = util::write_to_vec(&mips);

    // keep +X and -Y, stored as the first two faces
    let mut partial = file[..128 + 2 * 64].to_vec();
    util::set_header_int(&mut partial, 28, 0x200 | 0x400 | 0x2000);

    let loaded = load_mips(&partial).unwrap();
    assert_eq!(loaded.levels[0][0].data, mips.levels[0][0].data);
    assert_eq!(loaded.levels[3][0].data, mips.levels[1][0].data);
    assert!(loaded.levels[1][0].data.is_empty());

    let image = load_image(&partial, &Options::default()).unwrap();
    assert_eq!(image.present_faces().count(), 6);
    assert_eq!(image.read(1, 1, 1), Vec4::ZERO);
    util::assert_close(image.read(1, 1, 3), cube.read(1, 1, 1), 0.5 / 255.0 + 1e-6);

    // a cube map without faces
    util::set_header_int(&mut partial, 28, 0x200);
    assert!(matches!(
        load_mips(&partial),
        Err(DecodeError::Layout(LayoutError::MissingCubeFaces))
    ));
}

#[test]
fn volumes_round_trip() {
    let mut rng = util::create_rng();
    let mut volume = Image::new_with_depth(4, 8, 4, ColorFormat::ARGB8888).unwrap();
    for slice in 0..4 {
        util::fill_random(&mut rng, &mut volume, slice);
    }

    let mips = volume
        .generate_mip_set(
            &util::options(OutputColorFormat::ARGB4444),
            &RuntimeSettings::default(),
        )
        .unwrap();
    let file = util::write_to_vec(&mips);
    assert_eq!(util::header_ints(&file)[6], 4);

    let loaded = load_mips(&file).unwrap();
    assert_eq!(loaded.texture_type, TextureType::Volume);
    assert_eq!(loaded.depth, 4);
    assert_same_data(&mips, &loaded);

    let image = load_image(&file, &Options::default()).unwrap();
    assert!(image.is_volume());
    assert_eq!(image.format(), ColorFormat::ARGB4444);
    util::assert_close(image.read(3, 5, 2), volume.read(3, 5, 2), 0.5 / 15.0 + 1e-6);
}

#[test]
fn dxt_volumes_decompress_every_slice() {
    let colors = [
        Vec4::new(1.0, 0.0, 0.0, 1.0),
        Vec4::new(0.0, 1.0, 0.0, 1.0),
        Vec4::new(0.0, 0.0, 1.0, 1.0),
        Vec4::new(0.5, 0.5, 0.5, 1.0),
    ];
    let mut volume = Image::new_with_depth(4, 4, 4, ColorFormat::ARGB8888).unwrap();
    for (slice, color) in colors.iter().enumerate() {
        for y in 0..4 {
            for x in 0..4 {
                volume.write(x, y, slice, *color);
            }
        }
    }

    let mips = volume
        .generate_mip_set(
            &util::options(OutputColorFormat::DXT1),
            &RuntimeSettings::default(),
        )
        .unwrap();
    let file = util::write_to_vec(&mips);

    let image = load_image(&file, &Options::default()).unwrap();
    assert_eq!(image.depth(), 4);
    for (slice, color) in colors.iter().enumerate() {
        util::assert_close(image.read(2, 2, slice), *color, 0.04);
    }
}

#[test]
fn dxt_images_keep_channel_order() {
    let color = Vec4::new(0.8, 0.4, 0.1, 0.5);
    let image = util::solid_image(8, 8, color);
    let mips = image
        .generate_mip_set(
            &util::options(OutputColorFormat::DXT5),
            &RuntimeSettings::default(),
        )
        .unwrap();
    assert_eq!(mips.format, OutputColorFormat::DXT5);
    let file = util::write_to_vec(&mips);

    let loaded = load_image(&file, &Options::default()).unwrap();
    assert_eq!(loaded.format(), ColorFormat::ARGB8888);
    assert_eq!((loaded.width(), loaded.height()), (8, 8));
    util::assert_close(loaded.read(5, 6, 0), color, 0.04);

    // DXT4 shares the block layout of DXT5
    let mut dxt4 = file.clone();
    dxt4[84..88].copy_from_slice(b"DXT4");
    let loaded = load_mips(&dxt4).unwrap();
    assert_eq!(loaded.format, OutputColorFormat::DXT5);
    assert_same_data(&mips, &loaded);
}

#[test]
fn images_round_trip() {
    let mut rng = util::create_rng();
    let image = util::random_image(&mut rng, 5, 3, ColorFormat::ARGB8888);

    let mut file = Vec::new();
    image.write_dds(&mut file, false, None).unwrap();
    assert_eq!(util::header_ints(&file)[7], 1);

    let loaded = load_image(&file, &Options::default()).unwrap();
    assert_eq!(loaded.format(), ColorFormat::ARGB8888);
    for y in 0..3 {
        for x in 0..5 {
            util::assert_close(loaded.read(x, y, 0), image.read(x, y, 0), 0.5 / 255.0 + 1e-6);
        }
    }

    let mut options = Options::default();
    options.convert_to_linear = true;
    let linear = load_image(&file, &options).unwrap();
    let stored = loaded.read(4, 2, 0);
    let expected = Vec4::new(
        srgb_to_linear(stored.x),
        srgb_to_linear(stored.y),
        srgb_to_linear(stored.z),
        stored.w,
    );
    util::assert_close(linear.read(4, 2, 0), expected, 1e-6);

    let mut half = Vec::new();
    image
        .write_dds(&mut half, false, Some(OutputColorFormat::HalfMap))
        .unwrap();
    let loaded = load_image(&half, &Options::default()).unwrap();
    assert_eq!(loaded.format(), ColorFormat::RGBAHalfMap);
    util::assert_close(loaded.read(1, 1, 0), image.read(1, 1, 0), 1e-3);
}

#[test]
fn image_writer_rejects_formats() {
    let image = util::solid_image(4, 4, Vec4::ONE);
    let mut file = Vec::new();
    assert!(matches!(
        image.write_dds(&mut file, false, Some(OutputColorFormat::DUDV)),
        Err(EncodeError::UnsupportedFormat(OutputColorFormat::DUDV))
    ));

    let mut l16 = Image::new(4, 4, ColorFormat::L16).unwrap();
    l16.write(0, 0, 0, Vec4::ONE);
    assert!(matches!(
        l16.write_dds(&mut file, false, None),
        Err(EncodeError::UnsupportedColorFormat(ColorFormat::L16))
    ));
    assert!(file.is_empty());
}

#[test]
fn dudv_reconstructs_z() {
    let mut mips = MipSet::new();
    mips.width = 2;
    mips.height = 1;
    mips.format = OutputColorFormat::DUDV;
    mips.levels_used = 1;
    mips.levels[0][0] = MipInfo {
        width: 2,
        height: 1,
        depth: 1,
        data: vec![128, 128, 255, 128],
    };
    mips.datasize[0] = 4;
    let file = util::write_to_vec(&mips);

    let loaded = load_mips(&file).unwrap();
    assert_eq!(loaded.format, OutputColorFormat::DUDV);
    assert_same_data(&mips, &loaded);

    let image = load_image(&file, &Options::default()).unwrap();
    let mid = 128.0 / 255.0;
    util::assert_close(image.read(0, 0, 0), Vec4::new(mid, mid, 1.0, 1.0), 0.01);
    util::assert_close(image.read(1, 0, 0), Vec4::new(1.0, mid, 0.5, 1.0), 1e-6);
}

#[test]
fn l16_is_only_read_into_images() {
    let file = l16_file(&[0, 65535, 32768, 0]);

    let decoder = DdsDecoder::new(&mut Cursor::new(&file)).unwrap();
    assert_eq!(decoder.format(), None);
    assert_eq!(decoder.color_format(), Some(ColorFormat::L16));

    assert!(matches!(load_mips(&file), Err(DecodeError::UnsupportedFormat)));

    let image = load_image(&file, &Options::default()).unwrap();
    assert_eq!(image.format(), ColorFormat::L16);
    assert_eq!(image.read(1, 0, 0), Vec4::ONE);
    assert_eq!(image.read(0, 0, 0), Vec4::new(0.0, 0.0, 0.0, 1.0));
    util::assert_close(image.read(0, 1, 0), Vec4::new(0.5, 0.5, 0.5, 1.0), 1e-4);
}

#[test]
fn truncated_data() {
    let image = util::random_image(&mut util::create_rng(), 8, 8, ColorFormat::ARGB8888);
    let mips = image
        .generate_mip_set(
            &util::options(OutputColorFormat::RGB565),
            &RuntimeSettings::default(),
        )
        .unwrap();
    let file = util::write_to_vec(&mips);

    match load_mips(&file[..file.len() - 1]) {
        Err(DecodeError::Io(error)) => assert_eq!(error.kind(), ErrorKind::UnexpectedEof),
        other => panic!("unexpected result {:?}", other.map(|m| m.levels_used)),
    }
    assert!(matches!(
        load_image(&file[..200], &Options::default()),
        Err(DecodeError::Io(_))
    ));
    assert!(matches!(
        load_mips(&file[..100]),
        Err(DecodeError::Header(HeaderError::Io(_)))
    ));
}

#[test]
fn header_limits() {
    let image = util::random_image(&mut util::create_rng(), 16, 16, ColorFormat::ARGB8888);
    let mips = image
        .generate_mip_set(&util::options(OutputColorFormat::A8), &RuntimeSettings::default())
        .unwrap();
    let file = util::write_to_vec(&mips);

    let mut options = Options::default();
    options.max_dimension = 8;
    assert!(matches!(
        load_dds_to_mip_set(&mut Cursor::new(&file), &options),
        Err(DecodeError::Layout(LayoutError::DimensionTooLarge(16)))
    ));

    let mut too_many = file.clone();
    util::set_header_int(&mut too_many, 7, 13);
    assert!(matches!(
        load_mips(&too_many),
        Err(DecodeError::Layout(LayoutError::TooManyMipMaps(13)))
    ));

    let mut zero = file.clone();
    util::set_header_int(&mut zero, 4, 0);
    assert!(matches!(
        load_mips(&zero),
        Err(DecodeError::Layout(LayoutError::ZeroDimension))
    ));

    let mut unknown = file.clone();
    util::set_header_int(&mut unknown, 22, 24);
    assert!(matches!(
        load_mips(&unknown),
        Err(DecodeError::Format(FormatError::UnsupportedPixelFormat))
    ));

    let mut options = Options::default();
    options.skip_magic_bytes = true;
    let loaded = load_dds_to_mip_set(&mut Cursor::new(&file[4..]), &options).unwrap();
    assert_same_data(&mips, &loaded);
}

#[test]
fn writer_checks_levels_first() {
    let image = util::random_image(&mut util::create_rng(), 4, 4, ColorFormat::ARGB8888);
    let mut mips = image
        .generate_mip_set(&util::options(OutputColorFormat::L8), &RuntimeSettings::default())
        .unwrap();
    mips.levels[0][1].data.clear();

    let mut file = Vec::new();
    assert!(matches!(
        mips.write_dds(&mut file),
        Err(EncodeError::MissingLevelData { face: 0, level: 1 })
    ));
    assert!(file.is_empty());
}
