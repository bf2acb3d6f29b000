use std::io::Cursor;

use texture_pipeline::*;

mod util;

fn mips_of(width: u32, height: u32, format: OutputColorFormat) -> MipSet {
    let image = util::random_image(&mut util::create_rng(), width, height, ColorFormat::ARGB8888);
    image
        .generate_mip_set(&util::options(format), &RuntimeSettings::default())
        .unwrap()
}

fn read_header(file: &[u8]) -> Result<Header, HeaderError> {
    let mut reader = Cursor::new(file);
    Header::read_magic(&mut reader)?;
    Header::read(&mut reader)
}

#[test]
fn header_round_trip() {
    for format in [
        OutputColorFormat::ARGB8888,
        OutputColorFormat::RGB565,
        OutputColorFormat::AL88,
        OutputColorFormat::DXT1,
        OutputColorFormat::DXT5,
        OutputColorFormat::HalfMap,
    ] {
        let header = mips_of(16, 8, format).header();
        let mut file = Vec::new();
        header.write(&mut file).unwrap();
        assert_eq!(file.len(), 128);
        assert_eq!(read_header(&file).unwrap(), header, "{}", format);
    }
}

#[test]
fn uncompressed_header_fields() {
    let file = util::write_to_vec(&mips_of(16, 8, OutputColorFormat::ARGB8888));
    let ints = util::header_ints(&file);

    assert_eq!(&file[..4], b"DDS ");
    assert_eq!(ints[1], 124);
    assert_eq!(ints[2], 0x1 | 0x2 | 0x4 | 0x8 | 0x1000 | 0x20000);
    assert_eq!((ints[3], ints[4]), (8, 16));
    assert_eq!(ints[5], 64);
    assert_eq!(ints[6], 0);
    assert_eq!(ints[7], 5);
    assert_eq!(ints[19], 32);
    assert_eq!(ints[20], 0x41);
    assert_eq!(ints[21], 0);
    assert_eq!(ints[22], 32);
    assert_eq!(ints[23..27], [0xFF0000, 0xFF00, 0xFF, 0xFF000000]);
    assert_eq!(ints[27], 0x1000 | 0x400000 | 0x8);
    assert_eq!(ints[28], 0);
}

#[test]
fn compressed_header_fields() {
    let mut options = util::options(OutputColorFormat::DXT1);
    options.levels = 1;
    let image = util::random_image(&mut util::create_rng(), 16, 16, ColorFormat::ARGB8888);
    let mips = image.generate_mip_set(&options, &RuntimeSettings::default()).unwrap();
    let header = mips.header();

    assert!(header.flags.contains(DdsFlags::LINEAR_SIZE));
    assert!(!header.flags.contains(DdsFlags::PITCH));
    assert_eq!(header.pitch_or_linear_size, 128);
    assert_eq!(header.pixel_format.four_cc, Some(FourCC::DXT1));
    assert_eq!(header.mipmap_count, 1);
    // a single level is not complex
    assert_eq!(header.caps, DdsCaps::TEXTURE);
    assert_eq!(header.depth, None);
}

#[test]
fn cube_and_volume_caps() {
    let mut rng = util::create_rng();

    let mut cube = Image::new_with_depth(4, 4, 0, ColorFormat::ARGB8888).unwrap();
    for face in 0..CUBE_NUM_FACES {
        util::fill_random(&mut rng, &mut cube, face);
    }
    let header = cube
        .generate_mip_set(&util::options(OutputColorFormat::A8), &RuntimeSettings::default())
        .unwrap()
        .header();
    assert!(header.is_cube_map());
    assert_eq!(header.cube_faces().count(), 6);
    assert!(header.caps.contains(DdsCaps::COMPLEX | DdsCaps::MIPMAP));
    assert_eq!(header.depth, None);

    let volume = Image::new_with_depth(4, 4, 8, ColorFormat::ARGB8888).unwrap();
    let header = volume
        .generate_mip_set(&util::options(OutputColorFormat::A8), &RuntimeSettings::default())
        .unwrap()
        .header();
    assert!(header.is_volume());
    assert!(header.flags.contains(DdsFlags::DEPTH));
    assert_eq!(header.depth, Some(8));
    assert_eq!(header.caps, DdsCaps::TEXTURE | DdsCaps::COMPLEX);
    assert_eq!(header.levels(), 1);
}

#[test]
fn invalid_headers() {
    let file = util::write_to_vec(&mips_of(4, 4, OutputColorFormat::L8));

    let mut bad_magic = file.clone();
    bad_magic[..4].copy_from_slice(b"DDS\0");
    assert!(matches!(
        read_header(&bad_magic),
        Err(HeaderError::InvalidMagicBytes([b'D', b'D', b'S', 0]))
    ));

    let mut bad_size = file.clone();
    util::set_header_int(&mut bad_size, 1, 128);
    assert!(matches!(
        read_header(&bad_size),
        Err(HeaderError::InvalidHeaderSize(128))
    ));

    let mut missing_flags = file.clone();
    util::set_header_int(&mut missing_flags, 2, 0x1 | 0x2 | 0x4);
    assert!(matches!(
        read_header(&missing_flags),
        Err(HeaderError::MissingRequiredFlags(_))
    ));

    let mut bad_pixel_format = file.clone();
    util::set_header_int(&mut bad_pixel_format, 19, 24);
    assert!(matches!(
        read_header(&bad_pixel_format),
        Err(HeaderError::InvalidPixelFormatSize(24))
    ));

    assert!(matches!(
        read_header(&file[..64]),
        Err(HeaderError::Io(_))
    ));
    assert!(read_header(&file).is_ok());
}

#[test]
fn linear_size_requires_compression() {
    let mut file = util::write_to_vec(&mips_of(4, 4, OutputColorFormat::L8));
    let flags = util::header_ints(&file)[2];
    util::set_header_int(&mut file, 2, (flags & !0x8) | 0x80000);

    // the header itself is fine
    assert!(read_header(&file).is_ok());
    assert!(matches!(
        load_dds_to_mip_set(&mut Cursor::new(&file), &Options::default()),
        Err(DecodeError::Header(HeaderError::UnexpectedLinearSize))
    ));
}

#[test]
fn mipmap_count_needs_caps() {
    let mut file = util::write_to_vec(&mips_of(8, 8, OutputColorFormat::A8));
    let header = read_header(&file).unwrap();
    assert_eq!(header.levels(), 4);

    // without the mipmap caps only the top level is read
    util::set_header_int(&mut file, 27, 0x1000);
    let header = read_header(&file).unwrap();
    assert_eq!(header.mipmap_count, 4);
    assert_eq!(header.levels(), 1);
}
