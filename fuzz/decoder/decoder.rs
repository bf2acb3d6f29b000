#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use texture_pipeline::*;

fuzz_target!(|data: &[u8]| {
    // Just no panic
    let mut options = Options::default();
    options.max_dimension = 312;
    options.max_depth = 32;

    if let Ok(decoder) = DdsDecoder::new_with(&mut Cursor::new(data), &options) {
        let color = decoder.color_format();
        let layout = decoder.layout();
        let _ = (color, layout.texture_type(), layout.data_len());
    }

    _ = load_dds_to_mip_set(&mut Cursor::new(data), &options);

    options.argb8888_as_rgbe = true;
    if let Ok(image) = load_dds(&mut Cursor::new(data), &RangeFitCodec, &options) {
        let _ = image.generate_mip_set(&MipGenOptions::default(), &RuntimeSettings::default());
    }
});
