#![no_main]

use libfuzzer_sys::fuzz_target;
use pixel_oracle::{Codec, DecompressParams, PixelFormat, ReferenceCodec};

fuzz_target!(|data: &[u8]| {
    let codec = ReferenceCodec::new();
    let Ok(header) = codec.read_header(data) else {
        return;
    };
    for sf in codec.scaling_factors() {
        let (w, h) = (sf.scale(header.width), sf.scale(header.height));
        let _ = codec.decompress(data, &DecompressParams::new(w, h, PixelFormat::Xrgb));
    }
    let params =
        DecompressParams::new(header.width, header.height, PixelFormat::Gray).planar(true);
    let _ = codec.decompress(data, &params);
});
