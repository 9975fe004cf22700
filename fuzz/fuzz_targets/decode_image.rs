#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut limits = tiff_rgba::decoder::Limits::default();
    limits.decoding_buffer_size = 1_000_000;
    limits.max_directories = 64;

    let decoder = if let Ok(d) = tiff_rgba::decoder::Decoder::new_with_limits(data, limits) {
        d
    } else {
        return;
    };

    for index in 0..decoder.image_count() {
        let _ = decoder.read_image(index);
    }
});
