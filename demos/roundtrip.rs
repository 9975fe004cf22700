//! Decode the first image of a TIFF and write it back as uncompressed RGBA.
use tiff_rgba::encoder::{encode, EncoderOptions};
use tiff_rgba::tags::ByteOrder;
use tracing_subscriber::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiff_rgba=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args_os().skip(1);
    let (Some(input), Some(output)) = (args.next(), args.next()) else {
        eprintln!("Usage: roundtrip INPUT OUTPUT [--big-endian]");
        return Ok(());
    };

    let byte_order = match args.next() {
        Some(flag) if flag == "--big-endian" => ByteOrder::BigEndian,
        _ => ByteOrder::LittleEndian,
    };

    let data = std::fs::read(&input)?;
    let image = tiff_rgba::decode_rgba(&data)?;

    let file = encode(&image.data, image.width, image.height, &EncoderOptions { byte_order })?;
    std::fs::write(&output, &file)?;

    // Reading the result back must give the same pixels.
    let check = tiff_rgba::decode_rgba(&file)?;
    if check.data != image.data {
        return Err("round trip changed the pixels".into());
    }

    println!(
        "{}x{} image, {} bytes written",
        image.width,
        image.height,
        file.len()
    );
    Ok(())
}
