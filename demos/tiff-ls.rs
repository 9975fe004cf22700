use std::borrow::Cow;

use tiff_rgba::decoder::Decoder;
use tiff_rgba::tags::{Tag, Type};
use tiff_rgba::Directory;
use tracing_subscriber::prelude::*;

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiff_rgba=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let Some(image) = std::env::args_os().nth(1) else {
        eprintln!("Usage: tiff-ls FILE");
        return Ok(());
    };

    let data = std::fs::read(image)?;
    let decoder = Decoder::new(&data)?;
    println!("Byte order {:?}", decoder.byte_order());

    for (index, dir) in decoder.directories().iter().enumerate() {
        ls_dir(dir);

        match decoder.read_image(index) {
            Ok(image) => println!("Image {}x{} from {:?}\n", image.width, image.height, image.source),
            Err(err) => println!("Image not decodable: {err}\n"),
        }
    }

    Ok(())
}

fn ls_dir(dir: &Directory) {
    println!("Directory at {:x}", dir.offset());
    println!("Name\tHex\tType\tCount\tValue");

    for (tag, entry) in dir.iter() {
        let name: Cow<'static, str> = match tag {
            Tag::Unknown(_) => "<unknown>".into(),
            known => format!("{known:?}").into(),
        };

        let ty: Cow<'static, str> = match entry.field_type() {
            Type::BYTE => "u8".into(),
            Type::ASCII => "ascii".into(),
            Type::SHORT => "u16".into(),
            Type::LONG => "u32".into(),
            Type::RATIONAL => "r32".into(),
            Type::SBYTE => "i8".into(),
            Type::UNDEFINED => "byte".into(),
            Type::SSHORT => "s16".into(),
            Type::SLONG => "s32".into(),
            Type::SRATIONAL => "sr32".into(),
            Type::FLOAT => "f32".into(),
            Type::DOUBLE => "f64".into(),
            Type::IFD => "ifd32".into(),
            other => format!("{:x}", other.to_u16()).into(),
        };

        let value = if entry.is_inline() { "" } else { "@" };
        println!(
            "{name:26}\t{tag:4x}\t{ty}\t{count}\t{value}{raw}",
            tag = tag.to_u16(),
            count = entry.count(),
            raw = entry.value().into_u32(),
        );
    }
}
