//! Final export: PNG with physical resolution metadata

use crate::{Error, Result};
use chrono::{DateTime, Local};
use image::RgbaImage;
use std::path::{Path, PathBuf};

const METERS_PER_INCH: f64 = 0.0254;

/// Replace characters that do not belong in a file name.
pub fn sanitize_file_stem(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

/// `<name>_<YYYY-MM-DD_HH-MM-SS>.png`
pub fn export_file_name(name: &str, at: DateTime<Local>) -> String {
    let stem = match sanitize_file_stem(name) {
        s if s.is_empty() => "CARD".to_string(),
        s => s,
    };
    format!("{}_{}.png", stem, at.format("%Y-%m-%d_%H-%M-%S"))
}

/// Encode `img` as RGBA PNG with a `pHYs` chunk for `dpi`.
pub fn encode_png(img: &RgbaImage, dpi: u32) -> Result<Vec<u8>> {
    let ppm = (dpi as f64 / METERS_PER_INCH).round() as u32;
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, img.width(), img.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: png::Unit::Meter,
        }));
        let mut writer = encoder.write_header()?;
        writer.write_image_data(img.as_raw())?;
        writer.finish()?;
    }
    Ok(buf)
}

/// Write the export into `dir`, named after the card's name label.
pub fn write_export(img: &RgbaImage, dir: &Path, name: &str, dpi: u32) -> Result<PathBuf> {
    let data = encode_png(img, dpi)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(name, Local::now()));
    std::fs::write(&path, data).map_err(Error::Io)?;
    log::info!("Saved image {} ({}x{} @ {} dpi)", path.display(), img.width(), img.height(), dpi);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_replaces_spaces_and_stamps_time() {
        let at = Local.with_ymd_and_hms(2025, 11, 1, 9, 5, 7).unwrap();
        assert_eq!(export_file_name(" Atlas AS7-D ", at), "Atlas_AS7-D_2025-11-01_09-05-07.png");
        assert_eq!(export_file_name("a/b", at), "a_b_2025-11-01_09-05-07.png");
        assert_eq!(export_file_name("", at), "CARD_2025-11-01_09-05-07.png");
    }

    #[test]
    fn png_carries_300_dpi() {
        let img = RgbaImage::new(3, 2);
        let data = encode_png(&img, 300).unwrap();
        let decoder = png::Decoder::new(&data[..]);
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        assert_eq!((info.width, info.height), (3, 2));
        let dims = info.pixel_dims.expect("pHYs chunk");
        assert_eq!(dims.xppu, 11811);
        assert_eq!(dims.unit, png::Unit::Meter);
    }
}
