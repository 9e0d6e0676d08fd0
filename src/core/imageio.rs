use super::geometry::Point2i;
use super::pbrt::{gamma_correct, Float};
use byteorder::{LittleEndian, WriteBytesExt};
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Write a developed transient volume as a little-endian f32 stream with a
/// small self-describing header: magic, width, height, bins, channels.
pub fn write_raw_volume(
    name: &str,
    data: &[Float],
    resolution: Point2i,
    n_bins: usize,
) -> io::Result<()> {
    debug_assert_eq!(
        data.len(),
        resolution.x as usize * resolution.y as usize * n_bins * 3
    );
    let mut file = BufWriter::new(File::create(name)?);
    file.write_all(b"TLV1")?;
    file.write_u32::<LittleEndian>(resolution.x as u32)?;
    file.write_u32::<LittleEndian>(resolution.y as u32)?;
    file.write_u32::<LittleEndian>(n_bins as u32)?;
    file.write_u32::<LittleEndian>(3)?;
    for v in data {
        file.write_f32::<LittleEndian>(*v as f32)?;
    }
    file.flush()
}

/// Write a time-integrated RGB image as an 8-bit gamma-corrected PNG.
pub fn write_steady_png(name: &str, rgb: &[Float], resolution: Point2i) -> io::Result<()> {
    let bytes: Vec<u8> = rgb
        .iter()
        .map(|p| num::clamp(255.0 * gamma_correct(*p) + 0.5, 0.0, 255.0) as u8)
        .collect();
    image::save_buffer(
        name,
        &bytes,
        resolution.x as u32,
        resolution.y as u32,
        image::ColorType::RGB(8),
    )
}
