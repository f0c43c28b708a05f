//! PNG format support.
//!
//! # Reading
//!
//! Any 8- or 16-bit PNG is accepted. Palette and low-bit-depth images are
//! expanded, 16-bit samples are reduced to their high byte, and grayscale is
//! replicated into RGB. The result is always a 4-channel buffer; images
//! without alpha get an opaque alpha channel.
//!
//! # Writing
//!
//! Buffers are written as 8-bit RGB or RGBA, matching their channel count.
//! No gamma or color-profile chunks are emitted: values are raw bytes.

use crate::{IoError, IoResult};
use lutprint_core::PixelBuffer;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Cursor, Seek, Write};
use std::path::Path;
use tracing::debug;

/// Reads a PNG file from the given path.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<PixelBuffer> {
    let file = File::open(path.as_ref())?;
    decode_from(BufReader::new(file))
}

/// Decodes a PNG held in memory.
pub fn decode(bytes: &[u8]) -> IoResult<PixelBuffer> {
    decode_from(Cursor::new(bytes))
}

/// Reads only the header of a PNG file and returns `(width, height)`.
pub fn read_dimensions<P: AsRef<Path>>(path: P) -> IoResult<(u32, u32)> {
    let file = File::open(path.as_ref())?;
    let reader = png::Decoder::new(BufReader::new(file))
        .read_info()
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;
    let info = reader.info();
    Ok((info.width, info.height))
}

fn decode_from<R: BufRead + Seek>(reader: R) -> IoResult<PixelBuffer> {
    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder
        .read_info()
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("cannot determine output buffer size".into()))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e: png::DecodingError| IoError::DecodeError(e.to_string()))?;
    let raw = &buf[..info.buffer_size()];

    if info.bit_depth != png::BitDepth::Eight {
        return Err(IoError::UnsupportedBitDepth(format!(
            "{:?} {:?}",
            info.color_type, info.bit_depth
        )));
    }

    let rgba: Vec<u8> = match info.color_type {
        png::ColorType::Rgba => raw.to_vec(),
        png::ColorType::Rgb => raw
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        png::ColorType::Grayscale => raw.iter().flat_map(|&g| [g, g, g, 255]).collect(),
        png::ColorType::GrayscaleAlpha => raw
            .chunks_exact(2)
            .flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]])
            .collect(),
        png::ColorType::Indexed => {
            return Err(IoError::UnsupportedBitDepth(
                "indexed color was not expanded".into(),
            ));
        }
    };

    debug!(
        width = info.width,
        height = info.height,
        color = ?info.color_type,
        "decoded PNG"
    );
    Ok(PixelBuffer::from_raw(info.width, info.height, 4, rgba)?)
}

/// Writes a buffer to a PNG file.
pub fn write<P: AsRef<Path>>(path: P, image: &PixelBuffer) -> IoResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    encode_to(&mut writer, image)?;
    writer.flush()?;
    Ok(())
}

/// Encodes a buffer as an in-memory PNG blob.
pub fn encode(image: &PixelBuffer) -> IoResult<Vec<u8>> {
    let mut out = Vec::new();
    encode_to(&mut out, image)?;
    Ok(out)
}

fn encode_to<W: Write>(writer: W, image: &PixelBuffer) -> IoResult<()> {
    let color_type = match image.channels() {
        3 => png::ColorType::Rgb,
        4 => png::ColorType::Rgba,
        n => return Err(IoError::EncodeError(format!("unsupported channel count: {n}"))),
    };

    let mut encoder = png::Encoder::new(writer, image.width(), image.height());
    encoder.set_color(color_type);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::default());

    let mut png_writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    png_writer
        .write_image_data(image.as_bytes())
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    png_writer
        .finish()
        .map_err(|e| IoError::EncodeError(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32, channels: u8) -> PixelBuffer {
        let mut buf = PixelBuffer::new(width, height, channels);
        for y in 0..height {
            for x in 0..width {
                buf.set_rgb(x, y, [(x * 8) as u8, (y * 8) as u8, 128]);
            }
        }
        buf
    }

    #[test]
    fn memory_roundtrip_is_lossless() {
        let image = gradient(32, 16, 4);
        let blob = encode(&image).expect("encode");
        assert_eq!(&blob[1..4], b"PNG");

        let loaded = decode(&blob).expect("decode");
        assert_eq!(loaded, image);
    }

    #[test]
    fn rgb_input_gains_opaque_alpha() {
        let image = gradient(8, 8, 3);
        let loaded = decode(&encode(&image).unwrap()).unwrap();
        assert_eq!(loaded.channels(), 4);
        assert_eq!(loaded.rgb(3, 5), image.rgb(3, 5));
        assert_eq!(loaded.alpha(3, 5), Some(255));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(decode(b"not a png"), Err(IoError::DecodeError(_))));
    }

    #[test]
    fn grayscale_expands_to_rgb() {
        let mut blob = Vec::new();
        {
            let mut enc = png::Encoder::new(&mut blob, 2, 1);
            enc.set_color(png::ColorType::Grayscale);
            enc.set_depth(png::BitDepth::Eight);
            let mut w = enc.write_header().unwrap();
            w.write_image_data(&[10, 200]).unwrap();
            w.finish().unwrap();
        }
        let loaded = decode(&blob).unwrap();
        assert_eq!(loaded.rgb(0, 0), [10, 10, 10]);
        assert_eq!(loaded.rgb(1, 0), [200, 200, 200]);
    }
}
