//! 8-bit interleaved pixel buffer.
//!
//! # Memory Layout
//!
//! Pixels are stored **row-major**, top-to-bottom, channels interleaved:
//!
//! ```text
//! RGBA: [R G B A R G B A ...]  <- Row 0
//!       [R G B A R G B A ...]  <- Row 1
//! ```
//!
//! Only 3 (RGB) and 4 (RGBA) channel buffers exist. Alpha is carried along
//! but never interpreted.

use crate::{Error, Result};

/// Owned 8-bit RGB or RGBA image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Creates a zeroed buffer. Alpha, when present, starts opaque.
    ///
    /// # Panics
    ///
    /// If `channels` is not 3 or 4.
    pub fn new(width: u32, height: u32, channels: u8) -> Self {
        assert!(
            channels == 3 || channels == 4,
            "PixelBuffer supports 3 or 4 channels, got {channels}"
        );
        let len = width as usize * height as usize * channels as usize;
        let mut data = vec![0u8; len];
        if channels == 4 {
            data.iter_mut().skip(3).step_by(4).for_each(|a| *a = 255);
        }
        Self {
            width,
            height,
            channels,
            data,
        }
    }

    /// Wraps raw interleaved bytes, validating the length.
    pub fn from_raw(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self> {
        if channels != 3 && channels != 4 {
            return Err(Error::InvalidGeometry(format!(
                "pixel buffers have 3 or 4 channels, got {channels}"
            )));
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Image width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channels per pixel (3 or 4).
    #[inline]
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// True for RGBA buffers.
    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    /// Raw interleaved bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels as usize
    }

    fn check_bounds(&self, x: u32, y: u32) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// RGB of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// If `(x, y)` is out of bounds.
    #[inline]
    pub fn rgb(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Checked variant of [`rgb`](Self::rgb).
    pub fn get_rgb(&self, x: u32, y: u32) -> Result<[u8; 3]> {
        self.check_bounds(x, y)?;
        Ok(self.rgb(x, y))
    }

    /// Alpha of the pixel at `(x, y)`, `None` for RGB buffers.
    pub fn alpha(&self, x: u32, y: u32) -> Option<u8> {
        self.has_alpha().then(|| self.data[self.offset(x, y) + 3])
    }

    /// Overwrites the RGB of one pixel, leaving alpha alone.
    ///
    /// # Panics
    ///
    /// If `(x, y)` is out of bounds.
    #[inline]
    pub fn set_rgb(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let i = self.offset(x, y);
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    /// Fills a `w x h` rectangle at `(x0, y0)` with a solid RGB color.
    pub fn fill_rect(&mut self, x0: u32, y0: u32, w: u32, h: u32, rgb: [u8; 3]) -> Result<()> {
        if w == 0 || h == 0 {
            return Ok(());
        }
        let x1 = x0 as u64 + w as u64 - 1;
        let y1 = y0 as u64 + h as u64 - 1;
        if x1 >= self.width as u64 || y1 >= self.height as u64 {
            return Err(Error::OutOfBounds {
                x: x1.min(u32::MAX as u64) as u32,
                y: y1.min(u32::MAX as u64) as u32,
                width: self.width,
                height: self.height,
            });
        }
        let ch = self.channels as usize;
        for y in y0..y0 + h {
            let start = self.offset(x0, y);
            let row = &mut self.data[start..start + w as usize * ch];
            for px in row.chunks_exact_mut(ch) {
                px[..3].copy_from_slice(&rgb);
            }
        }
        Ok(())
    }
}
