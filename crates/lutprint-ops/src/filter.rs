//! Per-pixel filter engine.
//!
//! Runs a compiled [`Script`] over every pixel of a [`PixelBuffer`] in
//! row-major order. For each pixel the script sees the current channels
//! and coordinates; its final `R`, `G`, `B` become the new pixel after:
//!
//! - non-finite values fall back to the channel's value before the script ran,
//! - finite values are rounded half-up and clamped to `0..=255`.
//!
//! Alpha is never read or written. A script error on any pixel aborts the
//! whole pass; a partially filtered buffer must be discarded by the caller.

use crate::script::{PixelInput, Script};
use crate::{OpsError, OpsResult};
use lutprint_core::{PixelBuffer, TaskContext, PIXEL_YIELD_INTERVAL};
use tracing::{debug, trace};

/// A compiled per-pixel filter.
///
/// # Example
///
/// ```rust
/// use lutprint_ops::PixelFilter;
///
/// let invert = PixelFilter::compile("R = 255 - R; G = 255 - G; B = 255 - B").unwrap();
/// assert_eq!(invert.test_pixel([0, 128, 255]).unwrap(), [255, 127, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct PixelFilter {
    script: Script,
}

impl PixelFilter {
    /// Compiles filter source.
    ///
    /// Fails with [`OpsError::ScriptCompile`] before any pixel is touched.
    pub fn compile(source: &str) -> OpsResult<Self> {
        let script = Script::compile(source).map_err(OpsError::ScriptCompile)?;
        debug!(locals = script.local_count(), "compiled filter script");
        Ok(Self { script })
    }

    /// Filters `image` in place.
    ///
    /// Cancellation is checked before the first pixel and right after every
    /// checkpoint (every [`PIXEL_YIELD_INTERVAL`] pixels, plus one at the
    /// end of the pass).
    pub fn apply(&self, image: &mut PixelBuffer, ctx: &TaskContext) -> OpsResult<()> {
        ctx.check_cancelled()?;

        let (w, h) = (image.width(), image.height());
        let total = w as u64 * h as u64;
        let mut evaluator = self.script.evaluator();
        let mut done: u64 = 0;

        for y in 0..h {
            for x in 0..w {
                let before = image.rgb(x, y);
                let out = evaluator
                    .run(PixelInput::new(before, x, y, w, h))
                    .map_err(|e| OpsError::FilterRuntime {
                        x,
                        y,
                        message: e.to_string(),
                    })?;
                image.set_rgb(x, y, finish_pixel(out, before));

                done += 1;
                if done % PIXEL_YIELD_INTERVAL == 0 {
                    ctx.checkpoint(done, total);
                    ctx.check_cancelled()?;
                }
            }
        }

        ctx.checkpoint(total, total);
        ctx.check_cancelled()?;
        trace!(width = w, height = h, "filter pass complete");
        Ok(())
    }

    /// Runs the filter on a single color as a 1x1 image at `(0, 0)`.
    pub fn test_pixel(&self, rgb: [u8; 3]) -> OpsResult<[u8; 3]> {
        let out = self
            .script
            .eval(PixelInput::new(rgb, 0, 0, 1, 1))
            .map_err(|e| OpsError::FilterRuntime {
                x: 0,
                y: 0,
                message: e.to_string(),
            })?;
        Ok(finish_pixel(out, rgb))
    }
}

fn finish_pixel(out: [f64; 3], before: [u8; 3]) -> [u8; 3] {
    std::array::from_fn(|c| to_channel(out[c], before[c]))
}

/// Rounds half-up and clamps; non-finite input keeps `fallback`.
fn to_channel(value: f64, fallback: u8) -> u8 {
    if !value.is_finite() {
        return fallback;
    }
    (value + 0.5).floor().clamp(0.0, 255.0) as u8
}

/// Packs RGB into the low 24 bits, red highest.
#[inline]
pub fn pack_rgb(rgb: [u8; 3]) -> u32 {
    (rgb[0] as u32) << 16 | (rgb[1] as u32) << 8 | rgb[2] as u32
}

/// Inverse of [`pack_rgb`]; bits above 24 are ignored.
#[inline]
pub fn unpack_rgb(packed: u32) -> [u8; 3] {
    [(packed >> 16) as u8, (packed >> 8) as u8, packed as u8]
}

#[cfg(test)]
mod tests {
    use super::*;
    use lutprint_core::CancellationToken;
    use std::sync::{Arc, Mutex};

    fn gradient(w: u32, h: u32, channels: u8) -> PixelBuffer {
        let mut image = PixelBuffer::new(w, h, channels);
        for y in 0..h {
            for x in 0..w {
                image.set_rgb(x, y, [(x * 7) as u8, (y * 11) as u8, ((x + y) * 3) as u8]);
            }
        }
        image
    }

    #[test]
    fn empty_script_passes_through() {
        let mut image = gradient(9, 5, 4);
        let original = image.clone();
        PixelFilter::compile("").unwrap().apply(&mut image, &TaskContext::new()).unwrap();
        assert_eq!(image, original);
    }

    #[test]
    fn clamps_and_rounds() {
        let f = PixelFilter::compile("R = 999; G = -50; B = 127.5").unwrap();
        assert_eq!(f.test_pixel([1, 2, 3]).unwrap(), [255, 0, 128]);
    }

    #[test]
    fn non_finite_keeps_previous_value() {
        let f = PixelFilter::compile("R = 0 / 0; G = 1 / 0; B = -1 / 0").unwrap();
        assert_eq!(f.test_pixel([10, 20, 30]).unwrap(), [10, 20, 30]);
    }

    #[test]
    fn alpha_is_untouched() {
        let mut image = PixelBuffer::from_raw(2, 1, 4, vec![10, 20, 30, 7, 40, 50, 60, 200]).unwrap();
        PixelFilter::compile("R = 0; G = 0; B = 0")
            .unwrap()
            .apply(&mut image, &TaskContext::new())
            .unwrap();
        assert_eq!(image.as_bytes(), &[0, 0, 0, 7, 0, 0, 0, 200]);
    }

    #[test]
    fn sees_coordinates_and_size() {
        let mut image = PixelBuffer::new(4, 3, 3);
        PixelFilter::compile("R = X; G = Y; B = W * 10 + H")
            .unwrap()
            .apply(&mut image, &TaskContext::new())
            .unwrap();
        assert_eq!(image.rgb(3, 2), [3, 2, 43]);
        assert_eq!(image.rgb(1, 0), [1, 0, 43]);
    }

    #[test]
    fn compile_error_is_eager() {
        let err = PixelFilter::compile("R = (").unwrap_err();
        assert!(matches!(err, OpsError::ScriptCompile(_)));
    }

    #[test]
    fn runtime_error_reports_pixel() {
        let mut image = PixelBuffer::new(4, 4, 3);
        image.set_rgb(2, 1, [200, 0, 0]);
        let f = PixelFilter::compile("let k; if (R < 100) { k = 0 } G = k").unwrap();
        match f.apply(&mut image, &TaskContext::new()) {
            Err(OpsError::FilterRuntime { x, y, message }) => {
                assert_eq!((x, y), (2, 1));
                assert!(message.contains("'k'"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn cancelled_before_start_touches_nothing() {
        let mut image = gradient(3, 3, 4);
        let original = image.clone();
        let token = CancellationToken::new();
        token.cancel();
        let ctx = TaskContext::new().with_cancel(token);
        let err = PixelFilter::compile("R = 0").unwrap().apply(&mut image, &ctx).unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(image, original);
    }

    #[test]
    fn cancel_during_pass_is_observed_after_checkpoint() {
        // 400x400 = 160_000 pixels: one mid-pass checkpoint plus the final one.
        let mut image = PixelBuffer::new(400, 400, 3);
        let token = CancellationToken::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let ctx = {
            let token = token.clone();
            let seen = seen.clone();
            TaskContext::new().with_cancel(token.clone()).with_progress(move |p| {
                seen.lock().unwrap().push(p.completed);
                token.cancel();
            })
        };
        let err = PixelFilter::compile("R = 1").unwrap().apply(&mut image, &ctx).unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(*seen.lock().unwrap(), vec![PIXEL_YIELD_INTERVAL]);
        // Pixels past the checkpoint were never processed.
        assert_eq!(image.rgb(399, 399), [0, 0, 0]);
        assert_eq!(image.rgb(0, 0), [1, 0, 0]);
    }

    #[test]
    fn reports_final_progress() {
        let mut image = PixelBuffer::new(5, 5, 3);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let ctx = {
            let seen = seen.clone();
            TaskContext::new().with_progress(move |p| seen.lock().unwrap().push((p.completed, p.total)))
        };
        PixelFilter::compile("").unwrap().apply(&mut image, &ctx).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![(25, 25)]);
    }

    #[test]
    fn packing() {
        assert_eq!(pack_rgb([0x12, 0x34, 0x56]), 0x123456);
        assert_eq!(unpack_rgb(0xFF123456), [0x12, 0x34, 0x56]);
    }
}
