//! Single-color script preview.

use super::Ui;
use crate::TestPixelArgs;
use anyhow::Result;
use lutprint_ops::{pack_rgb, PixelFilter};

/// Runs the script once on `--rgb` as a 1x1 image and prints the result.
pub fn run(args: TestPixelArgs, ui: Ui) -> Result<()> {
    let source = super::read_script(&args.source)?;
    let filter = PixelFilter::compile(&source)?;
    let out = filter.test_pixel(args.rgb)?;

    if ui.verbose > 0 {
        let [r, g, b] = args.rgb;
        println!("in:  {r},{g},{b}  #{:06X}", pack_rgb(args.rgb));
    }
    let [r, g, b] = out;
    println!("{r},{g},{b}  #{:06X}", pack_rgb(out));
    Ok(())
}
