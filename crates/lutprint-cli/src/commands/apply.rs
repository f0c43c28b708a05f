//! LUT application command

use super::Ui;
use crate::ApplyArgs;
use anyhow::{Context, Result};
use lutprint_lut::{cube, Interpolation};

/// Applies a `.cube` LUT to an image.
pub fn run(args: ApplyArgs, ui: Ui) -> Result<()> {
    let lut = cube::read_3d(&args.lut)
        .with_context(|| format!("Failed to load LUT: {}", args.lut.display()))?;
    let interpolation = if args.nearest {
        Interpolation::Nearest
    } else {
        Interpolation::Linear
    };
    let lut = lut.with_interpolation(interpolation);
    let mut image = super::load_image(&args.input)?;

    if ui.verbose > 0 {
        println!(
            "Applying {} ({}^3) to {}",
            args.lut.display(),
            lut.size,
            args.input.display()
        );
    }

    let (ctx, bar) = super::task_context(ui, "px")?;
    let result = lut.apply_image(&mut image, &ctx);
    bar.finish_and_clear();
    result?;

    super::save_image(&args.output, &image)?;
    println!("{}", args.output.display());
    Ok(())
}
