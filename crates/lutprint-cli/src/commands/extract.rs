//! LUT extraction command.

use super::Ui;
use crate::ExtractArgs;
use anyhow::{Context, Result};
use lutprint_core::{detect_geometry, Geometry};
use lutprint_lut::extract_cube;
use tracing::{info, warn};

/// Samples a transformed pattern into a `.cube` file.
///
/// Geometry comes from `--size/--tile/--layout` when all are given,
/// otherwise it is detected from the image dimensions.
pub fn run(args: ExtractArgs, ui: Ui) -> Result<()> {
    let image = super::load_image(&args.input)?;

    let geometry = match (args.size, args.tile, args.layout) {
        (Some(n), Some(m), Some(layout)) => {
            let g = Geometry::new(n, m, layout)?;
            if g.image_size() != (image.width(), image.height()) {
                warn!(
                    %g,
                    width = image.width(),
                    height = image.height(),
                    "explicit geometry does not match image size"
                );
            }
            g
        }
        _ => detect_geometry(image.width(), image.height())
            .with_context(|| format!("{}", args.input.display()))?,
    };
    info!(%geometry, "sampling");
    if ui.verbose > 0 {
        println!("Geometry: {geometry}");
    }

    let (ctx, bar) = super::task_context(ui, "cells")?;
    let text = extract_cube(&image, &geometry, &ctx);
    bar.finish_and_clear();
    let text = text?;

    if args.stdout {
        print!("{text}");
        return Ok(());
    }

    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension("cube"));
    std::fs::write(&output, &text)
        .with_context(|| format!("Failed to save: {}", output.display()))?;
    println!("{} ({}^3 LUT)", output.display(), geometry.lattice_size);
    Ok(())
}
