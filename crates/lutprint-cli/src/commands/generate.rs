//! Pattern generation command.

use super::Ui;
use crate::GenerateArgs;
use anyhow::{Context, Result};
use lutprint_ops::pattern::{pattern_file_name, pattern_geometry, render_pattern_png};
use std::path::PathBuf;
use tracing::info;

/// Renders the identity pattern and writes it as PNG.
pub fn run(args: GenerateArgs, ui: Ui) -> Result<()> {
    let geometry = pattern_geometry(args.size, args.tile, args.layout, args.max_dim)?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(pattern_file_name(&geometry)));
    let (width, height) = geometry.image_size();

    if ui.verbose > 0 {
        println!("Generating {geometry} pattern, {width}x{height} pixels");
    }

    let (ctx, bar) = super::task_context(ui, "tiles")?;
    let png = render_pattern_png(&geometry, args.max_dim, &ctx);
    bar.finish_and_clear();
    let png = png?;

    std::fs::write(&output, &png)
        .with_context(|| format!("Failed to save: {}", output.display()))?;
    info!(path = %output.display(), "wrote pattern");

    println!(
        "{} ({}x{}, {} tiles, {})",
        output.display(),
        width,
        height,
        geometry.tile_count(),
        super::format_size(png.len() as u64)
    );
    Ok(())
}
