//! Per-pixel filter command.

use super::Ui;
use crate::FilterArgs;
use anyhow::Result;
use lutprint_ops::PixelFilter;

/// Runs a script over every pixel of an image and saves the result.
pub fn run(args: FilterArgs, ui: Ui) -> Result<()> {
    let source = super::read_script(&args.source)?;
    let filter = PixelFilter::compile(&source)?;
    let mut image = super::load_image(&args.input)?;

    if ui.verbose > 0 {
        println!(
            "Filtering {} ({}x{})",
            args.input.display(),
            image.width(),
            image.height()
        );
    }

    let (ctx, bar) = super::task_context(ui, "px")?;
    let result = filter.apply(&mut image, &ctx);
    bar.finish_and_clear();
    result?;

    super::save_image(&args.output, &image)?;
    println!("{}", args.output.display());
    Ok(())
}
