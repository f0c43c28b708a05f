//! CLI command implementations

pub mod apply;
pub mod detect;
pub mod extract;
pub mod filter;
pub mod generate;
pub mod test_pixel;

use crate::ScriptSource;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use lutprint_core::{PixelBuffer, TaskContext};
use std::path::Path;

/// Global output settings.
#[derive(Debug, Clone, Copy)]
pub struct Ui {
    pub verbose: u8,
    pub quiet: bool,
}

/// Load image from path
pub fn load_image(path: &Path) -> Result<PixelBuffer> {
    lutprint_io::read(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save image to path
pub fn save_image(path: &Path, image: &PixelBuffer) -> Result<()> {
    lutprint_io::write(path, image).with_context(|| format!("Failed to save: {}", path.display()))
}

/// Reads script source from `--script` or `--expr`.
pub fn read_script(source: &ScriptSource) -> Result<String> {
    match (&source.script, &source.expr) {
        (_, Some(expr)) => Ok(expr.clone()),
        (Some(path), None) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script: {}", path.display())),
        (None, None) => anyhow::bail!("no script given; use --script or --expr"),
    }
}

/// Task context whose progress drives a terminal progress bar.
///
/// The bar is hidden with `--quiet`. Callers should `finish_and_clear` it
/// whether or not the task succeeded.
pub fn task_context(ui: Ui, unit: &str) -> Result<(TaskContext, ProgressBar)> {
    let bar = if ui.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    bar.set_style(
        ProgressStyle::default_bar()
            .template(&format!("{{spinner:.green}} [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {unit} ({{eta}})"))?
            .progress_chars("#>-"),
    );

    let ctx = {
        let bar = bar.clone();
        TaskContext::new().with_progress(move |p| {
            bar.set_length(p.total);
            bar.set_position(p.completed);
        })
    };
    Ok((ctx, bar))
}

/// Format file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
