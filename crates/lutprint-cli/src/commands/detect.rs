//! Geometry detection command.
//!
//! Reads only the PNG header of each input.

use super::Ui;
use crate::DetectArgs;
use anyhow::{bail, Context, Result};
use lutprint_core::{detect_geometry, Geometry};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct Report {
    file: String,
    width: u32,
    height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    geometry: Option<Geometry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn detect_one(path: &Path) -> Result<Report> {
    let (width, height) = lutprint_io::png::read_dimensions(path)
        .with_context(|| format!("Failed to load: {}", path.display()))?;
    let (geometry, error) = match detect_geometry(width, height) {
        Ok(g) => (Some(g), None),
        Err(e) => (None, Some(e.to_string())),
    };
    Ok(Report {
        file: path.display().to_string(),
        width,
        height,
        geometry,
        error,
    })
}

/// Prints the detected `(N, M, layout)` for each input.
pub fn run(args: DetectArgs, ui: Ui) -> Result<()> {
    let reports = args
        .input
        .iter()
        .map(|p| detect_one(p))
        .collect::<Result<Vec<_>>>()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for r in &reports {
            match (&r.geometry, &r.error) {
                (Some(g), _) => {
                    println!(
                        "{}: N={} M={} layout={}",
                        r.file, g.lattice_size, g.tile_size, g.layout
                    );
                    if ui.verbose > 0 {
                        println!("  {}x{} pixels, {} tiles", r.width, r.height, g.tile_count());
                    }
                }
                (None, error) => {
                    println!("{}: {}", r.file, error.as_deref().unwrap_or("undetectable"));
                }
            }
        }
    }

    let failed = reports.iter().filter(|r| r.geometry.is_none()).count();
    if failed > 0 {
        bail!("{failed} of {} image(s) have no detectable geometry", reports.len());
    }
    Ok(())
}
