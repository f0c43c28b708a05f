//! Adobe/Resolve .cube LUT format support.
//!
//! # Format
//!
//! ```text
//! # Generated by lutprint
//! TITLE "lutprint N=17 M=8 wide"
//! LUT_3D_SIZE 17
//! DOMAIN_MIN 0.0 0.0 0.0
//! DOMAIN_MAX 1.0 1.0 1.0
//! 0.000000 0.000000 0.000000
//! ...
//! 1.000000 1.000000 1.000000
//! ```
//!
//! Data lines run with R fastest, then G, then B, six decimal places.

use crate::{Lut3D, LutError, LutResult};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Title used when a LUT has none.
pub const DEFAULT_TITLE: &str = "lutprint";

/// Reads a 3D LUT from a .cube file.
pub fn read_3d<P: AsRef<Path>>(path: P) -> LutResult<Lut3D> {
    let file = File::open(path.as_ref())?;
    parse_3d(BufReader::new(file))
}

/// Parses a 3D LUT from a reader.
///
/// Comments, blank lines and unknown keywords are skipped.
pub fn parse_3d<R: BufRead>(reader: R) -> LutResult<Lut3D> {
    let mut size: Option<usize> = None;
    let mut title: Option<String> = None;
    let mut domain_min = [0.0_f64; 3];
    let mut domain_max = [1.0_f64; 3];
    let mut data: Vec<[f64; 3]> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let keyword = line.split_whitespace().next().unwrap_or_default();
        match keyword {
            "TITLE" => title = Some(parse_title(line)),
            "LUT_3D_SIZE" => size = Some(parse_size(line, line_no)?),
            "LUT_1D_SIZE" => {
                return Err(LutError::parse(line_no, "expected 3D LUT, found 1D"));
            }
            "DOMAIN_MIN" => domain_min = parse_triplet(line, 1, line_no)?,
            "DOMAIN_MAX" => domain_max = parse_triplet(line, 1, line_no)?,
            k if k.starts_with(|c: char| c.is_ascii_alphabetic()) => {
                tracing::debug!(line = line_no, keyword = k, "skipping unknown .cube keyword");
            }
            _ => data.push(parse_triplet(line, 0, line_no)?),
        }
    }

    let size = size.ok_or_else(|| LutError::parse(0, "missing LUT_3D_SIZE"))?;
    let expected = size * size * size;
    if data.len() != expected {
        return Err(LutError::InvalidSize(format!(
            "expected {} values, found {}",
            expected,
            data.len()
        )));
    }

    let mut lut = Lut3D::from_data(data, size)?.with_domain(domain_min, domain_max);
    lut.title = title;
    Ok(lut)
}

/// Writes a 3D LUT to a .cube file.
pub fn write_3d<P: AsRef<Path>>(path: P, lut: &Lut3D) -> LutResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_to(&mut writer, lut)?;
    writer.flush()?;
    Ok(())
}

/// Renders a 3D LUT as .cube text.
pub fn to_string(lut: &Lut3D) -> String {
    let mut out = Vec::with_capacity(64 + lut.entry_count() * 27);
    // Writing into a Vec cannot fail.
    let _ = write_to(&mut out, lut);
    String::from_utf8(out).unwrap_or_default()
}

/// Writes a 3D LUT as .cube text to any writer.
pub fn write_to<W: Write>(mut w: W, lut: &Lut3D) -> LutResult<()> {
    let title = lut.title.as_deref().unwrap_or(DEFAULT_TITLE).replace('"', "'");
    let (min, max) = (lut.domain_min, lut.domain_max);

    writeln!(w, "# Generated by lutprint")?;
    writeln!(w, "TITLE \"{title}\"")?;
    writeln!(w, "LUT_3D_SIZE {}", lut.size)?;
    writeln!(w, "DOMAIN_MIN {:?} {:?} {:?}", min[0], min[1], min[2])?;
    writeln!(w, "DOMAIN_MAX {:?} {:?} {:?}", max[0], max[1], max[2])?;

    // Memory order already matches file order.
    for rgb in &lut.data {
        writeln!(w, "{:.6} {:.6} {:.6}", rgb[0], rgb[1], rgb[2])?;
    }
    Ok(())
}

fn parse_title(line: &str) -> String {
    line["TITLE".len()..].trim().trim_matches('"').to_string()
}

fn parse_size(line: &str, line_no: usize) -> LutResult<usize> {
    line.split_whitespace()
        .nth(1)
        .ok_or_else(|| LutError::parse(line_no, "invalid size line"))?
        .parse()
        .map_err(|_| LutError::parse(line_no, "invalid size value"))
}

fn parse_triplet(line: &str, skip: usize, line_no: usize) -> LutResult<[f64; 3]> {
    let parts: Vec<&str> = line.split_whitespace().skip(skip).collect();
    if parts.len() < 3 {
        return Err(LutError::parse(line_no, format!("expected 3 values: {line}")));
    }
    let mut out = [0.0f64; 3];
    for (c, part) in parts.iter().take(3).enumerate() {
        out[c] = part
            .parse()
            .map_err(|_| LutError::parse(line_no, format!("invalid number '{part}'")))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn writes_exact_header() {
        let text = to_string(&Lut3D::identity(2).with_title("lutprint N=2 M=1 wide"));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# Generated by lutprint");
        assert_eq!(lines[1], "TITLE \"lutprint N=2 M=1 wide\"");
        assert_eq!(lines[2], "LUT_3D_SIZE 2");
        assert_eq!(lines[3], "DOMAIN_MIN 0.0 0.0 0.0");
        assert_eq!(lines[4], "DOMAIN_MAX 1.0 1.0 1.0");
        assert_eq!(lines[5], "0.000000 0.000000 0.000000");
        assert_eq!(lines[6], "1.000000 0.000000 0.000000");
        assert_eq!(lines[7], "0.000000 1.000000 0.000000");
        assert_eq!(lines[9], "0.000000 0.000000 1.000000");
        assert_eq!(lines.len(), 5 + 8);
    }

    #[test]
    fn untitled_lut_gets_default_title() {
        let text = to_string(&Lut3D::identity(2));
        assert!(text.contains("TITLE \"lutprint\""));
    }

    #[test]
    fn parse_3d_cube() {
        let cube = r#"
# Test LUT
TITLE "Test Grade"
LUT_3D_SIZE 2
DOMAIN_MIN 0.0 0.0 0.0
DOMAIN_MAX 1.0 1.0 1.0

0.0 0.0 0.0
1.0 0.0 0.0
0.0 1.0 0.0
1.0 1.0 0.0
0.0 0.0 1.0
1.0 0.0 1.0
0.0 1.0 1.0
1.0 1.0 1.0
"#;
        let lut = parse_3d(Cursor::new(cube)).expect("parse failed");
        assert_eq!(lut.size, 2);
        assert_eq!(lut.title.as_deref(), Some("Test Grade"));
        assert_eq!(lut.get(1, 0, 0), [1.0, 0.0, 0.0]);
        assert_eq!(lut.get(0, 1, 1), [0.0, 1.0, 1.0]);
    }

    #[test]
    fn parse_reports_bad_line() {
        let cube = "LUT_3D_SIZE 2\n0.0 0.0\n";
        match parse_3d(Cursor::new(cube)) {
            Err(LutError::ParseError { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_1d_and_short_data() {
        assert!(parse_3d(Cursor::new("LUT_1D_SIZE 4\n")).is_err());
        assert!(matches!(
            parse_3d(Cursor::new("LUT_3D_SIZE 2\n0 0 0\n")),
            Err(LutError::InvalidSize(_))
        ));
        assert!(parse_3d(Cursor::new("0 0 0\n")).is_err());
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("identity.cube");
        let lut = Lut3D::identity(4).with_title("identity");

        write_3d(&path, &lut).expect("write failed");
        let loaded = read_3d(&path).expect("read failed");

        assert_eq!(loaded.size, 4);
        assert_eq!(loaded.title.as_deref(), Some("identity"));
        for (a, b) in loaded.data.iter().zip(&lut.data) {
            for c in 0..3 {
                assert!((a[c] - b[c]).abs() < 1e-6);
            }
        }
    }
}
