//! CSV reader and writer for 3-component points

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{IoError, IoResult};

/// A point with three floating coordinates
pub type Point3 = [f64; 3];

/// Digits after the decimal point in written fields
pub const CSV_PRECISION: usize = 15;

/// Format `value` the way C's `%.{precision}e` does
///
/// Rust writes exponents as `e3` / `e-7`; C writes a sign and at least two
/// digits (`e+03` / `e-07`). Non-finite values become `nan`, `inf`, `-inf`.
pub fn format_c_exp(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let formatted = format!("{:.*e}", precision, value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => formatted,
    }
}

/// Write points, one `x,y,z` line each
pub fn write_points<W: Write>(writer: W, points: &[Point3]) -> IoResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    for point in points {
        let fields = point.map(|v| format_c_exp(v, CSV_PRECISION));
        writer.write_record(&fields)?;
    }
    writer
        .flush()
        .map_err(|e| IoError::WriteFailed(e.to_string()))?;
    Ok(())
}

/// Read points, skipping records that are not three numbers
///
/// Fields are trimmed before parsing. A record qualifies when its first
/// two fields parse as `f64` and the third starts with a number; text
/// after that number and any extra fields are ignored.
pub fn read_points<R: Read>(reader: R) -> IoResult<Vec<Point3>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(IoError::Csv(e)),
            Err(_) => {
                skipped += 1;
                continue;
            }
        };
        match parse_point(&record) {
            Some(point) => points.push(point),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, kept = points.len(), "Skipped unparseable CSV records");
    }
    Ok(points)
}

fn parse_point(record: &csv::StringRecord) -> Option<Point3> {
    if record.len() < 3 {
        return None;
    }
    Some([
        record[0].parse().ok()?,
        record[1].parse().ok()?,
        parse_leading_f64(&record[2])?,
    ])
}

/// Parse the longest prefix of `field` that is a number
///
/// Text after the last number is ignored (`"3abc"` reads as 3), as
/// C's `%lf` does for the final field of a line.
fn parse_leading_f64(field: &str) -> Option<f64> {
    if let Ok(value) = field.parse() {
        return Some(value);
    }
    field
        .char_indices()
        .rev()
        .filter(|&(end, _)| end > 0)
        .find_map(|(end, _)| field[..end].parse().ok())
}

/// Save points to `path`, replacing any existing file
pub fn save_to_csv(path: impl AsRef<Path>, points: &[Point3]) -> IoResult<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(|e| IoError::OpenFailed(format!("{}: {}", path.display(), e)))?;
    write_points(BufWriter::new(file), points)?;
    tracing::debug!(count = points.len(), path = %path.display(), "Saved points");
    Ok(())
}

/// Load points from `path`
pub fn load_from_csv(path: impl AsRef<Path>) -> IoResult<Vec<Point3>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::FileNotFound(path.display().to_string()));
    }
    let file = File::open(path)
        .map_err(|e| IoError::OpenFailed(format!("{}: {}", path.display(), e)))?;
    let points = read_points(BufReader::new(file))?;
    tracing::debug!(count = points.len(), path = %path.display(), "Loaded points");
    Ok(points)
}
