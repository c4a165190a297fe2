//! Per-run packing-fraction time series as CSV.
//!
//! One header line followed by one row per frame, columns in the order of
//! [`HEADER`]. Floats are written with Rust's shortest round-trip formatting
//! so a file read back yields the exact recorded values.

use crate::error::{IoError, Result};
use aggpack_data::FrameRecord;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

pub const HEADER: &str = "time,aggregate_volume,bounding_radius,packing_fraction,max_radius";
const COLUMNS: usize = 5;

/// Writes a header and `records` to `writer`.
pub fn write_records<W: Write>(writer: W, records: &[FrameRecord]) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    writeln!(writer, "{HEADER}")?;
    for r in records {
        writeln!(
            writer,
            "{},{},{},{},{}",
            r.time, r.aggregate_volume, r.bounding_radius, r.packing_fraction, r.max_radius
        )?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_csv_file<P: AsRef<Path>>(path: P, records: &[FrameRecord]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(|e| IoError::FileSystem(e).with_context(format!("creating {path:?}")))?;
    write_records(file, records).map_err(|e| e.with_context(format!("writing {path:?}")))
}

/// Parses a series written by [`write_records`].
pub fn read_records<R: BufRead>(reader: R) -> Result<Vec<FrameRecord>> {
    let mut lines = reader.lines();
    let header = lines
        .next()
        .ok_or_else(|| IoError::validation("missing CSV header"))??;
    if header.trim() != HEADER {
        return Err(IoError::validation(format!(
            "unexpected CSV header: {}",
            header.trim()
        )));
    }

    let mut records = Vec::new();
    for (i, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = i + 2;
        records.push(parse_row(&line).map_err(|e| e.with_context(format!("line {row}")))?);
    }
    Ok(records)
}

pub fn read_csv_file<P: AsRef<Path>>(path: P) -> Result<Vec<FrameRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::not_found(path.display().to_string())
        } else {
            IoError::FileSystem(e).with_context(format!("opening {path:?}"))
        }
    })?;
    read_records(BufReader::new(file)).map_err(|e| e.with_context(format!("reading {path:?}")))
}

fn parse_row(line: &str) -> Result<FrameRecord> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != COLUMNS {
        return Err(IoError::validation(format!(
            "expected {COLUMNS} columns, found {}",
            fields.len()
        )));
    }
    let float = |idx: usize| -> Result<f64> {
        fields[idx]
            .parse()
            .map_err(|e| IoError::validation(format!("column {idx}: {e}")))
    };
    Ok(FrameRecord {
        time: fields[0]
            .parse()
            .map_err(|e| IoError::validation(format!("column 0: {e}")))?,
        aggregate_volume: float(1)?,
        bounding_radius: float(2)?,
        packing_fraction: float(3)?,
        max_radius: float(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> Vec<FrameRecord> {
        (0..3)
            .map(|t| FrameRecord {
                time: t,
                aggregate_volume: 12.566,
                bounding_radius: 10.0 - f64::from(t),
                packing_fraction: 0.1 + 0.01 * f64::from(t),
                max_radius: 10.0 - f64::from(t),
            })
            .collect()
    }

    #[test]
    fn test_header_and_rows() {
        let mut buf = Vec::new();
        write_records(&mut buf, &series()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "0,12.566,10,0.1,10");
    }

    #[test]
    fn test_read_back_exact() {
        let mut buf = Vec::new();
        write_records(&mut buf, &series()).unwrap();
        let restored = read_records(buf.as_slice()).unwrap();
        assert_eq!(restored, series());
    }

    #[test]
    fn test_empty_series_is_header_only() {
        let mut buf = Vec::new();
        write_records(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), format!("{HEADER}\n"));
    }

    #[test]
    fn test_rejects_wrong_header() {
        let input = "frame,volume\n0,1\n";
        assert!(matches!(
            read_records(input.as_bytes()),
            Err(IoError::Validation(_))
        ));
        assert!(read_records("".as_bytes()).is_err());
    }

    #[test]
    fn test_bad_row_names_line() {
        let input = format!("{HEADER}\n0,1,2,3,4\n1,1,2,oops,4\n");
        let err = read_records(input.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }
}
