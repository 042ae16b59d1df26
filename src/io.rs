//! Delimited-text ingestion and export.
//!
//! Input is a header row followed by one point per row. The delimiter is `;`
//! if the header contains one, `,` otherwise. The first column named
//! `cluster`, `cluster_id`, `label`, `id` or `class` (any case) carries a
//! label; every other column is a coordinate and must hold a finite number.
//! Malformed rows are skipped with a warning rather than failing the whole
//! file.

use crate::error::Result;
use crate::point::{Point, PointSet, UNASSIGNED};
use crate::result::ClusteringResult;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, warn};

const LABEL_COLUMNS: [&str; 5] = ["cluster", "cluster_id", "label", "id", "class"];

/// Read points from delimited text.
pub fn read_points<R: Read>(mut reader: R) -> Result<Vec<Point>> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;

    let Some(header) = text.lines().find(|l| !l.trim().is_empty()) else {
        return Ok(Vec::new());
    };
    let delimiter = if header.contains(';') { b';' } else { b',' };

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_lowercase()).collect();
    let label_index = headers.iter().position(|h| LABEL_COLUMNS.contains(&h.as_str()));
    debug!(columns = ?headers, label_column = ?label_index, "parsed header");

    let mut points = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        if record.len() != headers.len() {
            warn!(
                row = line + 1,
                fields = record.len(),
                expected = headers.len(),
                "skipping row with wrong field count"
            );
            continue;
        }

        let mut coordinates = Vec::with_capacity(headers.len());
        let mut cluster_id = UNASSIGNED;
        let mut malformed = false;
        for (i, field) in record.iter().enumerate() {
            if Some(i) == label_index {
                cluster_id = parse_label(field);
                continue;
            }
            match field.parse::<f64>() {
                Ok(v) if v.is_finite() => coordinates.push(v),
                _ => {
                    malformed = true;
                    break;
                }
            }
        }

        if malformed {
            warn!(row = line + 1, "skipping row with non-numeric or non-finite coordinate");
            continue;
        }
        if coordinates.len() < 2 {
            warn!(row = line + 1, "skipping row with fewer than two coordinates");
            continue;
        }
        points.push(Point::new(coordinates).with_cluster_id(cluster_id));
    }

    Ok(points)
}

fn parse_label(field: &str) -> usize {
    match field.parse::<i64>() {
        Ok(v) if v >= 0 => usize::try_from(v).unwrap_or(UNASSIGNED),
        _ => UNASSIGNED,
    }
}

/// Read points from a file.
pub fn read_points_from_path(path: impl AsRef<Path>) -> Result<Vec<Point>> {
    let file = File::open(path.as_ref())?;
    read_points(BufReader::new(file))
}

/// Read a file straight into a [`PointSet`].
pub fn read_point_set(path: impl AsRef<Path>) -> Result<PointSet> {
    PointSet::from_points(read_points_from_path(path)?)
}

/// Column names for `dimension` coordinates plus the label.
pub fn header(dimension: usize) -> Vec<String> {
    let mut names: Vec<String> = if dimension <= 3 {
        ["x", "y", "z"][..dimension].iter().map(|s| s.to_string()).collect()
    } else {
        (1..=dimension).map(|i| format!("x{i}")).collect()
    };
    names.push("cluster_id".to_string());
    names
}

/// Write one row per point: coordinates, then the label (`-1` when
/// unassigned).
pub fn write_points<W: Write>(writer: W, points: &PointSet) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header(points.dimension()))?;

    for i in 0..points.len() {
        let mut row: Vec<String> = points.row(i).iter().map(|v| v.to_string()).collect();
        row.push(format_label(points.label(i)));
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the labelled points of a result.
pub fn write_result<W: Write>(writer: W, result: &ClusteringResult) -> Result<()> {
    write_points(writer, &result.points)
}

/// Write the labelled points of a result to a file.
pub fn write_result_to_path(path: impl AsRef<Path>, result: &ClusteringResult) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_result(BufWriter::new(file), result)
}

fn format_label(label: usize) -> String {
    if label == UNASSIGNED {
        "-1".to_string()
    } else {
        label.to_string()
    }
}
