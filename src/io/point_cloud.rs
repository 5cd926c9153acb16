//! Point-cloud and weight CSV ingest.
//!
//! Point clouds are `x,y,z` rows; weights are a single column. Either file may
//! start with a header row, detected by its first field not being a number.
//! Any other malformed row is an error naming its line (exit code 2).

use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use nalgebra::{DVector, Point3};
use tracing::debug;

use crate::domain::PointCloud;
use crate::error::AppError;

/// Read an `x,y,z` CSV into a point cloud.
pub fn read_point_cloud_csv(path: &Path) -> Result<PointCloud, AppError> {
    let rows = read_numeric_rows(path, 3)?;
    let points: PointCloud = rows.into_iter().map(|r| Point3::new(r[0], r[1], r[2])).collect();
    debug!(path = %path.display(), points = points.len(), "read point cloud");
    Ok(points)
}

/// Read a single-column CSV into a weight vector.
pub fn read_weights_csv(path: &Path) -> Result<DVector<f64>, AppError> {
    let rows = read_numeric_rows(path, 1)?;
    let weights = DVector::from_iterator(rows.len(), rows.into_iter().map(|r| r[0]));
    debug!(path = %path.display(), weights = weights.len(), "read weights");
    Ok(weights)
}

fn read_numeric_rows(path: &Path, columns: usize) -> Result<Vec<Vec<f64>>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(file);

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 1;
        let record = result.map_err(|e| {
            AppError::new(2, format!("{}: line {line}: CSV parse error: {e}", path.display()))
        })?;

        if is_blank(&record) {
            continue;
        }
        if line == 1 && looks_like_header(&record) {
            continue;
        }

        let row = parse_row(&record, columns)
            .map_err(|msg| AppError::new(2, format!("{}: line {line}: {msg}", path.display())))?;
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(AppError::new(2, format!("{}: no data rows", path.display())));
    }
    Ok(rows)
}

fn parse_row(record: &StringRecord, columns: usize) -> Result<Vec<f64>, String> {
    if record.len() != columns {
        return Err(format!("expected {columns} column(s), found {}", record.len()));
    }
    record
        .iter()
        .map(|field| {
            let value: f64 = field
                .parse()
                .map_err(|_| format!("'{field}' is not a number"))?;
            if value.is_finite() {
                Ok(value)
            } else {
                Err(format!("'{field}' is not finite"))
            }
        })
        .collect()
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(str::is_empty)
}

fn looks_like_header(record: &StringRecord) -> bool {
    record
        .get(0)
        .map(|f| f.trim_start_matches('\u{feff}'))
        .is_some_and(|f| f.parse::<f64>().is_err())
}
