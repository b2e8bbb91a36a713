//! Station CSV ingest.
//!
//! Turns a GNSS velocity table into validated [`Station`] records.
//!
//! Schema (header names are case-insensitive; a UTF-8 BOM is ignored):
//!
//! - required: `id`, `lon`, `lat`, `ve`, `vn`, `se`, `sn`
//! - optional: `corr` (alias `rho`), defaults to 0
//!
//! `longitude`/`latitude` are accepted as aliases of `lon`/`lat`. Bad rows are
//! skipped and reported; a file with no usable rows is an error.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::warn;

use crate::domain::Station;
use crate::error::AppError;

const REQUIRED: [&str; 7] = ["id", "lon", "lat", "ve", "vn", "se", "sn"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Ingest output: stations in file order + row errors.
#[derive(Debug, Clone)]
pub struct IngestedStations {
    pub stations: Vec<Station>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load stations from a CSV file.
pub fn load_stations(path: &Path) -> Result<IngestedStations, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_stations(file)
}

/// Load stations from any CSV reader.
pub fn read_stations<R: Read>(input: R) -> Result<IngestedStations, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for col in REQUIRED {
        if !header_map.contains_key(col) {
            return Err(AppError::new(2, format!("Missing required column: `{col}`")));
        }
    }

    let mut stations = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1, records are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(station) => stations.push(station),
            Err(message) => {
                let id = get_optional(&record, &header_map, "id").map(str::to_string);
                warn!(line, id = id.as_deref().unwrap_or(""), %message, "skipping station row");
                row_errors.push(RowError { line, id, message });
            }
        }
    }

    if stations.is_empty() {
        return Err(AppError::new(3, "No valid station rows in CSV."));
    }

    Ok(IngestedStations {
        stations,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        let key = canonical_column(&normalize_header_name(name));
        map.entry(key).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn canonical_column(name: &str) -> String {
    match name {
        "longitude" => "lon",
        "latitude" => "lat",
        "rho" => "corr",
        other => other,
    }
    .to_string()
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<Station, String> {
    let id = get_required(record, header_map, "id")?.to_string();
    let lon = parse_required_f64(record, header_map, "lon")?;
    let lat = parse_required_f64(record, header_map, "lat")?;
    let ve = parse_required_f64(record, header_map, "ve")?;
    let vn = parse_required_f64(record, header_map, "vn")?;
    let se = parse_required_f64(record, header_map, "se")?;
    let sn = parse_required_f64(record, header_map, "sn")?;
    let corr = match get_optional(record, header_map, "corr") {
        Some(s) => parse_f64(s).ok_or_else(|| format!("Invalid `corr` value: {s:?}"))?,
        None => 0.0,
    };

    if se <= 0.0 || sn <= 0.0 {
        return Err(format!("Velocity errors must be > 0 (se={se}, sn={sn})."));
    }
    if !(-1.0..=1.0).contains(&corr) {
        return Err(format!("Correlation must be in [-1, 1], got {corr}."));
    }

    Ok(Station {
        id,
        lon,
        lat,
        ve,
        vn,
        se,
        sn,
        corr,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    col: &str,
) -> Result<&'a str, String> {
    get_optional(record, header_map, col).ok_or_else(|| format!("Missing `{col}` value."))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, col: &str) -> Option<&'a str> {
    let idx = *header_map.get(col)?;
    let value = record.get(idx)?.trim();
    if value.is_empty() { None } else { Some(value) }
}

fn parse_required_f64(record: &StringRecord, header_map: &HashMap<String, usize>, col: &str) -> Result<f64, String> {
    let raw = get_required(record, header_map, col)?;
    parse_f64(raw).ok_or_else(|| format!("Invalid `{col}` value: {raw:?}"))
}

fn parse_f64(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}
