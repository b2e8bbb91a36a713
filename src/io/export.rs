//! CSV exports.
//!
//! - per-station residuals, easy to consume in spreadsheets or plotting scripts
//! - station tables in the ingest schema (used by `slip synth`)

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{Station, StationResidual};
use crate::error::AppError;

/// Write per-station residuals to a CSV file.
pub fn write_residuals_csv(path: &Path, residuals: &[StationResidual]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_residuals(file, residuals)
}

/// Write per-station residuals to any writer (6 decimal places).
pub fn write_residuals<W: Write>(out: W, residuals: &[StationResidual]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(["id", "distance_km", "v_obs", "sigma", "v_model", "residual"])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in residuals {
        writer
            .write_record([
                r.id.clone(),
                format!("{:.6}", r.distance_km),
                format!("{:.6}", r.v_obs),
                format!("{:.6}", r.sigma),
                format!("{:.6}", r.v_model),
                format!("{:.6}", r.residual),
            ])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row '{}': {e}", r.id)))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write stations to any writer, in the schema `io::ingest` reads.
pub fn write_stations<W: Write>(out: W, stations: &[Station]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    for s in stations {
        writer
            .serialize(s)
            .map_err(|e| AppError::new(2, format!("Failed to write station row '{}': {e}", s.id)))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush station CSV: {e}")))?;
    Ok(())
}

/// Write stations to a CSV file.
pub fn write_stations_csv(path: &Path, stations: &[Station]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create station CSV '{}': {e}", path.display())))?;
    write_stations(file, stations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::read_stations;

    #[test]
    fn station_table_reads_back() {
        let stations = vec![
            Station {
                id: "A1".to_string(),
                lon: -117.25,
                lat: 33.5,
                ve: 12.0,
                vn: -7.5,
                se: 0.3,
                sn: 0.4,
                corr: 0.1,
            },
            Station {
                id: "B2".to_string(),
                lon: -116.75,
                lat: 33.25,
                ve: -3.0,
                vn: 4.0,
                se: 0.5,
                sn: 0.5,
                corr: 0.0,
            },
        ];

        let mut buf = Vec::new();
        write_stations(&mut buf, &stations).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("id,lon,lat,ve,vn,se,sn,corr"));

        let back = read_stations(text.as_bytes()).unwrap();
        assert_eq!(back.stations, stations);
    }

    #[test]
    fn residual_csv_has_one_row_per_station() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("residuals.csv");
        let rows = vec![StationResidual {
            id: "S1".to_string(),
            distance_km: -4.0,
            v_obs: 1.0,
            sigma: 0.5,
            v_model: 0.75,
            residual: 0.25,
        }];
        write_residuals_csv(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "S1,-4.000000,1.000000,0.500000,0.750000,0.250000");
    }

    #[test]
    fn residual_ids_with_commas_are_quoted() {
        let rows = vec![StationResidual {
            id: "SITE,A".to_string(),
            distance_km: 3.0,
            v_obs: 1.0,
            sigma: 2.0,
            v_model: 0.5,
            residual: 0.5,
        }];
        let mut buf = Vec::new();
        write_residuals(&mut buf, &rows).unwrap();

        let mut reader = csv::Reader::from_reader(buf.as_slice());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].len(), 6);
        assert_eq!(&records[0][0], "SITE,A");
        assert_eq!(&records[0][2], "1.000000");
    }
}
