//! Flat CSV schema for persisted trial history.
//!
//! Expected headers (strict, in order):
//! timestamp,grind_size,dose_coffee,basket_size,time,beverage_mass,tds,temp,
//! tamp_pressure,ey,ratio,flow,sour,bitter,astringent,weak,harsh,balanced,
//! body,aroma,sweetness,freshness,bad_distribution,uneven_tamp,
//! inaccurate_dose,broken_puck,use_measured_tds,grinder_kind,per_rev_max,
//! dial_number,extra_turns,high_dial_means_coarser,suggestion
//!
//! Boolean columns are stored as 0/1. `ratio` and `flow` are derived values
//! written for spreadsheet use; readers may ignore them.

use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TrialRow {
    pub timestamp: String,
    pub grind_size: f64,
    pub dose_coffee: f64,
    pub basket_size: f64,
    pub time: f64,
    pub beverage_mass: f64,
    pub tds: Option<f64>,
    pub temp: f64,
    pub tamp_pressure: f64,
    pub ey: Option<f64>,
    pub ratio: Option<f64>,
    pub flow: Option<f64>,
    pub sour: f64,
    pub bitter: f64,
    pub astringent: f64,
    pub weak: f64,
    pub harsh: f64,
    pub balanced: f64,
    pub body: f64,
    pub aroma: f64,
    pub sweetness: f64,
    pub freshness: u8,
    pub bad_distribution: u8,
    pub uneven_tamp: u8,
    pub inaccurate_dose: u8,
    pub broken_puck: u8,
    pub use_measured_tds: u8,
    pub grinder_kind: String,
    pub per_rev_max: f64,
    pub dial_number: f64,
    pub extra_turns: u32,
    pub high_dial_means_coarser: u8,
    pub suggestion: Option<String>,
}

/// Read all trial rows from a reader. Headers are required and must match
/// the field names above.
pub fn read_rows<R: Read>(reader: R) -> eyre::Result<Vec<TrialRow>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut rows = Vec::new();
    for (i, rec) in rdr.deserialize::<TrialRow>().enumerate() {
        let row = rec.wrap_err_with(|| format!("trial CSV row {} is malformed", i + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Read trial rows from a file path. A missing file is not an error here;
/// callers decide whether an empty history is acceptable.
pub fn read_path(path: &Path) -> eyre::Result<Vec<TrialRow>> {
    let file = std::fs::File::open(path)
        .wrap_err_with(|| format!("failed to open trial CSV {}", path.display()))?;
    read_rows(std::io::BufReader::new(file))
}

/// Write trial rows (with headers) to a writer.
pub fn write_rows<W: Write>(writer: W, rows: &[TrialRow]) -> eyre::Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(true).from_writer(writer);
    for row in rows {
        wtr.serialize(row).wrap_err("failed to serialize trial row")?;
    }
    wtr.flush().wrap_err("failed to flush trial CSV")?;
    Ok(())
}

/// Write trial rows to a file path, replacing any existing content.
pub fn write_path(path: &Path, rows: &[TrialRow]) -> eyre::Result<()> {
    let file = std::fs::File::create(path)
        .wrap_err_with(|| format!("failed to create trial CSV {}", path.display()))?;
    write_rows(std::io::BufWriter::new(file), rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> TrialRow {
        TrialRow {
            timestamp: "2026-08-01T09:30:00Z".into(),
            grind_size: 5.0,
            dose_coffee: 18.0,
            basket_size: 18.0,
            time: 28.0,
            beverage_mass: 36.0,
            tds: None,
            temp: 93.0,
            tamp_pressure: 5.0,
            ey: None,
            ratio: Some(2.0),
            flow: Some(1.29),
            sour: 0.0,
            bitter: 0.0,
            astringent: 0.0,
            weak: 0.0,
            harsh: 0.0,
            balanced: 5.0,
            body: 5.0,
            aroma: 5.0,
            sweetness: 5.0,
            freshness: 0,
            bad_distribution: 0,
            uneven_tamp: 0,
            inaccurate_dose: 0,
            broken_puck: 0,
            use_measured_tds: 0,
            grinder_kind: "stepless".into(),
            per_rev_max: 10.0,
            dial_number: 3.0,
            extra_turns: 0,
            high_dial_means_coarser: 1,
            suggestion: None,
        }
    }

    #[test]
    fn roundtrip_preserves_rows() {
        let rows = vec![sample_row()];
        let mut buf = Vec::new();
        write_rows(&mut buf, &rows).unwrap();
        let back = read_rows(buf.as_slice()).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn malformed_row_reports_index() {
        let text = "timestamp,grind_size\n2026-08-01,not-a-number\n";
        let err = read_rows(text.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("row 1"));
    }
}
