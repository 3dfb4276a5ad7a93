//! CSV output of the daily snapshots.
//!
//! A [`DailyReport`] writes one row per [`DaySnapshot`]: the aggregate counts plus how many
//! people changed state that day. Identity lists are left to renderers, which read snapshots
//! directly.

use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::Path;

use csv::Writer;
use log::trace;
use serde::{Deserialize, Serialize};

use crate::engine::DaySnapshot;
use crate::error::EpiError;

/// One row of the daily report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReportItem {
    pub day: u64,
    pub currently_infected: usize,
    pub total_infected_ever: usize,
    pub mild_recovered: usize,
    pub severe_recovered: usize,
    pub dead: usize,
    pub new_infections: usize,
    pub new_mild_recovered: usize,
    pub new_severe_recovered: usize,
    pub new_deaths: usize,
}

impl From<&DaySnapshot> for DailyReportItem {
    fn from(snapshot: &DaySnapshot) -> Self {
        DailyReportItem {
            day: snapshot.day,
            currently_infected: snapshot.currently_infected,
            total_infected_ever: snapshot.total_infected_ever,
            mild_recovered: snapshot.mild_recovered,
            severe_recovered: snapshot.severe_recovered,
            dead: snapshot.dead,
            new_infections: snapshot.newly_infected.len(),
            new_mild_recovered: snapshot.newly_mild_recovered.len(),
            new_severe_recovered: snapshot.newly_severe_recovered.len(),
            new_deaths: snapshot.newly_dead.len(),
        }
    }
}

// Checks that the path is valid. Creates the file and all parent directories if
// they do not exist. Returns the file if successful. Called by `DailyReport::create`
fn generate_validate_filepath(path: &Path) -> Result<File, EpiError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if let Some(parent) = path.parent() {
                create_dir_all(parent)?;
            }
            let file = File::create(path)?;
            Ok(file)
        }
        _ => Err(EpiError::ReportError(
            "Report output files must be CSVs at this time".to_string(),
        )),
    }
}

pub struct DailyReport {
    writer: Writer<File>,
}

impl DailyReport {
    /// Creates (or truncates) the report file at `path`.
    ///
    /// # Errors
    ///
    /// `EpiError::ReportError` if `path` is not a `.csv` file, `EpiError::IoError` if it cannot
    /// be created.
    pub fn create(path: &Path) -> Result<Self, EpiError> {
        trace!("Creating daily report at {}", path.display());
        let file = generate_validate_filepath(path)?;
        Ok(DailyReport {
            writer: Writer::from_writer(file),
        })
    }

    /// Writes a row for `snapshot` and flushes it.
    ///
    /// # Errors
    ///
    /// `EpiError::CsvError` or `EpiError::IoError` if the row cannot be written.
    pub fn send(&mut self, snapshot: &DaySnapshot) -> Result<(), EpiError> {
        self.writer.serialize(DailyReportItem::from(snapshot))?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use tempfile::tempdir;

    use super::*;
    use crate::engine::EngineState;
    use crate::parameters::Parameters;

    fn sample_snapshot() -> DaySnapshot {
        EngineState::new(&Parameters::default(), 0)
            .unwrap()
            .initial_snapshot()
    }

    #[test]
    fn create_and_send_report() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("daily_report.csv");
        let mut report = DailyReport::create(&file_path).unwrap();

        let mut snapshot = sample_snapshot();
        report.send(&snapshot).unwrap();
        snapshot.day = 1;
        snapshot.newly_infected.clear();
        report.send(&snapshot).unwrap();

        assert!(file_path.exists(), "CSV file should exist");
        let mut reader = csv::Reader::from_path(file_path).unwrap();
        let rows: Vec<DailyReportItem> = reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].day, 0);
        assert_eq!(rows[0].new_infections, 1);
        assert_eq!(rows[0].total_infected_ever, 1);
        assert_eq!(rows[1].day, 1);
        assert_eq!(rows[1].new_infections, 0);
    }

    #[test]
    fn header_names_columns() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("daily_report.csv");
        let mut report = DailyReport::create(&file_path).unwrap();
        report.send(&sample_snapshot()).unwrap();

        let mut reader = csv::Reader::from_path(file_path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec![
                "day",
                "currently_infected",
                "total_infected_ever",
                "mild_recovered",
                "severe_recovered",
                "dead",
                "new_infections",
                "new_mild_recovered",
                "new_severe_recovered",
                "new_deaths"
            ]
        );
    }

    #[test]
    fn directory_creation_writing_works() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("test-temp").join("daily_report.csv");
        let mut report = DailyReport::create(&file_path).unwrap();
        report.send(&sample_snapshot()).unwrap();
        assert!(file_path.exists(), "CSV file should exist");
    }

    #[test]
    fn only_csvs_allowed() {
        let temp_dir = tempdir().unwrap();
        let result = DailyReport::create(&temp_dir.path().join("daily_report.tsv"));
        match result {
            Err(EpiError::ReportError(message)) => {
                assert_eq!(message, "Report output files must be CSVs at this time");
            }
            _ => panic!("Other file types beyond CSV are not allowed (yet)"),
        }
    }
}
