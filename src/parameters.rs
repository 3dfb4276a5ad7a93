//! Disease parameters.
//!
//! A [`Parameters`] value is immutable once the engine is built. It can be constructed in code
//! (`Parameters::default()` gives the COVID-19 values the model was calibrated with) or loaded
//! from a JSON file with [`load_parameters_from_json`]:
//!
//! ```json
//! {
//!   "r0": 2.28,
//!   "incubation": 5,
//!   "percent_mild": 0.8,
//!   "mild_recovery": [7, 14],
//!   "percent_severe": 0.2,
//!   "severe_recovery": [21, 42],
//!   "severe_death": [14, 56],
//!   "fatality_rate": 0.034,
//!   "serial_interval": 5,
//!   "population_size": 4500
//! }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::EpiError;

/// How far `percent_mild + percent_severe` may drift from 1 before it is rejected.
const FRACTION_SUM_TOLERANCE: f64 = 1e-9;

/// A `(min, max)` window in days, counted from the end of incubation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange(pub u64, pub u64);

impl DayRange {
    #[must_use]
    pub fn min(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn max(self) -> u64 {
        self.1
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// Expected secondary infections per case.
    pub r0: f64,
    /// Days before the outcome clock starts.
    pub incubation: u64,
    /// Fraction of new infections classified mild.
    pub percent_mild: f64,
    pub mild_recovery: DayRange,
    /// Fraction of new infections classified severe.
    pub percent_severe: f64,
    pub severe_recovery: DayRange,
    pub severe_death: DayRange,
    /// Fraction of *all* infections ending in death. Deaths are drawn from the severe share.
    pub fatality_rate: f64,
    /// Days between successive waves.
    pub serial_interval: u64,
    pub population_size: usize,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            r0: 2.28,
            incubation: 5,
            percent_mild: 0.8,
            mild_recovery: DayRange(7, 14),
            percent_severe: 0.2,
            severe_recovery: DayRange(21, 42),
            severe_death: DayRange(14, 56),
            fatality_rate: 0.034,
            serial_interval: 5,
            population_size: 4500,
        }
    }
}

fn config_error<T>(message: String) -> Result<T, EpiError> {
    Err(EpiError::ConfigError(message))
}

fn check_fraction(name: &str, value: f64) -> Result<(), EpiError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        config_error(format!("{name} must be in (0, 1], got {value}"))
    }
}

impl Parameters {
    /// Checks every invariant the engine relies on.
    ///
    /// # Errors
    ///
    /// `EpiError::ConfigError` naming the first offending field.
    pub fn validate(&self) -> Result<(), EpiError> {
        if !self.r0.is_finite() || self.r0 < 0.0 {
            return config_error(format!("r0 must be a non-negative number, got {}", self.r0));
        }
        check_fraction("percent_mild", self.percent_mild)?;
        check_fraction("percent_severe", self.percent_severe)?;
        if (self.percent_mild + self.percent_severe - 1.0).abs() > FRACTION_SUM_TOLERANCE {
            return config_error(format!(
                "percent_mild + percent_severe must equal 1, got {}",
                self.percent_mild + self.percent_severe
            ));
        }
        if !(0.0..=1.0).contains(&self.fatality_rate) {
            return config_error(format!(
                "fatality_rate must be in [0, 1], got {}",
                self.fatality_rate
            ));
        }
        if self.fatality_rate > self.percent_severe {
            return config_error(format!(
                "fatality_rate ({}) cannot exceed percent_severe ({})",
                self.fatality_rate, self.percent_severe
            ));
        }
        for (name, range) in [
            ("mild_recovery", self.mild_recovery),
            ("severe_recovery", self.severe_recovery),
            ("severe_death", self.severe_death),
        ] {
            if range.min() > range.max() {
                return config_error(format!(
                    "{name} lower bound {} exceeds upper bound {}",
                    range.min(),
                    range.max()
                ));
            }
            // Outcomes are resolved starting the day after classification.
            if self.incubation + range.min() == 0 {
                return config_error(format!(
                    "incubation + {name} lower bound must be at least one day"
                ));
            }
        }
        if self.serial_interval == 0 {
            return config_error("serial_interval must be at least one day".to_string());
        }
        if self.population_size == 0 {
            return config_error("population_size must be at least 1".to_string());
        }
        Ok(())
    }

    /// Probability that a severe case recovers rather than dies.
    #[must_use]
    pub fn severe_recovery_fraction(&self) -> f64 {
        1.0 - self.fatality_rate / self.percent_severe
    }
}

/// Reads parameters from a JSON file and validates them.
///
/// # Errors
///
/// `EpiError::IoError` if the file cannot be opened, `EpiError::JsonError` if it does not
/// describe a `Parameters` value, and `EpiError::ConfigError` if the values are invalid.
pub fn load_parameters_from_json(file_path: &Path) -> Result<Parameters, EpiError> {
    trace!("Loading parameters from {}", file_path.display());
    let file = File::open(file_path)?;
    let parameters: Parameters = serde_json::from_reader(BufReader::new(file))?;
    parameters.validate()?;
    Ok(parameters)
}
