use std::fmt;
use std::path::{Path, PathBuf};

use clap::{Args, Command, FromArgMatches as _};
use log::{info, LevelFilter};

use crate::engine::{DaySnapshot, Simulation};
use crate::error::EpiError;
use crate::log::{parse_module_filter, set_log_level, set_module_filters};
use crate::parameters::{load_parameters_from_json, Parameters};
use crate::report::DailyReport;

/// File name of the daily report written into `--output-dir`.
pub const DAILY_REPORT_FILE: &str = "daily_report.csv";

/// Default cli arguments for the epiwave runner
#[derive(Args, Debug)]
pub struct BaseArgs {
    /// Random seed
    #[arg(short, long, default_value = "0")]
    pub random_seed: u64,

    /// Optional path for a JSON parameter file. The built-in parameters are used otherwise
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Optional directory for the daily report
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(short, long, default_value = "info", value_parser = parse_log_level)]
    pub log_level: LevelFilter,

    /// Per-module log level as `module=level`, e.g. `epiwave::engine=debug`. Repeatable
    #[arg(long = "log-filter", value_parser = parse_module_filter)]
    pub log_filters: Vec<(String, LevelFilter)>,
}

impl Default for BaseArgs {
    fn default() -> Self {
        BaseArgs {
            random_seed: 0,
            config: None,
            output_dir: None,
            log_level: LevelFilter::Info,
            log_filters: Vec::new(),
        }
    }
}

fn parse_log_level(level: &str) -> Result<LevelFilter, String> {
    level
        .parse::<LevelFilter>()
        .map_err(|_| format!("unknown log level `{level}`"))
}

fn create_epiwave_cli() -> Command {
    let cli = Command::new("epiwave")
        .about("Wave-based stochastic epidemic progression")
        .version(env!("CARGO_PKG_VERSION"));
    BaseArgs::augment_args(cli)
}

/// Final tallies of a completed run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub seed: u64,
    pub days: u64,
    pub total_infected_ever: usize,
    pub mild_recovered: usize,
    pub severe_recovered: usize,
    pub dead: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "seed {}: finished on day {} with {} infected, {} mild recovered, {} severe recovered, {} dead",
            self.seed,
            self.days,
            self.total_infected_ever,
            self.mild_recovered,
            self.severe_recovered,
            self.dead
        )
    }
}

/// Runs an epidemic with the command line arguments of this process.
///
/// # Errors
/// Returns an error if argument parsing fails or the run itself does
#[allow(clippy::missing_errors_doc)]
pub fn run_with_args() -> Result<RunSummary, Box<dyn std::error::Error>> {
    let cli = create_epiwave_cli();
    let matches = cli.get_matches();

    let base_args_matches = BaseArgs::from_arg_matches(&matches)?;
    configure_logging(&base_args_matches);
    Ok(run_with_args_internal(base_args_matches)?)
}

fn configure_logging(args: &BaseArgs) {
    set_log_level(args.log_level);
    let filters: Vec<(&str, LevelFilter)> = args
        .log_filters
        .iter()
        .map(|(module, level)| (module.as_str(), *level))
        .collect();
    set_module_filters(&filters);
}

fn log_overlay(snapshot: &DaySnapshot) {
    info!(
        "DAY : {} INFECTED : {} DEAD : {} MILD_RECOVERED : {} SEVERE_RECOVERED : {}",
        snapshot.day,
        snapshot.currently_infected,
        snapshot.dead,
        snapshot.mild_recovered,
        snapshot.severe_recovered
    );
}

/// Runs an epidemic to completion with already parsed arguments. The log level is left to the
/// caller.
///
/// # Errors
///
/// Any error from loading the parameters, creating or writing the report, or the engine.
pub fn run_with_args_internal(args: BaseArgs) -> Result<RunSummary, EpiError> {
    // Optionally load parameters from a file
    let parameters = match &args.config {
        Some(config_path) => {
            info!("Loading parameters from: {}", config_path.display());
            load_parameters_from_json(config_path)?
        }
        None => Parameters::default(),
    };

    // Optionally write the daily report
    let mut report = match &args.output_dir {
        Some(output_dir) => Some(DailyReport::create(
            &Path::new(output_dir).join(DAILY_REPORT_FILE),
        )?),
        None => None,
    };

    let mut simulation = Simulation::new(parameters, args.random_seed)?;
    if let Some(state) = simulation.state() {
        let initial = state.initial_snapshot();
        log_overlay(&initial);
        if let Some(report) = report.as_mut() {
            report.send(&initial)?;
        }
    }

    for snapshot in simulation.by_ref() {
        let snapshot = snapshot?;
        log_overlay(&snapshot);
        if let Some(report) = report.as_mut() {
            report.send(&snapshot)?;
        }
    }

    let seed = simulation.seed();
    let state = simulation
        .into_state()
        .ok_or_else(|| EpiError::ReportError("simulation ended without a state".to_string()))?;
    let counters = state.counters();
    Ok(RunSummary {
        seed,
        days: state.day(),
        total_infected_ever: counters.total_infected_ever,
        mild_recovered: counters.mild_recovered,
        severe_recovered: counters.severe_recovered,
        dead: counters.dead,
    })
}
