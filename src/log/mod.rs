//! The `log` module configures where the engine's log messages go. Logging is not to be
//! confused with the daily report, which records model output.
//!
//! Library code logs through the `log` facade macros. The engine logs a line per day at
//! `debug`, wave and classification details at `trace`, and notable events such as a skipped
//! wave or the end of the epidemic at `info`. The runner's per-day overlay is logged at `info`.
//!
//! For library users logging is _disabled_ until one of these is called:
//!
//!  - `enable_logging()`: turns on all log messages
//!  - `disable_logging()`: turns off all log messages
//!  - `set_log_level(level: LevelFilter)`: enables only log messages with priority at least `level`
//!
//! The `epiwave` binary calls `set_log_level` with its `--log-level` argument, which defaults to
//! `info`, and installs every `--log-filter module=level` it is given.
//!
//! Module filters override the global level for one module path and everything below it:
//!
//! ```rust
//! use epiwave::log::{parse_module_filter, set_log_level, set_module_filters, LevelFilter};
//!
//! set_log_level(LevelFilter::Info);
//! let (module, level) = parse_module_filter("epiwave::schedule=trace").unwrap();
//! set_module_filters(&[(module.as_str(), level)]);
//! ```
#[cfg(feature = "logging")]
mod standard_logger;

#[cfg(not(feature = "logging"))]
mod null_logger;

use std::sync::{LazyLock, Mutex, MutexGuard};

pub use log::{debug, error, info, trace, warn, LevelFilter};
#[cfg(feature = "logging")]
use log4rs::Handle;

use crate::hashing::HashMap;

static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// The global level, the per-module overrides and, with the `logging` feature, the handle of
/// the installed `log4rs` logger. Only the singleton above exists; the free functions below
/// lock it and apply one change at a time.
#[derive(Debug)]
pub(in crate::log) struct LogConfiguration {
    /// Applies to every module without an override. `LevelFilter::Off` disables logging.
    pub(in crate::log) global_log_level: LevelFilter,
    /// Module path to maximum level.
    pub(in crate::log) module_filters: HashMap<String, LevelFilter>,

    #[cfg(feature = "logging")]
    root_handle: Option<Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            global_log_level: LevelFilter::Off,
            module_filters: HashMap::default(),

            #[cfg(feature = "logging")]
            root_handle: None,
        }
    }
}

impl LogConfiguration {
    fn apply_module_filters(&mut self, module_filters: &[(&str, LevelFilter)]) {
        let mut changed = false;
        for &(module, level) in module_filters {
            changed |= self.module_filters.insert(module.to_string(), level) != Some(level);
        }
        if changed {
            self.set_config();
        }
    }
}

/// Splits a `module=level` argument, e.g. `epiwave::engine=debug`.
///
/// # Errors
///
/// A message naming the argument if it has no `=`, an empty module path or an unknown level.
pub fn parse_module_filter(filter: &str) -> Result<(String, LevelFilter), String> {
    let (module, level) = filter
        .split_once('=')
        .ok_or_else(|| format!("expected `module=level`, got `{filter}`"))?;
    let module = module.trim();
    if module.is_empty() {
        return Err(format!("missing module path in `{filter}`"));
    }
    let level = level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| format!("unknown log level in `{filter}`"))?;
    Ok((module.to_string(), level))
}

/// Enables the logger with no global level filter / full logging. Equivalent to
/// `set_log_level(LevelFilter::Trace)`.
pub fn enable_logging() {
    set_log_level(LevelFilter::Trace);
}

/// Disables logging completely. Equivalent to `set_log_level(LevelFilter::Off)`.
pub fn disable_logging() {
    set_log_level(LevelFilter::Off);
}

pub fn set_log_level(level: LevelFilter) {
    let mut config = get_log_configuration();
    config.global_log_level = level;
    config.set_config();
}

pub fn set_module_filter(module_path: &str, level: LevelFilter) {
    set_module_filters(&[(module_path, level)]);
}

/// Installs several module filters with a single logger reconfiguration.
pub fn set_module_filters(module_filters: &[(&str, LevelFilter)]) {
    get_log_configuration().apply_module_filters(module_filters);
}

/// The global level applies to `module_path` again afterwards.
pub fn remove_module_filter(module_path: &str) {
    let mut config = get_log_configuration();
    if config.module_filters.remove(module_path).is_some() {
        config.set_config();
    }
}

fn get_log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION.lock().expect("Mutex poisoned")
}

#[cfg(test)]
mod tests {
    use super::*;

    // Logging state is global, so these tests take turns.
    static TEST_MUTEX: LazyLock<Mutex<()>> = LazyLock::new(Mutex::default);

    #[test]
    fn test_set_log_level() {
        let _guard = TEST_MUTEX.lock().expect("Mutex poisoned");
        set_log_level(LevelFilter::Error);
        assert_eq!(get_log_configuration().global_log_level, LevelFilter::Error);
        error!("test_set_log_level: global set to error");
        trace!("test_set_log_level: NOT EMITTED");

        enable_logging();
        assert_eq!(get_log_configuration().global_log_level, LevelFilter::Trace);
        assert_eq!(log::max_level(), LevelFilter::Trace);

        disable_logging();
        assert_eq!(get_log_configuration().global_log_level, LevelFilter::Off);
    }

    #[test]
    fn test_set_remove_module_filters() {
        let _guard = TEST_MUTEX.lock().expect("Mutex poisoned");
        set_log_level(LevelFilter::Info);
        set_module_filters(&[
            ("epiwave::engine", LevelFilter::Error),
            ("epiwave::schedule", LevelFilter::Debug),
        ]);
        set_module_filter("epiwave::engine", LevelFilter::Warn);
        {
            let config = get_log_configuration();
            assert_eq!(
                config.module_filters.get("epiwave::engine"),
                Some(&LevelFilter::Warn)
            );
            assert_eq!(
                config.module_filters.get("epiwave::schedule"),
                Some(&LevelFilter::Debug)
            );
        }

        remove_module_filter("epiwave::engine");
        remove_module_filter("epiwave::schedule");
        assert!(get_log_configuration().module_filters.is_empty());
        disable_logging();
    }

    #[test]
    fn parses_module_filters() {
        assert_eq!(
            parse_module_filter("epiwave::engine=debug"),
            Ok(("epiwave::engine".to_string(), LevelFilter::Debug))
        );
        assert_eq!(
            parse_module_filter(" epiwave = OFF "),
            Ok(("epiwave".to_string(), LevelFilter::Off))
        );
        assert!(parse_module_filter("epiwave::engine").is_err());
        assert!(parse_module_filter("=info").is_err());
        assert!(parse_module_filter("epiwave::engine=loud").is_err());
    }
}
