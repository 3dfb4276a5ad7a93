use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::runtime::ConfigErrors;
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Config;

use crate::log::LogConfiguration;

const APPENDER_NAME: &str = "stderr";
// ISO 8601 timestamp, color coded level, module path
const LOG_PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%SZ)} {h({l})} {t} - {m}{n}";

// stdout is reserved for the run summary.
fn stderr_appender() -> Appender {
    let console = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .target(Target::Stderr)
        .build();
    Appender::builder().build(APPENDER_NAME, Box::new(console))
}

impl LogConfiguration {
    fn build_config(&self) -> Result<Config, ConfigErrors> {
        let loggers = self
            .module_filters
            .iter()
            .map(|(module, level)| Logger::builder().build(module.clone(), *level));
        Config::builder()
            .appender(stderr_appender())
            .loggers(loggers)
            .build(
                Root::builder()
                    .appender(APPENDER_NAME)
                    .build(self.global_log_level),
            )
    }

    /// Reconfigures the installed `log4rs` logger, installing it on first use.
    pub(in crate::log) fn set_config(&mut self) {
        let config = match self.build_config() {
            Ok(config) => config,
            Err(e) => {
                eprintln!("epiwave: ignoring invalid log configuration: {e}");
                return;
            }
        };

        if let Some(handle) = &self.root_handle {
            handle.set_config(config);
            return;
        }
        match log4rs::init_config(config) {
            Ok(handle) => self.root_handle = Some(handle),
            Err(e) => eprintln!("epiwave: failed to install logger: {e}"),
        }
    }
}
