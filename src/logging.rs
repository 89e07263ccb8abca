use log::LevelFilter;
use log4rs::{
    append::console::{ConsoleAppender, Target},
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};
use std::path::Path;

/// Sets up logging. stdout is the response channel, so the default
/// appender writes to stderr. A log4rs config file, when given and valid,
/// takes over completely. Failures are reported and the daemon runs on
/// without logging.
pub fn configure_logging(logging_config: Option<&Path>, level: LevelFilter) {
    if let Some(cfg) = logging_config {
        match log4rs::init_file(cfg, Default::default()) {
            Ok(()) => return,
            Err(e) => eprintln!(
                "studentd: failed to configure logging using {} with {:?}. Falling back to stderr.",
                cfg.to_string_lossy(),
                e
            ),
        }
    }

    if level == LevelFilter::Off {
        return;
    }

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%dT%H:%M:%S%.3f)} {l} {t} - {m}{n}",
        )))
        .build();
    match Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(level))
    {
        Ok(config) => {
            if let Err(e) = log4rs::init_config(config) {
                eprintln!(
                    "studentd: failed to configure logging for stderr with {:?}. Continuing without logging.",
                    e
                );
            }
        }
        Err(e) => {
            eprintln!(
                "studentd: failed to prepare default logging configuration with {:?}. Continuing without logging.",
                e
            );
        }
    }
}
