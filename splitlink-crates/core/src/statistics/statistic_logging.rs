//! Responsible for behaviour related to logging statistics with a specific prefix and closing
//! line.

use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::io::stdout;
use std::io::Write;
use std::sync::OnceLock;
use std::sync::RwLock;

use convert_case::Case;
use convert_case::Casing;

/// The options for statistic logging: the prefix printed before every statistic, the (optional)
/// line printed after a block of statistics, the (optional) casing of the statistic names and
/// the writer the statistics go to.
pub struct StatisticOptions<'a> {
    // Statistics are printed in the form `{PREFIX} {NAME}={VALUE}`
    statistic_prefix: &'a str,
    after_statistics: Option<&'a str>,
    statistics_casing: Option<Case>,
    statistics_writer: Box<dyn Write + Send + Sync>,
}

impl Debug for StatisticOptions<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticOptions")
            .field("statistic_prefix", &self.statistic_prefix)
            .field("after_statistics", &self.after_statistics)
            .field("statistics_casing", &self.statistics_casing)
            .field("statistics_writer", &"<Writer>")
            .finish()
    }
}

static STATISTIC_OPTIONS: OnceLock<RwLock<StatisticOptions>> = OnceLock::new();

/// Configures the logging of statistics.
///
/// Only the first configuration takes effect. When no writer is given, statistics are written to
/// stdout. Until this function is called, statistics are not written at all.
pub fn configure_statistic_logging(
    prefix: &'static str,
    after: Option<&'static str>,
    casing: Option<Case>,
    writer: Option<Box<dyn Write + Send + Sync>>,
) {
    let _ = STATISTIC_OPTIONS.get_or_init(|| {
        RwLock::from(StatisticOptions {
            statistic_prefix: prefix,
            after_statistics: after,
            statistics_casing: casing,
            statistics_writer: writer.unwrap_or(Box::new(stdout())),
        })
    });
}

/// Logs the statistic `name` with value `value` in the format `PREFIX NAME=VALUE`.
pub fn log_statistic(name: impl Display, value: impl Display) {
    if let Some(statistic_options_lock) = STATISTIC_OPTIONS.get() {
        if let Ok(mut statistic_options) = statistic_options_lock.write() {
            let name = match &statistic_options.statistics_casing {
                Some(casing) => name.to_string().to_case(*casing),
                None => name.to_string(),
            };
            let prefix = statistic_options.statistic_prefix;
            let _ = writeln!(
                statistic_options.statistics_writer,
                "{prefix} {name}={value}"
            );
        }
    }
}

/// Writes the closing line of a block of statistics, if one is configured.
pub fn log_statistic_postfix() {
    if let Some(statistic_options_lock) = STATISTIC_OPTIONS.get() {
        if let Ok(mut statistic_options) = statistic_options_lock.write() {
            if let Some(post_fix) = statistic_options.after_statistics {
                let _ = writeln!(statistic_options.statistics_writer, "{post_fix}");
            }
        }
    }
}

/// Returns whether statistics are logged, i.e. whether [`configure_statistic_logging`] has been
/// called.
pub fn should_log_statistics() -> bool {
    STATISTIC_OPTIONS.get().is_some()
}
