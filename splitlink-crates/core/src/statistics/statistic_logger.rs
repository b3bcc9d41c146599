use std::fmt::Display;

use itertools::Itertools;

use super::statistic_logging::log_statistic;

/// Logs statistics under a name prefix; nested statistic structures extend the prefix.
#[derive(Debug, Default, Clone)]
pub struct StatisticLogger {
    name_prefix: String,
}

impl StatisticLogger {
    pub fn new(name_prefix: impl Display) -> Self {
        Self {
            name_prefix: name_prefix.to_string(),
        }
    }

    pub fn attach_to_prefix(&self, addition_to_prefix: impl Display) -> Self {
        let addition = addition_to_prefix.to_string();
        Self {
            name_prefix: [self.name_prefix.as_str(), addition.as_str()]
                .iter()
                .filter(|part| !part.is_empty())
                .join("_"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name_prefix
    }
}

impl std::fmt::Write for StatisticLogger {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        log_statistic(&self.name_prefix, s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_joined_with_underscores() {
        let logger = StatisticLogger::new("layerTree").attach_to_prefix("jobs");

        assert_eq!(logger.name(), "layerTree_jobs");
        assert_eq!(StatisticLogger::default().attach_to_prefix("x").name(), "x");
    }
}
