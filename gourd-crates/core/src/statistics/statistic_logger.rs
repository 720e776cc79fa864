use std::fmt::Display;

use itertools::Itertools;

use super::log_statistic;

/// Logs statistics under a common name prefix, e.g. the name and id of a propagator.
#[derive(Debug, Default, Clone)]
pub struct StatisticLogger {
    name_prefix: String,
}

impl StatisticLogger {
    /// The parts of the prefix are joined with underscores.
    pub fn new<Input: IntoIterator<Item = impl Display>>(name_prefix: Input) -> Self {
        Self {
            name_prefix: name_prefix.into_iter().join("_"),
        }
    }

    pub fn attach_to_prefix(&self, addition_to_prefix: impl Display) -> Self {
        Self {
            name_prefix: format!("{}_{}", self.name_prefix, addition_to_prefix),
        }
    }

    pub fn log_statistic(&self, value: impl Display) {
        log_statistic(&self.name_prefix, value);
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
    use super::StatisticLogger;

    #[test]
    fn prefix_parts_are_joined() {
        let logger = StatisticLogger::new(["Cumulative", "number", "3"]).attach_to_prefix("calls");
        assert_eq!("Cumulative_number_3_calls", logger.name_prefix);
    }
}
