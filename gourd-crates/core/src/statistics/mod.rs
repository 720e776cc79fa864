//! Logging of counters kept by the engine and by the global filters.
//!
//! Nothing is written until [`configure_statistic_logging`] has been called; afterwards every
//! statistic is written as `{prefix} {name}={value}`.
mod statistic_logger;
mod statistic_logging;

use std::fmt::Display;
use std::fmt::Write;

pub use statistic_logger::StatisticLogger;
pub use statistic_logging::configure_statistic_logging;
pub use statistic_logging::log_statistic;
pub use statistic_logging::log_statistic_postfix;
pub use statistic_logging::should_log_statistics;

/// A value which can be written through a [`StatisticLogger`].
///
/// Structs of counters implementing this trait are generated by
/// [`crate::create_statistics_struct`].
pub trait Statistic {
    fn log(&self, statistic_logger: StatisticLogger);
}

impl<Value: Display> Statistic for Value {
    fn log(&self, mut statistic_logger: StatisticLogger) {
        write!(statistic_logger, "{self}").expect("writing a statistic cannot fail");
    }
}

/// Generates a `Default + Debug + Copy` struct of counters which implements `Statistic`, logging
/// every field under its own name.
///
/// # Example
/// ```rust
/// # use gourd_core::create_statistics_struct;
/// create_statistics_struct!(FilterStatistics {
///     num_calls: usize,
///     num_prunings: u64,
/// });
///
/// let statistics = FilterStatistics::default();
/// assert_eq!(statistics.num_calls, 0);
/// ```
#[macro_export]
macro_rules! create_statistics_struct {
    ($(#[$struct_documentation:meta])* $name:ident { $($(#[$variable_documentation:meta])* $field:ident : $type:ident),+ $(,)? }) => {
        $(#[$struct_documentation])*
        #[derive(Default, Debug, Copy, Clone)]
        pub(crate) struct $name {
            $($(#[$variable_documentation])* pub(crate) $field: $type),+
        }

        impl $crate::statistics::Statistic for $name {
            fn log(&self, statistic_logger: $crate::statistics::StatisticLogger) {
                $($crate::statistics::Statistic::log(
                    &self.$field,
                    statistic_logger.attach_to_prefix(stringify!($field)),
                ));+
            }
        }
    };
}
