/// The filtering algorithms run by a cumulative propagator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CumulativeStrategy {
    /// Time-tabling (discretised when the horizon is small, event based otherwise), energetic
    /// reasoning and, for few tasks, task intervals.
    #[default]
    Default,
    /// Time-tabling over an array indexed by time.
    TimeTable,
    /// Time-tabling over the sorted starts and ends of the mandatory parts.
    Sweep,
    /// Bounds on the energy which fits in the windows of the densest tasks, and a check of the
    /// mandatory parts against the capacity.
    Energetic,
    /// Task intervals over the tasks which cannot run in parallel, and a check of the mandatory
    /// parts against the capacity.
    TaskInterval,
}

#[derive(Debug, Clone, Copy)]
pub struct CumulativeOptions {
    pub strategy: CumulativeStrategy,
    /// The default strategy only discretises the time line if the horizon of the tasks is at
    /// most this long.
    pub discretisation_horizon_limit: i32,
    /// The default strategy only runs the cubic task interval filter for at most this many
    /// tasks.
    pub task_interval_task_limit: usize,
}

impl Default for CumulativeOptions {
    fn default() -> Self {
        CumulativeOptions {
            strategy: CumulativeStrategy::Default,
            discretisation_horizon_limit: 1000,
            task_interval_task_limit: 30,
        }
    }
}
