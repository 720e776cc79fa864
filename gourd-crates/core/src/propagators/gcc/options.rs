/// The filtering algorithm used for a global cardinality constraint.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GccStrategy {
    /// Hall interval reasoning on the bounds of the variables, in `O(n log n)` per call.
    #[default]
    BoundConsistency,
    /// Flow based filtering which removes every value that is not part of a feasible assignment,
    /// quadratic per call.
    ArcConsistency,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GccOptions {
    pub strategy: GccStrategy,
}
