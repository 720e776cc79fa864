use thiserror::Error;

#[cfg(doc)]
use crate::engine::State;

/// Errors related to adding constraints to the [`State`].
///
/// These are model faults; they are reported once, while the model is built, and never during
/// propagation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintOperationError {
    /// The initial propagation of the new constraint found the state infeasible.
    #[error("adding the constraint failed because it is infeasible at the root")]
    InfeasiblePropagator,
    /// Two arrays which are indexed in parallel have different lengths.
    #[error("expected {expected} {what}, but {actual} were provided")]
    MismatchedLengths {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    /// A value occurs more than once in a value list.
    #[error("value {0} occurs more than once in the value list")]
    DuplicateValue(i32),
    /// The lower cardinality bound of a value exceeds its upper bound.
    #[error("the cardinality bounds [{low}, {up}] of value {value} are inverted")]
    InvertedCardinalityBounds { value: i32, low: i32, up: i32 },
    /// A duration or resource usage can be negative.
    #[error("the {what} of task {task} can be negative")]
    NegativeTaskAttribute { what: &'static str, task: usize },
    /// A variable would be created with an empty domain.
    #[error("cannot create a variable with an empty domain")]
    EmptyInitialDomain,
}
