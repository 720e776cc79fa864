use thiserror::Error;

use crate::engine::EmptyDomain;

/// The result of invoking a propagator. The propagation either succeeds or identifies an
/// inconsistency, in which case the current partial assignment has no solution.
pub type PropagationStatusCP = Result<(), Inconsistency>;

/// The ways in which a propagator can fail.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inconsistency {
    /// A narrowing operation emptied a domain.
    #[error("a domain became empty")]
    EmptyDomain,
    /// The filtering algorithm itself proved the state infeasible.
    #[error(transparent)]
    Conflict(#[from] PropagatorConflict),
}

impl From<EmptyDomain> for Inconsistency {
    fn from(_: EmptyDomain) -> Self {
        Inconsistency::EmptyDomain
    }
}

/// A conflict stated by a propagator which is _not_ an empty domain.
///
/// The message names the check that failed, e.g. that the required energy exceeds the capacity of
/// a time window.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
#[error("{message}")]
pub struct PropagatorConflict {
    pub message: &'static str,
}

impl PropagatorConflict {
    pub fn new(message: &'static str) -> Self {
        PropagatorConflict { message }
    }
}
