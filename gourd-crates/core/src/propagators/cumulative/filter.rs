use std::fmt::Debug;

use dyn_clone::clone_trait_object;
use dyn_clone::DynClone;

use super::task::Task;
use crate::basic_types::Inconsistency;
use crate::engine::variables::DomainId;
use crate::propagation::PropagationContext;

// Allows the cumulative propagator, and thereby the state, to be cloned.
clone_trait_object!(CumulativeFilter);

/// One filtering algorithm of a cumulative propagator.
///
/// Every filter reads the current bounds of the tasks from scratch, so a filter keeps no state
/// which needs to be restored on backtracking; any fields are scratch space.
pub(crate) trait CumulativeFilter: Debug + DynClone {
    fn name(&self) -> &'static str;

    /// Tightens the bounds of the tasks and the capacity. Returns whether a domain changed.
    fn filter(
        &mut self,
        tasks: &[Task],
        capacity: DomainId,
        context: &mut PropagationContext,
    ) -> Result<bool, Inconsistency>;
}
