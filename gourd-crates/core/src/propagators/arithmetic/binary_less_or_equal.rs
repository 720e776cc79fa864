use crate::basic_types::PropagationStatusCP;
use crate::engine::variables::DomainId;
use crate::propagation::DomainEvents;
use crate::propagation::LocalId;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::propagation::ReadDomains;

/// The [`PropagatorConstructor`] for the [`BinaryLessOrEqual`] propagator.
#[derive(Clone, Copy, Debug)]
pub struct BinaryLessOrEqualArgs {
    pub x: DomainId,
    pub y: DomainId,
    pub offset: i32,
}

impl PropagatorConstructor for BinaryLessOrEqualArgs {
    type PropagatorImpl = BinaryLessOrEqual;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let BinaryLessOrEqualArgs { x, y, offset } = self;

        // Only the lower bound of `x` and the upper bound of `y` can cause a propagation.
        context.register(x, DomainEvents::LOWER_BOUND, LocalId::from(0));
        context.register(y, DomainEvents::UPPER_BOUND, LocalId::from(1));

        BinaryLessOrEqual { x, y, offset }
    }
}

/// Bounds consistency for `x + offset <= y`.
#[derive(Clone, Debug)]
pub struct BinaryLessOrEqual {
    x: DomainId,
    y: DomainId,
    offset: i32,
}

impl Propagator for BinaryLessOrEqual {
    fn name(&self) -> &str {
        "BinaryLessOrEqual"
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn propagate(&mut self, mut context: PropagationContext) -> PropagationStatusCP {
        let _ = context.set_lower_bound(self.y, context.lower_bound(self.x) + self.offset)?;
        let _ = context.set_upper_bound(self.x, context.upper_bound(self.y) - self.offset)?;

        Ok(())
    }
}
