use super::Constraint;
use crate::engine::variables::DomainId;
use crate::propagators::arithmetic::BinaryLessOrEqualArgs;
use crate::propagators::arithmetic::BinaryNotEqualsArgs;

/// Creates the [`Constraint`] `x + offset <= y`.
pub fn less_than_or_equals(x: DomainId, y: DomainId, offset: i32) -> impl Constraint {
    BinaryLessOrEqualArgs { x, y, offset }
}

/// Creates the [`Constraint`] `x != y + offset`.
pub fn not_equals(x: DomainId, y: DomainId, offset: i32) -> impl Constraint {
    BinaryNotEqualsArgs { x, y, offset }
}
