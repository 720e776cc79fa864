//! Simple arithmetic relations between two variables.
mod binary_less_or_equal;
mod binary_not_equals;

pub use binary_less_or_equal::BinaryLessOrEqual;
pub use binary_less_or_equal::BinaryLessOrEqualArgs;
pub use binary_not_equals::BinaryNotEquals;
pub use binary_not_equals::BinaryNotEqualsArgs;
