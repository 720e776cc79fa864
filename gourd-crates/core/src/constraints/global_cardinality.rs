use super::infeasible;
use super::Constraint;
use crate::basic_types::ConstraintOperationError;
use crate::containers::HashMap;
use crate::engine::variables::DomainId;
use crate::engine::State;
use crate::propagators::gcc::GccOptions;
use crate::propagators::gcc::GccStrategy;
use crate::propagators::gcc::GlobalCardinalityArcArgs;
use crate::propagators::gcc::GlobalCardinalityBoundsArgs;

/// Creates the [Global Cardinality](https://sofdem.github.io/gccat/gccat/Cglobal_cardinality.html)
/// [`Constraint`]: for every `i`, the number of `variables` which take `values[i]` is
/// `cardinalities[i]`.
///
/// The values must be distinct. Values which are not listed may be taken by any number of
/// variables.
///
/// # Example
/// ```
/// # use gourd_core::constraints;
/// # use gourd_core::engine::State;
/// let mut state = State::default();
///
/// let variables = (0..3)
///     .map(|_| state.new_sparse_variable(vec![0, 1, 2], None))
///     .collect::<Vec<_>>();
/// let cardinalities = [(2, 2), (0, 1), (1, 2)]
///     .map(|(low, up)| state.new_interval_variable(low, up, None));
///
/// state
///     .post_constraint(constraints::global_cardinality(
///         variables.clone(),
///         vec![0, 1, 2],
///         cardinalities.to_vec(),
///     ))
///     .expect("the model is feasible");
///
/// // Value 0 takes two of the three variables, the third one takes value 2.
/// assert!(variables
///     .iter()
///     .all(|&variable| !state.contains(variable, 1)));
/// ```
pub fn global_cardinality(
    variables: impl Into<Box<[DomainId]>>,
    values: impl Into<Box<[i32]>>,
    cardinalities: impl Into<Box<[DomainId]>>,
) -> impl Constraint {
    global_cardinality_with_options(variables, values, cardinalities, GccOptions::default())
}

/// Creates the global cardinality [`Constraint`] with the provided [`GccOptions`].
///
/// See the documentation of [`global_cardinality`] for more information about the constraint.
pub fn global_cardinality_with_options(
    variables: impl Into<Box<[DomainId]>>,
    values: impl Into<Box<[i32]>>,
    cardinalities: impl Into<Box<[DomainId]>>,
    options: GccOptions,
) -> impl Constraint {
    GlobalCardinalityConstraint {
        variables: variables.into(),
        values: values.into(),
        cardinalities: Cardinalities::Variables(cardinalities.into()),
        options,
    }
}

/// Creates the global cardinality [`Constraint`] in which the number of variables taking
/// `values[i]` lies within `[low[i], up[i]]`.
///
/// The bounds are turned into fresh cardinality variables, see [`global_cardinality`].
pub fn global_cardinality_with_bounds(
    variables: impl Into<Box<[DomainId]>>,
    values: impl Into<Box<[i32]>>,
    low: impl Into<Box<[i32]>>,
    up: impl Into<Box<[i32]>>,
    options: GccOptions,
) -> impl Constraint {
    GlobalCardinalityConstraint {
        variables: variables.into(),
        values: values.into(),
        cardinalities: Cardinalities::Bounds {
            low: low.into(),
            up: up.into(),
        },
        options,
    }
}

#[derive(Debug)]
enum Cardinalities {
    Variables(Box<[DomainId]>),
    Bounds { low: Box<[i32]>, up: Box<[i32]> },
}

#[derive(Debug)]
struct GlobalCardinalityConstraint {
    variables: Box<[DomainId]>,
    values: Box<[i32]>,
    cardinalities: Cardinalities,
    options: GccOptions,
}

impl Constraint for GlobalCardinalityConstraint {
    fn post(self, state: &mut State) -> Result<(), ConstraintOperationError> {
        let GlobalCardinalityConstraint {
            variables,
            values,
            cardinalities,
            options,
        } = self;

        let mut value_indices = HashMap::default();
        for (index, &value) in values.iter().enumerate() {
            if value_indices.insert(value, index).is_some() {
                return Err(ConstraintOperationError::DuplicateValue(value));
            }
        }

        let cardinalities = match cardinalities {
            Cardinalities::Variables(cardinalities) => {
                check_length("cardinalities", values.len(), cardinalities.len())?;
                cardinalities
            }
            Cardinalities::Bounds { low, up } => {
                check_length("lower cardinality bounds", values.len(), low.len())?;
                check_length("upper cardinality bounds", values.len(), up.len())?;
                values
                    .iter()
                    .zip(low.iter().zip(up.iter()))
                    .map(|(&value, (&low, &up))| {
                        if low > up {
                            Err(ConstraintOperationError::InvertedCardinalityBounds {
                                value,
                                low,
                                up,
                            })
                        } else {
                            Ok(state.new_interval_variable(low, up, None))
                        }
                    })
                    .collect::<Result<Box<[_]>, _>>()?
            }
        };

        restrict_cardinalities(state, &variables, &values, &cardinalities)?;

        match options.strategy {
            GccStrategy::BoundConsistency => {
                post_bound_consistency(state, variables, &value_indices, &cardinalities)
            }
            GccStrategy::ArcConsistency => GlobalCardinalityArcArgs {
                variables,
                values,
                cardinalities,
            }
            .post(state),
        }
    }
}

fn check_length(
    what: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), ConstraintOperationError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ConstraintOperationError::MismatchedLengths {
            what,
            expected,
            actual,
        })
    }
}

/// Every cardinality lies between the number of variables fixed to its value and the number of
/// variables which can take it.
fn restrict_cardinalities(
    state: &mut State,
    variables: &[DomainId],
    values: &[i32],
    cardinalities: &[DomainId],
) -> Result<(), ConstraintOperationError> {
    for (&value, &cardinality) in values.iter().zip(cardinalities) {
        let possible = variables
            .iter()
            .filter(|&&variable| state.contains(variable, value))
            .count() as i32;
        let required = variables
            .iter()
            .filter(|&&variable| state.fixed_value(variable) == Some(value))
            .count() as i32;

        let _ = state
            .set_lower_bound(cardinality, required)
            .map_err(infeasible)?;
        let _ = state
            .set_upper_bound(cardinality, possible)
            .map_err(infeasible)?;
    }
    Ok(())
}

/// The bound consistent filter works on a contiguous range of values; it spans the bounds of the
/// variables and the listed values, and values which are not listed get an unconstrained
/// cardinality.
fn post_bound_consistency(
    state: &mut State,
    variables: Box<[DomainId]>,
    value_indices: &HashMap<i32, usize>,
    cardinalities: &[DomainId],
) -> Result<(), ConstraintOperationError> {
    let bounds = variables
        .iter()
        .flat_map(|&variable| [state.lower_bound(variable), state.upper_bound(variable)])
        .chain(value_indices.keys().copied());
    let (Some(first_value), Some(last_value)) = (bounds.clone().min(), bounds.max()) else {
        return Ok(());
    };

    let num_variables = variables.len() as i32;
    let range_cardinalities = (first_value..=last_value)
        .map(|value| match value_indices.get(&value) {
            Some(&index) => cardinalities[index],
            None => state.new_interval_variable(0, num_variables, None),
        })
        .collect::<Box<[_]>>();

    GlobalCardinalityBoundsArgs {
        variables,
        first_value,
        cardinalities: range_cardinalities,
    }
    .post(state)
}
