//! Keeps the coupled angle and length parameters mutually consistent.
//!
//! The resolver holds no state. Every call takes a [`BarrierParameters`]
//! snapshot and returns a new one; callers replace their stored copy with the
//! result. Edits propagate along the fixed table in [`Field::downstream`], so
//! there is no iterative constraint solving and no risk of oscillation.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::params::{BarrierParameters, Field};

/// Outcome of checking one field against its range.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldValidation {
    /// Whether the value lies inside the accepted range.
    pub valid: bool,
    /// Smallest accepted value.
    pub min: f64,
    /// Largest accepted value.
    pub max: f64,
    /// Human readable explanation when the value is rejected.
    pub message: Option<String>,
}

/// Why a field changed during [`apply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ChangeReason {
    /// The caller edited the field directly.
    Edited,
    /// The field was recomputed from the fields it depends on.
    Derived,
    /// The field was moved onto the nearest bound of its range, or onto the
    /// closest angle the geometry can reproduce.
    Clamped,
}

/// One field whose value differs between the input and the resolved parameters.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParameterChange {
    /// Field that changed.
    pub field: Field,
    /// Value before the edit.
    pub previous: f64,
    /// Value after resolution.
    pub current: f64,
    /// Reason for the change.
    pub reason: ChangeReason,
}

/// Result of applying a single edit.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Resolution {
    /// Clamped, internally consistent parameters.
    pub params: BarrierParameters,
    /// Every field that changed, in display order.
    pub changes: Vec<ParameterChange>,
    /// Validation of every changed field after resolution.
    pub validation: BTreeMap<Field, FieldValidation>,
    /// Human readable warnings for clamped or rejected values.
    pub warnings: Vec<String>,
}

impl Resolution {
    /// Fields that changed, in display order.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<Field> {
        self.changes.iter().map(|change| change.field).collect()
    }
}

/// Re-derive the fields that depend on an edit.
///
/// With `Some((field, value))` the field is set and exactly the fields listed by
/// [`Field::downstream`] are recomputed, in order. With `None` the derived
/// angles `tau`, `theta` and `delta` are recomputed from
/// `{epsilon, h, L, f, d, b}`; this full resync is a fixed point.
///
/// # Examples
/// ```
/// use rockfall_barrier::{recalculate, BarrierParameters, Field};
///
/// let params = BarrierParameters::default();
/// let longer = recalculate(&params, Some((Field::L, 8.0)));
/// assert_eq!(longer.delta, 45.0);
/// assert_eq!(recalculate(&longer, None), longer);
/// ```
#[must_use]
pub fn recalculate(params: &BarrierParameters, change: Option<(Field, f64)>) -> BarrierParameters {
    let mut next = params.clone();
    match change {
        Some((field, value)) => {
            next.set(field, value);
            for dependent in field.downstream() {
                next.derive(*dependent);
            }
        }
        None => next.sync_derived(),
    }
    next
}

/// Check one value against the range of `field`.
fn check(field: Field, value: f64) -> FieldValidation {
    let limits = field.limits();
    let message = if !value.is_finite() {
        Some(format!("{field} must be a finite number"))
    } else if !limits.contains(value) {
        Some(format!(
            "{field} = {value}{unit} is outside the accepted range {min} to {max}{unit}",
            unit = field.unit(),
            min = limits.min,
            max = limits.max,
        ))
    } else {
        None
    };
    FieldValidation {
        valid: message.is_none(),
        min: limits.min,
        max: limits.max,
        message,
    }
}

/// Validate one field, or every field when `field` is `None`.
///
/// Out-of-range values are reported, never raised.
#[must_use]
pub fn validate(
    params: &BarrierParameters,
    field: Option<Field>,
) -> BTreeMap<Field, FieldValidation> {
    let fields = match field {
        Some(field) => vec![field],
        None => Field::ALL.to_vec(),
    };
    fields
        .into_iter()
        .map(|field| (field, check(field, params.get(field))))
        .collect()
}

/// Largest gap between an edited angle and the angle its free variable
/// reproduces that still counts as reaching the target.
const REACH_TOLERANCE: f64 = 0.1 + 1.0e-9;

/// Warning text for a value moved onto its range bound.
fn clamp_warning(field: Field, value: f64, bound: f64) -> String {
    format!(
        "{field} = {value}{unit} is out of range; clamped to {bound}{unit}",
        unit = field.unit()
    )
}

/// Apply one edit, clamp everything it touches and restore consistency.
///
/// 1. The incoming value is clamped to its range (with a warning).
/// 2. [`recalculate`] propagates it downstream.
/// 3. Every field that changed as a consequence is checked; out-of-range
///    values are clamped. A clamped derived angle is pushed to its upstream
///    free variable, which is itself clamped if needed.
/// 4. If anything was clamped in step 3, or an edited angle could not be
///    reproduced from its free variable within 0.1°, a full resync re-derives
///    the angles from the free variables.
///
/// Never fails: the result is always the best-effort, consistent parameter
/// set plus warnings.
///
/// # Examples
/// ```
/// use rockfall_barrier::{apply, BarrierParameters, Field};
///
/// let resolution = apply(&BarrierParameters::default(), Field::Epsilon, 95.0);
/// assert_eq!(resolution.params.epsilon, 80.0);
/// assert!(!resolution.warnings.is_empty());
/// ```
#[must_use]
pub fn apply(params: &BarrierParameters, field: Field, value: f64) -> Resolution {
    let mut warnings = Vec::new();
    let mut clamped = BTreeSet::new();

    let limits = field.limits();
    let accepted = if !value.is_finite() {
        let kept = params.get(field);
        warnings.push(format!("{field} = {value} is not a number; keeping {kept}"));
        kept
    } else if !limits.contains(value) {
        let bound = limits.clamp(value);
        warnings.push(clamp_warning(field, value, bound));
        clamped.insert(field);
        bound
    } else {
        value
    };

    let propagated = recalculate(params, Some((field, accepted)));
    let mut settled = propagated.clone();

    // A derived angle may ask for a value the geometry cannot produce; the
    // inverse then lands on the closest free variable it can find.
    let unreachable = field.upstream().is_some() && {
        let mut reached = propagated.clone();
        reached.derive(field);
        (reached.get(field) - accepted).abs() > REACH_TOLERANCE
    };
    if unreachable {
        clamped.insert(field);
    }
    let mut needs_resync = unreachable;

    for dependent in Field::ALL {
        if dependent == field || propagated.get(dependent) == params.get(dependent) {
            continue;
        }
        let current = settled.get(dependent);
        let limits = dependent.limits();
        if limits.contains(current) {
            continue;
        }
        let bound = limits.clamp(current);
        warnings.push(clamp_warning(dependent, current, bound));
        clamped.insert(dependent);
        needs_resync = true;

        match dependent.upstream() {
            Some(upstream) => {
                settled = recalculate(&settled, Some((dependent, bound)));
                let free = settled.get(upstream);
                let free_limits = upstream.limits();
                if !free_limits.contains(free) {
                    let free_bound = free_limits.clamp(free);
                    warnings.push(clamp_warning(upstream, free, free_bound));
                    clamped.insert(upstream);
                    settled.set(upstream, free_bound);
                }
            }
            None => settled.set(dependent, bound),
        }
    }

    let resolved = if needs_resync {
        log::debug!("clamped {clamped:?} after editing {field}; resyncing derived angles");
        recalculate(&settled, None)
    } else {
        settled
    };
    if unreachable {
        warnings.push(format!(
            "{field} = {accepted}{unit} is not reachable; using {reached}{unit}",
            unit = field.unit(),
            reached = resolved.get(field),
        ));
    }

    let changes: Vec<ParameterChange> = Field::ALL
        .into_iter()
        .filter(|candidate| resolved.get(*candidate) != params.get(*candidate))
        .map(|changed| ParameterChange {
            field: changed,
            previous: params.get(changed),
            current: resolved.get(changed),
            reason: if clamped.contains(&changed) {
                ChangeReason::Clamped
            } else if changed == field {
                ChangeReason::Edited
            } else {
                ChangeReason::Derived
            },
        })
        .collect();

    let validation = changes
        .iter()
        .map(|change| (change.field, check(change.field, change.current)))
        .collect();

    for warning in &warnings {
        log::warn!("{warning}");
    }

    Resolution {
        params: resolved,
        changes,
        validation,
        warnings,
    }
}
