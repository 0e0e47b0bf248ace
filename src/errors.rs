//! Error types produced while building, editing or persisting barriers.
//!
//! Ordinary domain conditions (out-of-range parameters, degenerate angles,
//! dangling cable references) are not errors; they surface as warnings,
//! fallbacks or skipped cables. These types cover contract violations only.

use thiserror::Error;

use crate::params::Field;

/// Error returned when parameters cannot be turned into geometry.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum BuildError {
    /// Returned when fewer than two supports are requested.
    #[error("a barrier needs at least two supports (received {num_supports})")]
    TooFewSupports {
        /// Rejected support count.
        num_supports: usize,
    },
    /// Returned when a parameter is NaN or infinite.
    #[error("parameter {0} is not a finite number")]
    NonFiniteParameter(Field),
}

/// Error returned when editing the cable measurements of a
/// [`BarrierConfig`](crate::BarrierConfig).
///
/// # Examples
///
/// ```
/// use rockfall_barrier::{build, BarrierEditError, BarrierParameters};
///
/// let mut config = build(&BarrierParameters::default()).expect("default parameters build");
/// let error = config
///     .set_cable_force("rhs99", 12.0)
///     .expect_err("unknown cable is rejected");
/// assert_eq!(error, BarrierEditError::UnknownCable("rhs99".to_owned()));
/// ```
#[derive(Clone, Debug, Error, PartialEq)]
pub enum BarrierEditError {
    /// Returned when a cable cannot be found in the configuration.
    #[error("cable {0} does not exist in this barrier")]
    UnknownCable(String),
    /// Returned when a measured tension is negative or not finite.
    #[error("cable {cable} cannot carry a force of {force} kN")]
    InvalidForce {
        /// Identifier of the affected cable.
        cable: String,
        /// Rejected force in kilonewtons.
        force: f64,
    },
    /// Returned when instrumenting a cable that is not attached to an anchor.
    #[error("cable {0} connects two supports and cannot carry a load cell")]
    LoadCellUnsupported(String),
}

/// Error returned when reading or writing a serialized configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid configuration JSON.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// The underlying reader or writer failed.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Error returned when a string does not name a parameter field.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown parameter field {0:?}")]
pub struct UnknownFieldError(pub String);
