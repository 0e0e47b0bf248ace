//! Scalar parameters describing one barrier instance.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::angles;
use crate::errors::UnknownFieldError;

/// Numeric parameter that can be edited and validated.
///
/// Fields print and parse as their parameter key (`"L"`, `"theta"`, ...), the
/// same keys used in the serialized [`BarrierParameters`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    /// Count of support posts.
    #[serde(rename = "num_supports")]
    NumSupports,
    /// Edge distance between an end support and its upper support cable anchor.
    #[serde(rename = "b")]
    B,
    /// Spacing between adjacent supports.
    #[serde(rename = "d")]
    D,
    /// Offset between support base and retention anchor.
    #[serde(rename = "h")]
    H,
    /// Foundation overhang.
    #[serde(rename = "f")]
    F,
    /// Support length.
    #[serde(rename = "L")]
    L,
    /// Retention cable angle.
    #[serde(rename = "theta")]
    Theta,
    /// Upper support cable angle.
    #[serde(rename = "delta")]
    Delta,
    /// First intermediate cable angle.
    #[serde(rename = "delta1")]
    Delta1,
    /// Second intermediate cable angle.
    #[serde(rename = "delta2")]
    Delta2,
    /// Support inclination relative to the terrain normal.
    #[serde(rename = "epsilon")]
    Epsilon,
    /// Angle between support axis and retention cable.
    #[serde(rename = "tau")]
    Tau,
    /// Terrain inclination.
    #[serde(rename = "phi")]
    Phi,
}

/// Inclusive range of acceptable values for a [`Field`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    /// Smallest accepted value.
    pub min: f64,
    /// Largest accepted value.
    pub max: f64,
}

impl Limits {
    /// Return `true` when `value` lies inside the range.
    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Move `value` onto the nearest bound when it lies outside the range.
    #[must_use]
    pub fn clamp(self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

impl Field {
    /// Every numeric parameter, in display order.
    pub const ALL: [Field; 13] = [
        Field::NumSupports,
        Field::B,
        Field::D,
        Field::H,
        Field::F,
        Field::L,
        Field::Theta,
        Field::Delta,
        Field::Delta1,
        Field::Delta2,
        Field::Epsilon,
        Field::Tau,
        Field::Phi,
    ];

    /// Parameter key used in serialized configurations.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Field::NumSupports => "num_supports",
            Field::B => "b",
            Field::D => "d",
            Field::H => "h",
            Field::F => "f",
            Field::L => "L",
            Field::Theta => "theta",
            Field::Delta => "delta",
            Field::Delta1 => "delta1",
            Field::Delta2 => "delta2",
            Field::Epsilon => "epsilon",
            Field::Tau => "tau",
            Field::Phi => "phi",
        }
    }

    /// Unit suffix used in messages.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Field::NumSupports => "",
            Field::B | Field::D | Field::H | Field::F | Field::L => " m",
            _ => "°",
        }
    }

    /// Fixed range table for parameter validation.
    #[must_use]
    pub const fn limits(self) -> Limits {
        let (min, max) = match self {
            Field::NumSupports => (2.0, 10.0),
            Field::B => (0.5, 20.0),
            Field::D => (1.0, 30.0),
            Field::H => (0.5, 20.0),
            Field::F => (0.0, 5.0),
            Field::L => (1.0, 20.0),
            Field::Theta | Field::Delta | Field::Delta1 | Field::Delta2 => (0.0, 89.0),
            Field::Epsilon => (0.0, 80.0),
            Field::Tau => (0.0, 180.0),
            Field::Phi => (0.0, 60.0),
        };
        Limits { min, max }
    }

    /// Fields recomputed, in order, after this field is edited.
    ///
    /// `theta`, `tau` and `delta` are derived quantities; editing one of them
    /// moves its nearest free variable (`d`, `epsilon`, `b`) instead, which is
    /// then propagated forward.
    #[must_use]
    pub const fn downstream(self) -> &'static [Field] {
        match self {
            Field::Theta => &[Field::D],
            Field::Tau => &[Field::Epsilon, Field::Theta],
            Field::Delta => &[Field::B],
            Field::Epsilon | Field::H | Field::F => &[Field::Tau, Field::Theta],
            Field::D => &[Field::Theta],
            Field::B => &[Field::Delta],
            Field::L => &[Field::Tau, Field::Theta, Field::Delta],
            Field::NumSupports | Field::Delta1 | Field::Delta2 | Field::Phi => &[],
        }
    }

    /// Free variable adjusted when this derived field is forced to a value.
    #[must_use]
    pub const fn upstream(self) -> Option<Field> {
        match self {
            Field::Theta => Some(Field::D),
            Field::Tau => Some(Field::Epsilon),
            Field::Delta => Some(Field::B),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = UnknownFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| UnknownFieldError(s.to_owned()))
    }
}

/// Independent and derived scalar inputs describing one barrier.
///
/// `theta`, `delta` and `tau` are kept consistent with
/// `{epsilon, h, L, f, d, b}` by the [resolver](crate::resolver); they are never
/// authoritative once one of their inputs changes. Missing keys deserialize
/// from [`BarrierParameters::default`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarrierParameters {
    /// Count of support posts, at least two.
    pub num_supports: usize,
    /// Edge distance in metres.
    pub b: f64,
    /// Spacing between supports in metres.
    pub d: f64,
    /// Offset between support base and retention anchor in metres.
    pub h: f64,
    /// Foundation overhang in metres.
    pub f: f64,
    /// Support length in metres.
    #[serde(rename = "L")]
    pub length: f64,
    /// Retention cable angle in degrees.
    pub theta: f64,
    /// Upper support cable angle in degrees.
    pub delta: f64,
    /// First intermediate cable angle in degrees.
    pub delta1: f64,
    /// Second intermediate cable angle in degrees.
    pub delta2: f64,
    /// Support inclination relative to the terrain normal in degrees.
    pub epsilon: f64,
    /// Angle between support axis and retention cable in degrees.
    pub tau: f64,
    /// Terrain inclination in degrees.
    pub phi: f64,
    /// Whether the first intermediate cable is fitted.
    pub has_delta1: bool,
    /// Whether the second intermediate cable is fitted.
    pub has_delta2: bool,
}

impl Default for BarrierParameters {
    fn default() -> Self {
        let mut params = Self {
            num_supports: 4,
            b: 8.0,
            d: 10.0,
            h: 6.0,
            f: 0.5,
            length: 5.0,
            theta: 0.0,
            delta: 0.0,
            delta1: 0.0,
            delta2: 0.0,
            epsilon: 10.0,
            tau: 0.0,
            phi: 15.0,
            has_delta1: false,
            has_delta2: false,
        };
        params.sync_derived();
        params
    }
}

impl BarrierParameters {
    /// Read the value of a numeric field.
    #[must_use]
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::NumSupports => self.num_supports as f64,
            Field::B => self.b,
            Field::D => self.d,
            Field::H => self.h,
            Field::F => self.f,
            Field::L => self.length,
            Field::Theta => self.theta,
            Field::Delta => self.delta,
            Field::Delta1 => self.delta1,
            Field::Delta2 => self.delta2,
            Field::Epsilon => self.epsilon,
            Field::Tau => self.tau,
            Field::Phi => self.phi,
        }
    }

    /// Overwrite a numeric field without touching its dependents.
    ///
    /// `num_supports` is rounded to the nearest non-negative integer.
    pub fn set(&mut self, field: Field, value: f64) {
        match field {
            Field::NumSupports => self.num_supports = value.round().max(0.0) as usize,
            Field::B => self.b = value,
            Field::D => self.d = value,
            Field::H => self.h = value,
            Field::F => self.f = value,
            Field::L => self.length = value,
            Field::Theta => self.theta = value,
            Field::Delta => self.delta = value,
            Field::Delta1 => self.delta1 = value,
            Field::Delta2 => self.delta2 = value,
            Field::Epsilon => self.epsilon = value,
            Field::Tau => self.tau = value,
            Field::Phi => self.phi = value,
        }
    }

    /// Recompute one derived field from the current free variables.
    ///
    /// Free variables (`d`, `epsilon`, `b`) are recovered from their derived
    /// counterpart (`theta`, `tau`, `delta`); every other field is left alone.
    pub(crate) fn derive(&mut self, field: Field) {
        let value = match field {
            Field::Tau => angles::tau(self.epsilon, self.h, self.length, self.f),
            Field::Theta => angles::theta(self.d, self.h, self.length, self.epsilon, self.f),
            Field::Delta => angles::delta(self.length, self.b),
            Field::D => angles::d_from_theta(self.theta, self.h, self.length, self.epsilon, self.f),
            Field::Epsilon => angles::epsilon_from_tau(self.tau, self.h, self.length, self.f),
            Field::B => angles::b_from_delta(self.delta, self.length),
            _ => return,
        };
        log::debug!("derived {field} = {value}");
        self.set(field, value);
    }

    /// Re-derive `tau`, `theta` and `delta` from `{epsilon, h, L, f, d, b}`.
    pub(crate) fn sync_derived(&mut self) {
        for field in [Field::Tau, Field::Theta, Field::Delta] {
            self.derive(field);
        }
    }

    /// Return the first numeric field holding a non-finite value.
    #[must_use]
    pub fn first_non_finite(&self) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|field| !self.get(*field).is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_carry_derived_angles() {
        let params = BarrierParameters::default();
        assert_eq!(params.num_supports, 4);
        assert_eq!(params.tau, 53.4);
        assert_eq!(params.theta, 33.8);
        assert_eq!(params.delta, 32.0);
    }

    #[test]
    fn field_keys_round_trip_through_from_str() {
        for field in Field::ALL {
            assert_eq!(field.key().parse::<Field>(), Ok(field));
        }
        assert_eq!(
            "gamma".parse::<Field>(),
            Err(UnknownFieldError("gamma".to_owned()))
        );
    }

    #[test]
    fn num_supports_is_rounded_when_set() {
        let mut params = BarrierParameters::default();
        params.set(Field::NumSupports, 5.6);
        assert_eq!(params.num_supports, 6);
        params.set(Field::NumSupports, -3.0);
        assert_eq!(params.num_supports, 0);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let params: BarrierParameters =
            serde_json::from_str(r#"{"L": 7.0, "num_supports": 3}"#).expect("valid json");
        assert_eq!(params.length, 7.0);
        assert_eq!(params.num_supports, 3);
        assert_eq!(params.b, BarrierParameters::default().b);
    }

    #[test]
    fn derived_fields_have_a_single_upstream() {
        assert_eq!(Field::Theta.upstream(), Some(Field::D));
        assert_eq!(Field::Tau.upstream(), Some(Field::Epsilon));
        assert_eq!(Field::Delta.upstream(), Some(Field::B));
        assert!(Field::Phi.downstream().is_empty());
        assert_eq!(Field::H.downstream(), &[Field::Tau, Field::Theta]);
    }
}
