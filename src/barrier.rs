//! Structural elements of a barrier and the aggregate configuration.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::builder;
use crate::errors::{BarrierEditError, BuildError, ConfigError};
use crate::geometry::Point;
use crate::params::BarrierParameters;

/// Identifier prefix shared by every retention anchor.
pub const RETENTION_ANCHOR_PREFIX: &str = "v";

/// A support post.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Support {
    /// Foot of the post on the terrain.
    pub base: Point,
    /// Head of the post where the cables attach.
    pub top: Point,
    /// Post length in metres.
    #[serde(default)]
    pub length: f64,
    /// Display name such as `S1`.
    #[serde(default)]
    pub name: String,
}

/// A ground-fixed attachment point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Anchor head position.
    pub position: Point,
    /// Display name such as `V1`.
    #[serde(default)]
    pub name: String,
}

/// Structural role of a cable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CableKind {
    /// Retention cable running from a support top to a retention anchor.
    #[serde(rename = "rhs")]
    Retention,
    /// Upper support cable from an end support top.
    #[serde(rename = "tso")]
    UpperSupport,
    /// Lower support cable from an end support base.
    #[serde(rename = "tsu")]
    LowerSupport,
    /// Catching cable between adjacent support tops.
    #[serde(rename = "fa")]
    Catching,
    /// Lateral bracing from an end support top.
    #[serde(rename = "sa")]
    LateralBracing,
}

impl CableKind {
    /// Every kind, in the order input forms group them.
    pub const ALL: [CableKind; 5] = [
        CableKind::Retention,
        CableKind::UpperSupport,
        CableKind::LowerSupport,
        CableKind::Catching,
        CableKind::LateralBracing,
    ];

    /// Default display colour.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            CableKind::Retention => "green",
            CableKind::UpperSupport | CableKind::LowerSupport => "red",
            CableKind::Catching => "gold",
            CableKind::LateralBracing => "blue",
        }
    }

    /// Human readable group label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            CableKind::Retention => "Retention cables (Rhs)",
            CableKind::UpperSupport => "Upper support cables (Tso)",
            CableKind::LowerSupport => "Lower support cables (Tsu)",
            CableKind::Catching => "Catching cables (Fa)",
            CableKind::LateralBracing => "Lateral bracing (Sa)",
        }
    }
}

/// A structural link between two supports or a support and an anchor.
///
/// `start_coords` and `end_coords` are copies taken when the barrier was built.
/// They do not follow later geometry changes; the whole configuration is
/// rebuilt instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cable {
    /// Identifier of the starting support or anchor.
    pub start: String,
    /// Identifier of the ending support or anchor.
    pub end: String,
    /// Structural role.
    #[serde(rename = "type")]
    pub kind: CableKind,
    /// Measured tension in kilonewtons.
    #[serde(default)]
    pub force: f64,
    /// Whether the cable carries a load cell and thus a trustworthy force.
    #[serde(default)]
    pub has_load_cell: bool,
    /// Display colour.
    #[serde(default)]
    pub color: String,
    /// Display name such as `Rhs 1`.
    #[serde(default)]
    pub name: String,
    /// Position of the start point at build time.
    #[serde(default)]
    pub start_coords: Point,
    /// Position of the end point at build time.
    #[serde(default)]
    pub end_coords: Point,
}

impl Cable {
    /// Straight-line length between the recorded endpoints in metres.
    #[must_use]
    pub fn span(&self) -> f64 {
        self.start_coords.distance_to(self.end_coords)
    }
}

/// Complete description of one barrier: elements, cables and parameters.
///
/// Every top-level key is optional when deserializing; missing maps default to
/// empty and missing parameters to [`BarrierParameters::default`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarrierConfig {
    /// Supports keyed by identifier (`s1`, `s2`, ...).
    pub supports: BTreeMap<String, Support>,
    /// Anchors keyed by identifier (`v1`, ..., `tso1`, `sa2`, ...).
    pub anchors: BTreeMap<String, Anchor>,
    /// Cables keyed by identifier (`rhs1`, `fa1`, `tso_s1`, ...).
    pub cables: BTreeMap<String, Cable>,
    /// Parameters the geometry was built from.
    pub params: BarrierParameters,
}

impl BarrierConfig {
    /// Build a fresh configuration from `params`.
    ///
    /// # Errors
    ///
    /// See [`build`](crate::build).
    pub fn rebuild(params: &BarrierParameters) -> Result<Self, BuildError> {
        builder::build(params)
    }

    /// Return `true` when `id` names a support.
    #[must_use]
    pub fn is_support(&self, id: &str) -> bool {
        self.supports.contains_key(id)
    }

    /// Return `true` when `id` names an anchor.
    #[must_use]
    pub fn is_anchor(&self, id: &str) -> bool {
        self.anchors.contains_key(id)
    }

    /// Return `true` when `id` names a retention anchor.
    #[must_use]
    pub fn is_retention_anchor(&self, id: &str) -> bool {
        id.starts_with(RETENTION_ANCHOR_PREFIX) && self.is_anchor(id)
    }

    /// Return `true` when the cable touches an anchor and may carry a load cell.
    #[must_use]
    pub fn can_have_load_cell(&self, cable: &Cable) -> bool {
        self.is_anchor(&cable.start) || self.is_anchor(&cable.end)
    }

    /// Look up a cable, reporting unknown identifiers.
    fn cable_mut(&mut self, id: &str) -> Result<&mut Cable, BarrierEditError> {
        self.cables
            .get_mut(id)
            .ok_or_else(|| BarrierEditError::UnknownCable(id.to_owned()))
    }

    /// Record the measured tension of a cable in kilonewtons.
    ///
    /// # Errors
    ///
    /// Returns [`BarrierEditError::UnknownCable`] when `id` is not a cable and
    /// [`BarrierEditError::InvalidForce`] when `force` is negative or not finite.
    pub fn set_cable_force(&mut self, id: &str, force: f64) -> Result<(), BarrierEditError> {
        if !force.is_finite() || force < 0.0 {
            return Err(BarrierEditError::InvalidForce {
                cable: id.to_owned(),
                force,
            });
        }
        self.cable_mut(id)?.force = force;
        Ok(())
    }

    /// Mark whether a cable carries a load cell.
    ///
    /// Removing a load cell is always allowed. Fitting one requires the cable
    /// to touch an anchor.
    ///
    /// # Errors
    ///
    /// Returns [`BarrierEditError::UnknownCable`] when `id` is not a cable and
    /// [`BarrierEditError::LoadCellUnsupported`] when fitting a load cell to a
    /// cable between two supports.
    pub fn set_load_cell(&mut self, id: &str, has_load_cell: bool) -> Result<(), BarrierEditError> {
        let anchored = match self.cables.get(id) {
            Some(cable) => self.can_have_load_cell(cable),
            None => return Err(BarrierEditError::UnknownCable(id.to_owned())),
        };
        if has_load_cell && !anchored {
            return Err(BarrierEditError::LoadCellUnsupported(id.to_owned()));
        }
        self.cable_mut(id)?.has_load_cell = has_load_cell;
        Ok(())
    }

    /// Cables that may carry a load cell, grouped by kind in form order.
    ///
    /// Kinds without such cables are omitted.
    #[must_use]
    pub fn instrumentable_cables(&self) -> Vec<(CableKind, Vec<&str>)> {
        CableKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let ids: Vec<&str> = self
                    .cables
                    .iter()
                    .filter(|(_, cable)| cable.kind == kind && self.can_have_load_cell(cable))
                    .map(|(id, _)| id.as_str())
                    .collect();
                (!ids.is_empty()).then_some((kind, ids))
            })
            .collect()
    }

    /// Parse a configuration from JSON, tolerating missing keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] when the document is malformed.
    ///
    /// # Examples
    /// ```
    /// use rockfall_barrier::{BarrierConfig, BarrierParameters};
    ///
    /// let config = BarrierConfig::from_json(r#"{"cables": {}}"#).expect("valid json");
    /// assert!(config.supports.is_empty());
    /// assert_eq!(config.params, BarrierParameters::default());
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a configuration from any JSON source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when reading fails or the document is malformed.
    pub fn from_reader(reader: impl Read) -> Result<Self, ConfigError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Serialize the configuration as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] when serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the configuration as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when writing fails.
    pub fn to_writer(&self, writer: impl Write) -> Result<(), ConfigError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}
