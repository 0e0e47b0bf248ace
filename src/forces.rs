//! Sums measured cable tensions into per-element reactions.
//!
//! This is a linear tally of what the load cells report at each attachment
//! point, not a statics solve: no equilibrium, moments or load redistribution
//! are considered.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::barrier::BarrierConfig;

/// Accumulated force per support and anchor plus the two totals, in kN.
///
/// Serializes as one flat map: element identifiers next to
/// `total_anchor_force` and `total_support_force`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ForceResult {
    /// Force accumulated at every support and anchor.
    #[serde(flatten)]
    pub forces: BTreeMap<String, f64>,
    /// Sum over the retention anchors only.
    pub total_anchor_force: f64,
    /// Sum over all supports.
    pub total_support_force: f64,
}

impl ForceResult {
    /// Force at a support or anchor; unknown identifiers read as zero.
    #[must_use]
    pub fn force_at(&self, id: &str) -> f64 {
        self.forces.get(id).copied().unwrap_or(0.0)
    }
}

/// Sum the instrumented cable forces flowing into each support and anchor.
///
/// Only cables with a load cell and a non-zero force contribute. Each such
/// cable adds its force to the first of its endpoints that is an anchor and,
/// independently, to the first that is a support (start checked before end).
/// Cables referencing an element missing from the configuration are skipped.
///
/// The anchor total covers the retention anchors (`v...`) only; the upper,
/// lower and lateral anchors carry other load paths.
///
/// # Examples
/// ```
/// use rockfall_barrier::{aggregate, build, BarrierParameters};
///
/// let mut config = build(&BarrierParameters::default()).expect("default parameters build");
/// config.set_cable_force("rhs1", 20.0).expect("known cable");
/// let result = aggregate(&config);
/// assert_eq!(result.force_at("s1"), 20.0);
/// assert_eq!(result.force_at("v1"), 20.0);
/// assert_eq!(result.total_anchor_force, 20.0);
/// ```
#[must_use]
pub fn aggregate(config: &BarrierConfig) -> ForceResult {
    let mut forces: BTreeMap<String, f64> = config
        .supports
        .keys()
        .chain(config.anchors.keys())
        .map(|id| (id.clone(), 0.0))
        .collect();

    for (id, cable) in &config.cables {
        if !cable.has_load_cell || cable.force == 0.0 {
            continue;
        }
        let known = |end: &str| config.is_support(end) || config.is_anchor(end);
        if !known(&cable.start) || !known(&cable.end) {
            log::warn!(
                "cable {id} references a missing element ({} -> {}); skipped",
                cable.start,
                cable.end
            );
            continue;
        }

        let ends = [cable.start.as_str(), cable.end.as_str()];
        let anchor = ends.into_iter().find(|end| config.is_anchor(end));
        let support = ends.into_iter().find(|end| config.is_support(end));
        for end in anchor.into_iter().chain(support) {
            if let Some(total) = forces.get_mut(end) {
                *total += cable.force;
            }
        }
    }

    let total_anchor_force: f64 = forces
        .iter()
        .filter(|(id, _)| config.is_retention_anchor(id))
        .map(|(_, force)| force)
        .sum();
    let total_support_force: f64 = config
        .supports
        .keys()
        .map(|id| forces.get(id).copied().unwrap_or(0.0))
        .sum();

    ForceResult {
        forces,
        total_anchor_force,
        total_support_force,
    }
}
