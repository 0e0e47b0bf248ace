//! Turns resolved parameters into supports, anchors and cables.
//!
//! The barrier line runs along +Y starting at the first support. X points
//! across the barrier and the terrain rises along it with inclination `phi`,
//! so the ground height is `x tan(phi)`. Retention anchors sit on the slope
//! at a terrain-frame offset of `h` across and `f` below the support base;
//! with this placement the built cables reproduce the `theta` and `tau` of
//! the [angle relations](crate::angles).

use std::collections::BTreeMap;

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::barrier::{Anchor, BarrierConfig, Cable, CableKind, Support};
use crate::errors::BuildError;
use crate::geometry::{point, Point};
use crate::params::BarrierParameters;

/// Side of the support line that holds the retention anchors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlopeSide {
    /// Towards rising terrain (+X).
    Upslope,
    /// Towards falling terrain (-X).
    Downslope,
}

impl SlopeSide {
    /// Sign of the X offset for this side.
    const fn sign(self) -> f64 {
        match self {
            SlopeSide::Upslope => 1.0,
            SlopeSide::Downslope => -1.0,
        }
    }
}

/// Placement conventions for anchors.
///
/// The defaults reproduce the angle relations; the alternatives exist because
/// field layouts differ on which side and how deep anchors are set.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Side holding retention and upper support cable anchors.
    pub retention_side: SlopeSide,
    /// Depth of the lateral bracing anchors below the terrain as a fraction of `h`.
    pub bracing_depth: f64,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            retention_side: SlopeSide::Upslope,
            bracing_depth: 0.5,
        }
    }
}

/// Inclined terrain plane through the first support base.
struct Terrain {
    /// Inclination in radians.
    phi: f64,
}

impl Terrain {
    /// Ground height above the origin at cross-barrier position `x`.
    fn height(&self, x: f64) -> f64 {
        x * self.phi.tan()
    }

    /// Unit vector along the ground, pointing upslope.
    fn along(&self) -> Vector3<f64> {
        Vector3::new(self.phi.cos(), 0.0, self.phi.sin())
    }

    /// Unit normal of the ground.
    fn normal(&self) -> Vector3<f64> {
        Vector3::new(-self.phi.sin(), 0.0, self.phi.cos())
    }

    /// Point on the ground at cross-barrier position `x` and barrier position `y`.
    fn ground(&self, x: f64, y: f64) -> Point {
        point(x, y, self.height(x))
    }
}

/// Build the configuration of a barrier with the default [`Layout`].
///
/// Pure: identical parameters always produce an identical configuration.
/// Cables are created with zero force; every cable touching an anchor carries
/// a load cell, catching cables between supports do not.
///
/// # Errors
///
/// Returns [`BuildError::TooFewSupports`] when `num_supports < 2` and
/// [`BuildError::NonFiniteParameter`] when a parameter is NaN or infinite.
///
/// # Examples
/// ```
/// use rockfall_barrier::{build, BarrierParameters};
///
/// let config = build(&BarrierParameters::default()).expect("default parameters build");
/// assert_eq!(config.supports.len(), 4);
/// assert_eq!(config.anchors.len(), 11);
/// assert_eq!(config.cables.len(), 15);
/// ```
pub fn build(params: &BarrierParameters) -> Result<BarrierConfig, BuildError> {
    build_with(params, &Layout::default())
}

/// Build the configuration of a barrier with an explicit [`Layout`].
///
/// # Errors
///
/// See [`build`].
pub fn build_with(
    params: &BarrierParameters,
    layout: &Layout,
) -> Result<BarrierConfig, BuildError> {
    let count = params.num_supports;
    if count < 2 {
        return Err(BuildError::TooFewSupports {
            num_supports: count,
        });
    }
    if let Some(field) = params.first_non_finite() {
        return Err(BuildError::NonFiniteParameter(field));
    }

    let terrain = Terrain {
        phi: params.phi.to_radians(),
    };
    let total_length = (count - 1) as f64 * params.d;

    let supports = place_supports(params, &terrain);
    let retention = place_retention_anchors(params, layout, &terrain);
    let auxiliary = place_auxiliary_anchors(params, layout, &terrain, total_length);
    let cables = connect(&supports, &retention, &auxiliary);

    if params.has_delta1 || params.has_delta2 {
        log::debug!("intermediate cable flags are set but carry no geometry");
    }
    log::debug!(
        "built barrier: {} supports, {} anchors, {} cables",
        supports.len(),
        retention.len() + auxiliary.len(),
        cables.len()
    );

    Ok(BarrierConfig {
        supports: supports.into_iter().collect(),
        anchors: retention.into_iter().chain(auxiliary).collect(),
        cables,
        params: params.clone(),
    })
}

/// Supports `s1..sN`, leaning `epsilon` off the terrain normal.
fn place_supports(params: &BarrierParameters, terrain: &Terrain) -> Vec<(String, Support)> {
    let lean = Rotation3::from_axis_angle(&Vector3::y_axis(), params.epsilon.to_radians());
    let axis = (lean * terrain.normal()).normalize();

    (0..params.num_supports)
        .map(|index| {
            let base = terrain.ground(0.0, index as f64 * params.d);
            let top = Point::from(base.to_vector() + axis * params.length);
            let support = Support {
                base,
                top,
                length: params.length,
                name: format!("S{}", index + 1),
            };
            (format!("s{}", index + 1), support)
        })
        .collect()
}

/// Retention anchors `v1..v(N+1)`, half a spacing before, between and after
/// the supports.
fn place_retention_anchors(
    params: &BarrierParameters,
    layout: &Layout,
    terrain: &Terrain,
) -> Vec<(String, Anchor)> {
    // Terrain-frame offset: `h` along the ground, `f` below it. Equivalent to
    // x = ±h cos(phi) + f sin(phi), z = height(x) - f / cos(phi).
    let offset = terrain.along() * (layout.retention_side.sign() * params.h)
        - terrain.normal() * params.f;

    (0..=params.num_supports)
        .map(|slot| {
            let y = (slot as f64 - 0.5) * params.d;
            let position = point(offset.x, y, offset.z);
            let anchor = Anchor {
                position,
                name: format!("V{}", slot + 1),
            };
            (format!("v{}", slot + 1), anchor)
        })
        .collect()
}

/// Anchors of the end supports: upper (`tso`), lower (`tsu`) and lateral
/// bracing (`sa`), `b` beyond each end of the barrier line.
fn place_auxiliary_anchors(
    params: &BarrierParameters,
    layout: &Layout,
    terrain: &Terrain,
    total_length: f64,
) -> Vec<(String, Anchor)> {
    let upper_x = layout.retention_side.sign() * params.b;
    let ends = [-params.b, total_length + params.b];
    let bracing_drop = layout.bracing_depth * params.h;

    let mut anchors = Vec::with_capacity(6);
    for (prefix, label, x, drop) in [
        ("tso", "Tso", upper_x, 0.0),
        ("tsu", "Tsu", -upper_x, 0.0),
        ("sa", "Sa", 0.0, bracing_drop),
    ] {
        for (end, y) in ends.iter().enumerate() {
            let ground = terrain.ground(x, *y);
            let anchor = Anchor {
                position: point(ground.x, ground.y, ground.z - drop),
                name: format!("{label} {}", end + 1),
            };
            anchors.push((format!("{prefix}{}", end + 1), anchor));
        }
    }
    anchors
}

/// Create a cable and copy its endpoint coordinates.
fn cable(kind: CableKind, name: String, start: (&str, Point), end: (&str, Point)) -> Cable {
    Cable {
        start: start.0.to_owned(),
        end: end.0.to_owned(),
        kind,
        force: 0.0,
        has_load_cell: kind != CableKind::Catching,
        color: kind.color().to_owned(),
        name,
        start_coords: start.1,
        end_coords: end.1,
    }
}

/// Identifier and position of an anchor used as a cable end.
fn anchor_end(anchors: &[(String, Anchor)], index: usize) -> (&str, Point) {
    (anchors[index].0.as_str(), anchors[index].1.position)
}

/// Wire the fixed cable topology: `2N` retention, two upper support, two
/// lower support, `N - 1` catching and two lateral bracing cables.
fn connect(
    supports: &[(String, Support)],
    retention: &[(String, Anchor)],
    auxiliary: &[(String, Anchor)],
) -> BTreeMap<String, Cable> {
    let count = supports.len();
    let top = |index: usize| (supports[index].0.as_str(), supports[index].1.top);
    let base = |index: usize| (supports[index].0.as_str(), supports[index].1.base);

    let mut cables = BTreeMap::new();

    // Near anchors first (`v_i` for `s_i`), then far anchors (`v_(i+1)`).
    for shift in [0, 1] {
        for index in 0..count {
            let number = shift * count + index + 1;
            cables.insert(
                format!("rhs{number}"),
                cable(
                    CableKind::Retention,
                    format!("Rhs {number}"),
                    top(index),
                    anchor_end(retention, index + shift),
                ),
            );
        }
    }

    let last = count - 1;
    // Auxiliary anchors are stored as tso1, tso2, tsu1, tsu2, sa1, sa2.
    for (prefix, label, kind, first_anchor) in [
        ("tso", "Tso", CableKind::UpperSupport, 0),
        ("tsu", "Tsu", CableKind::LowerSupport, 2),
        ("sa", "Sa", CableKind::LateralBracing, 4),
    ] {
        for (end, support) in [(0, 0), (1, last)] {
            let start = if kind == CableKind::LowerSupport {
                base(support)
            } else {
                top(support)
            };
            cables.insert(
                format!("{prefix}_s{}", support + 1),
                cable(
                    kind,
                    format!("{label} S{}", support + 1),
                    start,
                    anchor_end(auxiliary, first_anchor + end),
                ),
            );
        }
    }

    for index in 0..last {
        cables.insert(
            format!("fa{}", index + 1),
            cable(
                CableKind::Catching,
                format!("Fa {}", index + 1),
                top(index),
                top(index + 1),
            ),
        );
    }

    cables
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::params::Field;

    fn params_with(num_supports: usize) -> BarrierParameters {
        BarrierParameters {
            num_supports,
            ..BarrierParameters::default()
        }
    }

    #[test]
    fn element_counts_follow_support_count() {
        for count in 2..=8 {
            let config = build(&params_with(count)).expect("valid parameters");
            assert_eq!(config.supports.len(), count);
            assert_eq!(config.cables.len(), 3 * count + 3);
            assert_eq!(config.anchors.len(), count + 7);
            let retention = config
                .anchors
                .keys()
                .filter(|id| config.is_retention_anchor(id))
                .count();
            assert_eq!(retention, count + 1);
        }
        assert_eq!(build(&params_with(2)).expect("two supports").cables.len(), 9);
    }

    #[test]
    fn rejects_degenerate_parameters() {
        assert_eq!(
            build(&params_with(1)),
            Err(BuildError::TooFewSupports { num_supports: 1 })
        );
        let mut params = BarrierParameters::default();
        params.h = f64::INFINITY;
        assert_eq!(build(&params), Err(BuildError::NonFiniteParameter(Field::H)));
    }

    #[test]
    fn range_bounds_give_finite_coordinates() {
        for pick_max in [false, true] {
            let mut params = BarrierParameters::default();
            for field in Field::ALL {
                let limits = field.limits();
                params.set(field, if pick_max { limits.max } else { limits.min });
            }
            params.sync_derived();
            let config = build(&params).expect("bounded parameters build");
            assert!(config
                .supports
                .values()
                .all(|support| support.base.is_finite() && support.top.is_finite()));
            assert!(config
                .anchors
                .values()
                .all(|anchor| anchor.position.is_finite()));
            assert!(config
                .cables
                .values()
                .all(|cable| cable.start_coords.is_finite() && cable.end_coords.is_finite()));
        }
    }

    #[test]
    fn building_is_deterministic() {
        let params = BarrierParameters::default();
        let first = build(&params).expect("valid parameters");
        let second = build(&params).expect("valid parameters");
        assert_eq!(first, second);
        for (id, cable) in &first.cables {
            let other = &second.cables[id];
            assert_eq!(cable.start_coords.x.to_bits(), other.start_coords.x.to_bits());
            assert_eq!(cable.end_coords.z.to_bits(), other.end_coords.z.to_bits());
        }
    }

    #[test]
    fn supports_lean_off_the_terrain_normal() {
        let config = build(&BarrierParameters::default()).expect("valid parameters");
        let first = &config.supports["s1"];
        assert_eq!(first.base, point(0.0, 0.0, 0.0));
        assert_abs_diff_eq!(first.top.x, -0.435_779, epsilon = 1.0e-6);
        assert_abs_diff_eq!(first.top.y, 0.0, epsilon = 1.0e-12);
        assert_abs_diff_eq!(first.top.z, 4.980_973, epsilon = 1.0e-6);
        for support in config.supports.values() {
            assert_abs_diff_eq!(support.base.distance_to(support.top), 5.0, epsilon = 1.0e-9);
        }
        assert_abs_diff_eq!(config.supports["s4"].base.y, 30.0);
    }

    #[test]
    fn retention_anchors_bracket_the_supports() {
        let config = build(&BarrierParameters::default()).expect("valid parameters");
        let ys: Vec<f64> = (1..=5)
            .map(|slot| config.anchors[&format!("v{slot}")].position.y)
            .collect();
        assert_eq!(ys, vec![-5.0, 5.0, 15.0, 25.0, 35.0]);
        let v1 = config.anchors["v1"].position;
        assert_abs_diff_eq!(v1.x, 5.924_964, epsilon = 1.0e-6);
        assert_abs_diff_eq!(v1.z, 1.069_951, epsilon = 1.0e-6);
    }

    #[test]
    fn retention_cables_reproduce_theta_and_tau() {
        let params = BarrierParameters::default();
        let config = build(&params).expect("valid parameters");
        // rhs5 runs from the first support to its far anchor.
        let cable = &config.cables["rhs5"];
        assert_eq!((cable.start.as_str(), cable.end.as_str()), ("s1", "v2"));
        let along = cable.end_coords.to_vector() - cable.start_coords.to_vector();
        let theta = (along.y.abs() / along.norm()).asin().to_degrees();
        assert_abs_diff_eq!(theta, params.theta, epsilon = 0.06);

        let support = &config.supports["s1"];
        let down = support.base.to_vector() - support.top.to_vector();
        let in_plane = Vector3::new(along.x, 0.0, along.z);
        assert_abs_diff_eq!(down.angle(&in_plane).to_degrees(), params.tau, epsilon = 0.06);
    }

    #[test]
    fn cable_topology_and_instrumentation() {
        let config = build(&BarrierParameters::default()).expect("valid parameters");
        let near = &config.cables["rhs1"];
        assert_eq!((near.start.as_str(), near.end.as_str()), ("s1", "v1"));
        let far = &config.cables["rhs8"];
        assert_eq!((far.start.as_str(), far.end.as_str()), ("s4", "v5"));
        assert_eq!(config.cables["tso_s4"].end, "tso2");
        assert_eq!(config.cables["tsu_s1"].end, "tsu1");
        assert_eq!(config.cables["sa_s4"].end, "sa2");
        let catching = &config.cables["fa3"];
        assert_eq!((catching.start.as_str(), catching.end.as_str()), ("s3", "s4"));

        for cable in config.cables.values() {
            assert_eq!(cable.has_load_cell, cable.kind != CableKind::Catching);
            assert_eq!(cable.force, 0.0);
            assert_eq!(cable.color, cable.kind.color());
        }
    }

    #[test]
    fn endpoint_coordinates_are_copied_from_elements() {
        let config = build(&BarrierParameters::default()).expect("valid parameters");
        for cable in config.cables.values() {
            let start = &config.supports[&cable.start];
            let expected_start = if cable.kind == CableKind::LowerSupport {
                start.base
            } else {
                start.top
            };
            assert_eq!(cable.start_coords, expected_start);
            let expected_end = config
                .anchors
                .get(&cable.end)
                .map(|anchor| anchor.position)
                .or_else(|| config.supports.get(&cable.end).map(|support| support.top));
            assert_eq!(Some(cable.end_coords), expected_end);
        }
    }

    #[test]
    fn auxiliary_anchors_sit_beyond_the_end_supports() {
        let config = build(&BarrierParameters::default()).expect("valid parameters");
        let tso2 = config.anchors["tso2"].position;
        assert_eq!((tso2.x, tso2.y), (8.0, 38.0));
        assert_abs_diff_eq!(tso2.z, 8.0 * 15.0_f64.to_radians().tan(), epsilon = 1.0e-12);
        let tsu1 = config.anchors["tsu1"].position;
        assert_eq!((tsu1.x, tsu1.y), (-8.0, -8.0));
        let sa1 = config.anchors["sa1"].position;
        assert_eq!(sa1, point(0.0, -8.0, -3.0));
    }

    #[test]
    fn intermediate_cable_flags_add_no_geometry() {
        let plain = build(&BarrierParameters::default()).expect("valid parameters");
        let flagged = build(&BarrierParameters {
            has_delta1: true,
            delta1: 20.0,
            has_delta2: true,
            delta2: 30.0,
            ..BarrierParameters::default()
        })
        .expect("valid parameters");
        assert_eq!(plain.cables, flagged.cables);
        assert_eq!(plain.anchors, flagged.anchors);
    }

    #[test]
    fn downslope_layout_mirrors_the_anchors() {
        let layout = Layout {
            retention_side: SlopeSide::Downslope,
            ..Layout::default()
        };
        let config = build_with(&BarrierParameters::default(), &layout).expect("valid parameters");
        assert!(config.anchors["v1"].position.x < 0.0);
        assert_eq!(config.anchors["tso1"].position.x, -8.0);
        assert_eq!(config.anchors["tsu1"].position.x, 8.0);
    }
}
