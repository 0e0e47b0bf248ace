//! Trigonometric relations between the barrier's angles and lengths.
//!
//! Every function takes and returns degrees and metres; radians are only used
//! internally. Results are rounded to one decimal place, the precision at which
//! parameters are displayed and stored.
//!
//! The forward relations are
//!
//! ```text
//! tau   = epsilon + atan2(h - L sin(epsilon), L cos(epsilon) + f)
//! theta = atan2(d / 2, sqrt((h - L sin(epsilon))^2 + (L cos(epsilon) + f)^2))
//! delta = atan2(L, b)
//! ```
//!
//! Inverses are closed-form where the forward relation can be solved
//! algebraically. The others sample the unknown over a fixed plausible range,
//! keep the sample with the smallest error and refine it inside the
//! neighbouring sample interval. Both paths always return a finite value: a
//! vanishing tangent falls back to [`DEGENERATE_LENGTH`] or to the scan, never
//! to a division error.

/// Number of samples taken by the numeric inverses.
pub const SCAN_SAMPLES: usize = 1000;

/// Plausible angle interval in degrees searched by the numeric inverses.
pub const ANGLE_SCAN: (f64, f64) = (0.0, 89.0);

/// Plausible length interval in metres searched by the numeric inverses.
pub const LENGTH_SCAN: (f64, f64) = (0.5, 20.0);

/// Plausible foundation overhang interval in metres.
pub const OVERHANG_SCAN: (f64, f64) = (0.0, 5.0);

/// Length returned by closed-form inversions whose denominator vanishes.
///
/// Deliberately far outside every parameter range so the resolver clamps it
/// and reports a warning.
pub const DEGENERATE_LENGTH: f64 = 100.0;

/// Tangents or cosines smaller than this are treated as zero.
const DEGENERATE_EPSILON: f64 = 1.0e-9;

/// Iterations of the interval refinement following the coarse scan.
const REFINE_ITERATIONS: usize = 60;

/// Round `value` to one decimal place.
///
/// # Examples
/// ```
/// use rockfall_barrier::angles::round1;
///
/// assert_eq!(round1(33.807), 33.8);
/// assert_eq!(round1(-0.04), -0.0);
/// ```
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round a finite result or substitute `fallback`.
fn settle(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        round1(value)
    } else {
        log::warn!("non-finite trigonometric result, using fallback {fallback}");
        fallback
    }
}

/// Horizontal and vertical legs from a support top to its retention anchor.
fn legs(h: f64, length: f64, epsilon: f64, f: f64) -> (f64, f64) {
    let epsilon = epsilon.to_radians();
    (h - length * epsilon.sin(), length * epsilon.cos() + f)
}

/// Unrounded `tau` in degrees.
fn tau_exact(epsilon: f64, h: f64, length: f64, f: f64) -> f64 {
    let (rise, run) = legs(h, length, epsilon, f);
    epsilon + rise.atan2(run).to_degrees()
}

/// Unrounded `theta` in degrees.
fn theta_exact(d: f64, h: f64, length: f64, epsilon: f64, f: f64) -> f64 {
    let (rise, run) = legs(h, length, epsilon, f);
    (d / 2.0).atan2(rise.hypot(run)).to_degrees()
}

/// Unrounded `delta` in degrees.
fn delta_exact(length: f64, b: f64) -> f64 {
    length.atan2(b).to_degrees()
}

/// Angle between the support axis and the retention cable axis.
///
/// # Examples
/// ```
/// use rockfall_barrier::angles::tau;
///
/// assert_eq!(tau(10.0, 6.0, 5.0, 0.5), 53.4);
/// ```
#[must_use]
pub fn tau(epsilon: f64, h: f64, length: f64, f: f64) -> f64 {
    settle(tau_exact(epsilon, h, length, f), 0.0)
}

/// Angle between the retention cable and the support's cross-barrier plane.
///
/// # Examples
/// ```
/// use rockfall_barrier::angles::theta;
///
/// assert_eq!(theta(10.0, 6.0, 5.0, 10.0, 0.5), 33.8);
/// ```
#[must_use]
pub fn theta(d: f64, h: f64, length: f64, epsilon: f64, f: f64) -> f64 {
    settle(theta_exact(d, h, length, epsilon, f), 0.0)
}

/// Angle between the horizontal and the upper support cable.
#[must_use]
pub fn delta(length: f64, b: f64) -> f64 {
    settle(delta_exact(length, b), 0.0)
}

/// Find the argument in `range` whose image under `forward` is closest to
/// `target`.
///
/// A uniform scan of [`SCAN_SAMPLES`] points selects the best sample, after
/// which a ternary search inside the two adjacent intervals sharpens it. The
/// first best sample wins ties so the result is deterministic.
fn scan(range: (f64, f64), target: f64, forward: impl Fn(f64) -> f64) -> f64 {
    let (low, high) = range;
    let step = (high - low) / (SCAN_SAMPLES - 1) as f64;
    let error = |x: f64| {
        let value = forward(x);
        if value.is_finite() {
            (value - target).abs()
        } else {
            f64::INFINITY
        }
    };

    let mut best = low;
    let mut best_error = f64::INFINITY;
    for sample in 0..SCAN_SAMPLES {
        let x = low + step * sample as f64;
        let e = error(x);
        if e < best_error {
            best = x;
            best_error = e;
        }
    }

    let mut left = (best - step).max(low);
    let mut right = (best + step).min(high);
    for _ in 0..REFINE_ITERATIONS {
        let one_third = left + (right - left) / 3.0;
        let two_thirds = right - (right - left) / 3.0;
        if error(one_third) <= error(two_thirds) {
            right = two_thirds;
        } else {
            left = one_third;
        }
    }
    let refined = (left + right) / 2.0;
    if error(refined) <= best_error {
        refined
    } else {
        best
    }
}

/// Support inclination producing `tau` for the given `h`, `length` and `f`.
#[must_use]
pub fn epsilon_from_tau(tau: f64, h: f64, length: f64, f: f64) -> f64 {
    let epsilon = scan(ANGLE_SCAN, tau, |epsilon| tau_exact(epsilon, h, length, f));
    settle(epsilon, ANGLE_SCAN.0)
}

/// Support length producing `tau` for the given inclination, `h` and `f`.
#[must_use]
pub fn length_from_tau(tau: f64, epsilon: f64, h: f64, f: f64) -> f64 {
    let length = scan(LENGTH_SCAN, tau, |length| tau_exact(epsilon, h, length, f));
    settle(length, LENGTH_SCAN.0)
}

/// Base-to-anchor height producing `tau`.
///
/// Solved in closed form as `h = L sin(epsilon) + tan(tau - epsilon) (L cos(epsilon) + f)`;
/// when `tau - epsilon` approaches a right angle, or the closed form leaves the
/// plausible length interval, the numeric scan is used instead.
#[must_use]
pub fn h_from_tau(tau: f64, epsilon: f64, length: f64, f: f64) -> f64 {
    let opening = (tau - epsilon).to_radians();
    let (_, run) = legs(0.0, length, epsilon, f);
    let closed = if opening.cos().abs() > DEGENERATE_EPSILON && run > 0.0 {
        length * epsilon.to_radians().sin() + opening.tan() * run
    } else {
        f64::NAN
    };
    if closed.is_finite() && (LENGTH_SCAN.0..=LENGTH_SCAN.1).contains(&closed) {
        return round1(closed);
    }
    let h = scan(LENGTH_SCAN, tau, |h| tau_exact(epsilon, h, length, f));
    settle(h, LENGTH_SCAN.0)
}

/// Foundation overhang producing `tau`.
///
/// Solved in closed form as `f = (h - L sin(epsilon)) / tan(tau - epsilon) - L cos(epsilon)`,
/// falling back to the numeric scan when the tangent vanishes or the result is
/// not a plausible overhang.
#[must_use]
pub fn f_from_tau(tau: f64, epsilon: f64, h: f64, length: f64) -> f64 {
    let opening = (tau - epsilon).to_radians();
    let (rise, run) = legs(h, length, epsilon, 0.0);
    let closed = if opening.tan().abs() > DEGENERATE_EPSILON {
        rise / opening.tan() - run
    } else {
        f64::NAN
    };
    if closed.is_finite() && (OVERHANG_SCAN.0..=OVERHANG_SCAN.1).contains(&closed) {
        return round1(closed);
    }
    let f = scan(OVERHANG_SCAN, tau, |f| tau_exact(epsilon, h, length, f));
    settle(f, OVERHANG_SCAN.0)
}

/// Support spacing producing `theta`.
///
/// Closed form `d = 2 tan(theta) sqrt((h - L sin(epsilon))^2 + (L cos(epsilon) + f)^2)`.
/// Returns [`DEGENERATE_LENGTH`] when `theta` reaches a right angle.
///
/// # Examples
/// ```
/// use rockfall_barrier::angles::{d_from_theta, theta};
///
/// let angle = theta(10.0, 6.0, 5.0, 10.0, 0.5);
/// let spacing = d_from_theta(angle, 6.0, 5.0, 10.0, 0.5);
/// assert!((spacing - 10.0).abs() <= 0.05);
/// ```
#[must_use]
pub fn d_from_theta(theta: f64, h: f64, length: f64, epsilon: f64, f: f64) -> f64 {
    let angle = theta.to_radians();
    if angle.cos() < DEGENERATE_EPSILON {
        log::warn!("theta {theta} has no finite spacing, using {DEGENERATE_LENGTH}");
        return DEGENERATE_LENGTH;
    }
    let (rise, run) = legs(h, length, epsilon, f);
    settle(2.0 * angle.tan() * rise.hypot(run), DEGENERATE_LENGTH)
}

/// Base-to-anchor height producing `theta`.
#[must_use]
pub fn h_from_theta(theta: f64, d: f64, length: f64, epsilon: f64, f: f64) -> f64 {
    let h = scan(LENGTH_SCAN, theta, |h| theta_exact(d, h, length, epsilon, f));
    settle(h, LENGTH_SCAN.0)
}

/// Support length producing `theta`.
#[must_use]
pub fn length_from_theta(theta: f64, d: f64, h: f64, epsilon: f64, f: f64) -> f64 {
    let length = scan(LENGTH_SCAN, theta, |length| {
        theta_exact(d, h, length, epsilon, f)
    });
    settle(length, LENGTH_SCAN.0)
}

/// Support inclination producing `theta`.
#[must_use]
pub fn epsilon_from_theta(theta: f64, d: f64, h: f64, length: f64, f: f64) -> f64 {
    let epsilon = scan(ANGLE_SCAN, theta, |epsilon| {
        theta_exact(d, h, length, epsilon, f)
    });
    settle(epsilon, ANGLE_SCAN.0)
}

/// Foundation overhang producing `theta`.
#[must_use]
pub fn f_from_theta(theta: f64, d: f64, h: f64, length: f64, epsilon: f64) -> f64 {
    let f = scan(OVERHANG_SCAN, theta, |f| theta_exact(d, h, length, epsilon, f));
    settle(f, OVERHANG_SCAN.0)
}

/// Edge distance producing `delta` for a support of `length`.
///
/// Closed form `b = L / tan(delta)`. Returns [`DEGENERATE_LENGTH`] when the
/// tangent vanishes (a flat upper support cable never reaches the terrain).
///
/// # Examples
/// ```
/// use rockfall_barrier::angles::{b_from_delta, DEGENERATE_LENGTH};
///
/// assert_eq!(b_from_delta(45.0, 5.0), 5.0);
/// assert_eq!(b_from_delta(0.0, 5.0), DEGENERATE_LENGTH);
/// ```
#[must_use]
pub fn b_from_delta(delta: f64, length: f64) -> f64 {
    let tangent = delta.to_radians().tan();
    if tangent.abs() < DEGENERATE_EPSILON {
        log::warn!("delta {delta} has no finite edge distance, using {DEGENERATE_LENGTH}");
        return DEGENERATE_LENGTH;
    }
    settle(length / tangent, DEGENERATE_LENGTH)
}

/// Support length producing `delta` for an edge distance `b`.
///
/// Returns [`DEGENERATE_LENGTH`] when `delta` reaches a right angle.
#[must_use]
pub fn length_from_delta(delta: f64, b: f64) -> f64 {
    let angle = delta.to_radians();
    if angle.cos().abs() < DEGENERATE_EPSILON {
        return DEGENERATE_LENGTH;
    }
    settle(b * angle.tan(), DEGENERATE_LENGTH)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn forward_relations_match_reference_values() {
        assert_eq!(tau(10.0, 6.0, 5.0, 0.5), 53.4);
        assert_eq!(theta(10.0, 6.0, 5.0, 10.0, 0.5), 33.8);
        assert_eq!(delta(5.0, 8.0), 32.0);
        assert_eq!(delta(8.0, 8.0), 45.0);
        assert_eq!(tau(80.0, 6.0, 5.0, 0.5), 118.2);
        assert_eq!(theta(10.0, 6.0, 5.0, 80.0, 0.5), 70.8);
    }

    #[test]
    fn outputs_are_rounded_to_one_decimal() {
        for value in [
            tau(12.3, 4.4, 6.1, 0.7),
            theta(7.7, 4.4, 6.1, 12.3, 0.7),
            delta(6.1, 3.3),
            epsilon_from_tau(50.0, 6.0, 5.0, 0.5),
        ] {
            assert_abs_diff_eq!(value * 10.0, (value * 10.0).round(), epsilon = 1.0e-9);
        }
    }

    #[test]
    fn spacing_round_trips_through_theta() {
        for d in [4.0, 10.0, 17.5] {
            let angle = theta(d, 6.0, 5.0, 10.0, 0.5);
            assert_abs_diff_eq!(d_from_theta(angle, 6.0, 5.0, 10.0, 0.5), d, epsilon = 0.1);
        }
        let angle = theta(10.0, 6.0, 5.0, 10.0, 0.5);
        assert_abs_diff_eq!(d_from_theta(angle, 6.0, 5.0, 10.0, 0.5), 10.0, epsilon = 0.05);
    }

    #[test]
    fn edge_distance_round_trips_through_delta() {
        let angle = delta(5.0, 8.0);
        assert_abs_diff_eq!(b_from_delta(angle, 5.0), 8.0, epsilon = 0.05);
        assert_abs_diff_eq!(length_from_delta(angle, 8.0), 5.0, epsilon = 0.05);
    }

    #[test]
    fn inclination_scan_recovers_tau_target() {
        let epsilon = epsilon_from_tau(60.0, 6.0, 5.0, 0.5);
        assert_abs_diff_eq!(epsilon, 20.8, epsilon = 0.1);
        assert_abs_diff_eq!(tau(epsilon, 6.0, 5.0, 0.5), 60.0, epsilon = 0.1);
    }

    #[test]
    fn tau_inverses_recover_their_inputs() {
        let angle = tau(10.0, 6.0, 5.0, 0.5);
        assert_abs_diff_eq!(epsilon_from_tau(angle, 6.0, 5.0, 0.5), 10.0, epsilon = 0.15);
        assert_abs_diff_eq!(h_from_tau(angle, 10.0, 5.0, 0.5), 6.0, epsilon = 0.15);
        assert_abs_diff_eq!(f_from_tau(angle, 10.0, 6.0, 5.0), 0.5, epsilon = 0.15);
        assert_abs_diff_eq!(length_from_tau(angle, 10.0, 6.0, 0.5), 5.0, epsilon = 0.15);
    }

    #[test]
    fn theta_inverses_recover_their_inputs() {
        let angle = theta(10.0, 6.0, 5.0, 10.0, 0.5);
        let check = |value: f64, expected: f64, recompute: f64| {
            // Non-monotonic relations may land on another preimage; the angle must still match.
            assert!((value - expected).abs() <= 0.15 || (recompute - angle).abs() <= 0.1);
        };
        let h = h_from_theta(angle, 10.0, 5.0, 10.0, 0.5);
        check(h, 6.0, theta(10.0, h, 5.0, 10.0, 0.5));
        let length = length_from_theta(angle, 10.0, 6.0, 10.0, 0.5);
        check(length, 5.0, theta(10.0, 6.0, length, 10.0, 0.5));
        let epsilon = epsilon_from_theta(angle, 10.0, 6.0, 5.0, 0.5);
        check(epsilon, 10.0, theta(10.0, 6.0, 5.0, epsilon, 0.5));
        let f = f_from_theta(angle, 10.0, 6.0, 5.0, 10.0);
        check(f, 0.5, theta(10.0, 6.0, 5.0, 10.0, f));
    }

    #[test]
    fn degenerate_inputs_return_finite_fallbacks() {
        assert_eq!(b_from_delta(0.0, 5.0), DEGENERATE_LENGTH);
        assert_eq!(d_from_theta(90.0, 6.0, 5.0, 10.0, 0.5), DEGENERATE_LENGTH);
        assert_eq!(length_from_delta(90.0, 8.0), DEGENERATE_LENGTH);
        assert!(h_from_tau(100.0, 10.0, 5.0, 0.5).is_finite());
        assert!(f_from_tau(10.0, 10.0, 6.0, 5.0).is_finite());
        assert_eq!(tau(f64::NAN, 6.0, 5.0, 0.5), 0.0);
    }

    #[test]
    fn unreachable_targets_return_the_closest_sample() {
        let epsilon = epsilon_from_tau(500.0, 6.0, 5.0, 0.5);
        assert!((ANGLE_SCAN.0..=ANGLE_SCAN.1).contains(&epsilon));
    }
}
