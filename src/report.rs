use rockfall_barrier::{BarrierConfig, CableKind, ForceResult, Topology};
use std::fmt::Write;

/// Render a textual force report for a barrier.
///
/// Supports and retention anchors are listed with their coordinates and the
/// force summed from their load cells. Cables follow, grouped by kind with
/// their span and reading, then the totals. Cables whose endpoints cannot be
/// resolved are called out because they were left out of the sums.
#[must_use]
pub fn render_report(config: &BarrierConfig, result: &ForceResult) -> String {
    let mut output = String::new();
    let params = &config.params;

    writeln!(
        &mut output,
        "Rockfall barrier with {} supports (d = {:.1} m, L = {:.1} m, phi = {:.1}°)",
        params.num_supports, params.d, params.length, params.phi
    )
    .expect("writing to string cannot fail");
    writeln!(
        &mut output,
        "Angles: theta = {:.1}°, tau = {:.1}°, delta = {:.1}°, epsilon = {:.1}°",
        params.theta, params.tau, params.delta, params.epsilon
    )
    .expect("writing to string cannot fail");

    output.push_str("\nSupports\n");
    for (id, support) in &config.supports {
        writeln!(
            &mut output,
            "  {:<4} base ({:+.2}, {:+.2}, {:+.2}) top ({:+.2}, {:+.2}, {:+.2})  {:>7.1} kN",
            support.name,
            support.base.x,
            support.base.y,
            support.base.z,
            support.top.x,
            support.top.y,
            support.top.z,
            result.force_at(id)
        )
        .expect("writing to string cannot fail");
    }

    // Auxiliary anchors are left out, matching the anchor total.
    output.push_str("\nRetention anchors\n");
    for (id, anchor) in config
        .anchors
        .iter()
        .filter(|(id, _)| config.is_retention_anchor(id))
    {
        writeln!(
            &mut output,
            "  {:<4} at ({:+.2}, {:+.2}, {:+.2})  {:>7.1} kN",
            anchor.name,
            anchor.position.x,
            anchor.position.y,
            anchor.position.z,
            result.force_at(id)
        )
        .expect("writing to string cannot fail");
    }

    for kind in CableKind::ALL {
        let mut cables = config
            .cables
            .values()
            .filter(|cable| cable.kind == kind)
            .peekable();
        if cables.peek().is_none() {
            continue;
        }
        writeln!(&mut output, "\n{}", kind.label()).expect("writing to string cannot fail");
        for cable in cables {
            let reading = if cable.has_load_cell {
                format!("{:>7.1} kN", cable.force)
            } else {
                "      no load cell".to_owned()
            };
            writeln!(
                &mut output,
                "  {:<8} {:>4} -> {:<4} {:>6.2} m  {reading}",
                cable.name,
                cable.start,
                cable.end,
                cable.span()
            )
            .expect("writing to string cannot fail");
        }
    }

    writeln!(
        &mut output,
        "\nTotal anchor force: {:.1} kN\nTotal support force: {:.1} kN",
        result.total_anchor_force, result.total_support_force
    )
    .expect("writing to string cannot fail");

    let topology = Topology::of(config);
    if !topology.dangling_cables().is_empty() {
        writeln!(
            &mut output,
            "Skipped cables with missing endpoints: {}",
            topology.dangling_cables().join(", ")
        )
        .expect("writing to string cannot fail");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rockfall_barrier::{aggregate, build, BarrierParameters};

    #[test]
    fn formats_human_readable_report() {
        let mut config = build(&BarrierParameters::default()).expect("default parameters build");
        config.set_cable_force("rhs1", 12.0).expect("known cable");
        let report = render_report(&config, &aggregate(&config));
        assert!(report.contains("Rockfall barrier with 4 supports"));
        assert!(report.contains("theta = 33.8°"));
        assert!(report.contains("V5"));
        assert!(!report.contains("Tso 1"));
        assert!(report.contains("Total anchor force: 12.0 kN"));
        assert!(!report.contains("Skipped cables"));
    }

    #[test]
    fn groups_cables_by_kind() {
        let config = build(&BarrierParameters::default()).expect("default parameters build");
        let report = render_report(&config, &aggregate(&config));
        let retention = report
            .find("Retention cables (Rhs)")
            .expect("retention group");
        let catching = report.find("Catching cables (Fa)").expect("catching group");
        assert!(retention < catching);
        assert!(report.contains("no load cell"));
        let span = format!("{:.2} m", config.cables["fa1"].span());
        assert!(report.contains(&span));
    }

    #[test]
    fn mentions_dangling_cables() {
        let mut config = build(&BarrierParameters::default()).expect("default parameters build");
        config.supports.remove("s4");
        let report = render_report(&config, &aggregate(&config));
        assert!(report.contains("Skipped cables with missing endpoints"));
        assert!(report.contains("fa3"));
    }
}
