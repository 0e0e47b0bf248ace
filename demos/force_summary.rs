use rockfall_barrier::{aggregate, apply, build, BarrierParameters, Field};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Start from the default barrier and steepen the terrain
    let resolution = apply(&BarrierParameters::default(), Field::Phi, 25.0);
    for warning in &resolution.warnings {
        println!("warning: {warning}");
    }

    // Make the posts longer; tau, theta and delta follow
    let resolution = apply(&resolution.params, Field::L, 6.0);
    for change in &resolution.changes {
        println!(
            "{}: {:.1} -> {:.1} ({:?})",
            change.field, change.previous, change.current, change.reason
        );
    }

    // Build the geometry and enter load cell readings in kN
    let mut barrier = build(&resolution.params)?;
    barrier.set_cable_force("rhs1", 18.5)?;
    barrier.set_cable_force("rhs5", 22.0)?;
    barrier.set_cable_force("tso_s1", 9.0)?;

    let forces = aggregate(&barrier);
    println!("Support S1 carries {:.1} kN", forces.force_at("s1"));
    println!("Total anchor force: {:.1} kN", forces.total_anchor_force);
    println!("Total support force: {:.1} kN", forces.total_support_force);

    Ok(())
}
