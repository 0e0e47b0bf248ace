mod report;

use report::render_report;
use rockfall_barrier::{aggregate, build, BarrierConfig, BarrierParameters};
use std::error::Error;
use std::fs::File;
use std::io::BufReader;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // A saved configuration may be partial; missing sections fall back to
    // empty maps and default parameters.
    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading barrier configuration from {path}");
            BarrierConfig::from_reader(BufReader::new(File::open(&path)?))?
        }
        None => {
            log::info!("no configuration given, using the default barrier");
            build(&BarrierParameters::default())?
        }
    };

    // Rebuild when the stored geometry is missing but parameters are present.
    let config = if config.supports.is_empty() {
        let mut rebuilt = BarrierConfig::rebuild(&config.params)?;
        for (id, cable) in &config.cables {
            let carried = rebuilt
                .set_cable_force(id, cable.force)
                .and_then(|()| rebuilt.set_load_cell(id, cable.has_load_cell));
            if let Err(error) = carried {
                log::warn!("measurement for {id} not carried over: {error}");
            }
        }
        rebuilt
    } else {
        config
    };

    let result = aggregate(&config);
    println!("{}", render_report(&config, &result));

    Ok(())
}
