//! Runs a single soil ecology simulation and logs population summaries.

mod config;
mod telemetry;

use anyhow::Result;
use config::{RunnerConfig, SEED_ENV};
use humus_core::{DeathCause, OrganismKind};
use humus_world::{RunUntil, Simulation, WorldSnapshot};
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<()> {
    telemetry::init_telemetry()?;

    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => {
            info!(path = %path.display(), "Loading runner config");
            RunnerConfig::from_file(&path)?
        }
        None => RunnerConfig::default(),
    };
    let config = config.with_seed_override(std::env::var(SEED_ENV).ok().as_deref())?;

    info!(
        seed = config.simulation.seed,
        end_tick = config.end_tick,
        width = config.simulation.world.width,
        height = config.simulation.world.height,
        "Starting Humus simulation"
    );

    let report_interval = config.report_interval;
    let mut simulation = Simulation::new(config.simulation)?;
    let result = simulation.run_with(RunUntil::Tick(config.end_tick), |snapshot| {
        if report_interval > 0 && snapshot.tick % report_interval == 0 {
            report(snapshot);
        }
    })?;

    for kind in OrganismKind::all() {
        let tally = result.stats.tally(kind);
        record_counter!(
            "births",
            tally.births,
            kind = %kind
        );
        record_counter!(
            "starvation_deaths",
            tally.deaths_by(DeathCause::Starvation),
            kind = %kind
        );
    }

    info!(
        total_ticks = result.total_ticks,
        population = result.snapshot.population().values().sum::<usize>(),
        births = result.stats.total_births(),
        deaths = result.stats.total_deaths(),
        plant_matter = result.snapshot.totals.plant_matter,
        tree_matter = result.snapshot.totals.tree_matter,
        "Simulation finished"
    );

    Ok(())
}

fn report(snapshot: &WorldSnapshot) {
    for kind in OrganismKind::all() {
        record_gauge!(
            "population",
            snapshot.count_of(kind),
            kind = %kind,
            tick = snapshot.tick
        );
    }
}
