use anyhow::Result;
use tracing_subscriber::EnvFilter;

mod scenarios;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    scenarios::bee_time_series()?;
    scenarios::bee_phase_portraits()?;
    scenarios::bee_threshold_search()?;
    scenarios::housing_evolution()?;
    scenarios::housing_phase_portrait()?;
    scenarios::planar_paths()?;

    Ok(())
}
