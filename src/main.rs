//! Simulator entry point: CLI wiring and config-driven runner construction.

mod cli;

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use grid_battery_sim::config::ScenarioConfig;
use grid_battery_sim::io::export::{append_csv, export_csv, export_records};
use grid_battery_sim::io::import::read_records;
use grid_battery_sim::logging;
use grid_battery_sim::sim::summary::SimulationSummary;
use grid_battery_sim::sim::types::{EnergyRecord, OutputRow};
use grid_battery_sim::source::SyntheticSource;

fn load_config(opts: &cli::CliOptions) -> Result<(ScenarioConfig, String)> {
    let (mut cfg, label) = match (&opts.scenario, &opts.preset) {
        (Some(path), _) => (
            ScenarioConfig::from_toml_file(path)?,
            path.display().to_string(),
        ),
        (None, Some(name)) => (ScenarioConfig::from_preset(name)?, name.clone()),
        (None, None) => (ScenarioConfig::default(), "default".to_string()),
    };

    if let Some(seed) = opts.seed {
        cfg.generator.seed = seed;
    }

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            warn!("{e}");
        }
        bail!("scenario \"{label}\" has {} configuration error(s)", errors.len());
    }

    Ok((cfg, label))
}

fn load_series(opts: &cli::CliOptions, cfg: &ScenarioConfig) -> Result<Vec<EnergyRecord>> {
    let records = match &opts.input {
        Some(path) => read_records(path)
            .with_context(|| format!("failed to read input series {}", path.display()))?,
        None => SyntheticSource::new(&cfg.generator)?.collect(),
    };

    if let Some(path) = &opts.series_out {
        export_records(&records, path)
            .with_context(|| format!("failed to save input series {}", path.display()))?;
    }

    Ok(records)
}

fn write_output(opts: &cli::CliOptions, rows: &[OutputRow], path: &Path) -> Result<()> {
    if opts.append {
        append_csv(rows, path)?;
    } else {
        export_csv(rows, path)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let opts = match cli::parse_args() {
        Ok(opts) => opts,
        Err(msg) => {
            cli::print_usage();
            bail!(msg);
        }
    };
    if opts.help {
        cli::print_usage();
        return Ok(());
    }

    logging::init(opts.verbose);

    let (cfg, label) = load_config(&opts)?;
    let records = load_series(&opts, &cfg)?;
    info!(scenario = %label, records = records.len(), "loaded scenario");

    let runner = cfg.build_runner()?;
    let (rows, failure) = runner.run_until_error(records);

    // Rows emitted before an abort are still written and summarised.
    if let Some(path) = &opts.output {
        write_output(&opts, &rows, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    let summary = SimulationSummary::from_rows(&rows);
    println!("{summary}");

    if let Some(err) = failure {
        return Err(anyhow::Error::from(err)
            .context(format!("simulation aborted after {} row(s)", rows.len())));
    }

    #[cfg(feature = "api")]
    if opts.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        use grid_battery_sim::api::{self, AppState};

        let state = Arc::new(AppState {
            scenario: label,
            summary,
            rows,
        });
        let addr = SocketAddr::from(([127, 0, 0, 1], opts.port));
        tokio::runtime::Runtime::new()?.block_on(api::serve(state, addr))?;
    }

    Ok(())
}
