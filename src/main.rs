use gravbridge::{LogSink, Scenario, ScenarioConfig};

use anyhow::{Context, Result};
use clap::Parser;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Advance a bridged gravity scenario and log energy drift")]
struct Args {
    /// Scenario file; looked up in scenarios/ when not found as given
    #[arg(short, default_value = "binary.yaml")]
    file_name: String,

    /// End time, overrides the scenario
    #[arg(short)]
    t_end: Option<f64>,

    /// Reporting interval, overrides the scenario
    #[arg(long)]
    dt: Option<f64>,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let mut config_path = PathBuf::from(file_name);
    if !config_path.exists() {
        config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    }

    let file = File::open(&config_path)
        .with_context(|| format!("cannot open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg = ScenarioConfig::from_reader(reader)
        .with_context(|| format!("cannot parse scenario {}", config_path.display()))?;

    log::debug!("{:?}", scenario_cfg);

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut scenario_cfg = load_scenario_from_yaml(&args.file_name)?;

    if let Some(t_end) = args.t_end {
        scenario_cfg.bridge.t_end = t_end;
    }
    if let Some(dt) = args.dt {
        scenario_cfg.bridge.report_interval = dt;
    }

    let mut scenario = Scenario::build_scenario(scenario_cfg)?;
    let summary = scenario.run(&mut LogSink::default())?;

    log::info!(
        "done: t = {}, {} reports, max |dE/E| = {:.3e}",
        summary.model_time,
        summary.reports,
        summary.max_abs_drift
    );

    Ok(())
}
