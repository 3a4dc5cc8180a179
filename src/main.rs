use gravsim::{bench_attract, bench_step, Scenario, ScenarioConfig, Simulation};

use clap::Parser;
use anyhow::Result;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short, default_value = "disc.yaml")]
    file_name: String,

    /// Number of steps to advance
    #[arg(long, default_value_t = 1000)]
    frames: u64,

    /// Run the timing sweeps instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(file_name);
    let file = File::open(&config_path)?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    if args.bench {
        bench_attract();
        bench_step();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let scenario = Scenario::build(scenario_cfg)?;

    let mut sim = Simulation::new(scenario.parameters, scenario.system);

    let start = Instant::now();
    for _ in 0..args.frames {
        sim.step();
        if sim.frame % 100 == 0 {
            log::info!(
                "frame {}: {} bodies, t = {:.3}",
                sim.frame,
                sim.bodies().len(),
                sim.system.t
            );
        }
    }

    let elapsed = start.elapsed();
    println!(
        "{} frames in {:.2?} ({:.2} ms/frame), {} bodies remaining",
        args.frames,
        elapsed,
        elapsed.as_secs_f64() * 1e3 / args.frames.max(1) as f64,
        sim.bodies().len()
    );

    Ok(())
}
