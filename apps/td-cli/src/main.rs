use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use td_sim::{EngineConfig, SimResult, StateSnapshot, ThermodynamicEngine, displacement};
use tracing::info;
use uom::si::{
    energy::joule, length::meter, pressure::pascal, thermodynamic_temperature::kelvin, time::second,
    volume::liter,
};

#[derive(Parser)]
#[command(name = "td-cli")]
#[command(about = "Thermodyn CLI - gas chamber heat/expand/cool/compress cycle", long_about = None)]
struct Cli {
    /// Number of full cycles to run
    #[arg(default_value_t = 1)]
    iterations: usize,
    /// Initial volume in m³
    #[arg(long, default_value_t = 0.01)]
    volume: f64,
    /// Initial pressure in Pa
    #[arg(long, default_value_t = td_core::constants::P_ATM_PA)]
    pressure: f64,
    /// Initial temperature in K
    #[arg(long, default_value_t = 300.0)]
    temperature: f64,
    /// Pressure multiplier for isometric heating (and divisor for cooling)
    #[arg(long, default_value_t = 1.2)]
    coefficient: f64,
    /// Engine configuration YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
}

#[derive(Serialize)]
struct Row<'a> {
    phase: &'a str,
    displacement_m: f64,
    #[serde(flatten)]
    state: StateSnapshot,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load_yaml(path)?,
        None => EngineConfig::default(),
    };

    let mut engine =
        ThermodynamicEngine::with_config(cli.volume, cli.pressure, cli.temperature, config)?;

    if matches!(cli.format, Format::Table) {
        println!("phase\ttime(s)\tvolume(L)\tpressure(Pa)\ttemperature(K)\twork(J)\tpiston(m)");
    }
    emit(cli.format, "initial", &engine)?;

    for i in 0..cli.iterations {
        info!(cycle = i + 1, "starting cycle");
        run_cycle(&mut engine, cli.coefficient, cli.format)?;
    }

    let last = engine.dispose();
    info!(
        elapsed_s = last.time_s,
        work_done_j = last.work_done_j,
        "cycles complete"
    );
    Ok(())
}

/// Heat, expand, cool, compress.
fn run_cycle(
    engine: &mut ThermodynamicEngine,
    coefficient: f64,
    format: Format,
) -> Result<(), Box<dyn std::error::Error>> {
    let p = engine.pressure();
    step(engine.update_pressure_isometric(p * coefficient))?;
    emit(format, "heat", engine)?;

    step(engine.relax_to_equilibrium().map(|_| ()))?;
    emit(format, "expand", engine)?;

    let p = engine.pressure();
    step(engine.update_pressure_isometric(p / coefficient))?;
    emit(format, "cool", engine)?;

    step(engine.relax_to_equilibrium().map(|_| ()))?;
    emit(format, "compress", engine)?;
    Ok(())
}

fn step(result: SimResult<()>) -> Result<(), Box<dyn std::error::Error>> {
    result.map_err(|e| {
        tracing::error!(error = %e, "engine step failed");
        e.into()
    })
}

fn emit(
    format: Format,
    phase: &str,
    engine: &ThermodynamicEngine,
) -> Result<(), Box<dyn std::error::Error>> {
    let snap = engine.snapshot();
    let piston = displacement(engine.state()).get::<meter>();
    match format {
        Format::Table => println!(
            "{}\t{:.4}\t{:.3}\t{:.0}\t{:.1}\t{:.2}\t{:.4}",
            phase,
            snap.time().get::<second>(),
            snap.volume().get::<liter>(),
            snap.pressure().get::<pascal>(),
            snap.temperature().get::<kelvin>(),
            snap.work_done().get::<joule>(),
            piston,
        ),
        Format::Json => println!(
            "{}",
            serde_json::to_string(&Row {
                phase,
                displacement_m: piston,
                state: snap,
            })?
        ),
    }
    Ok(())
}
