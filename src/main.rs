//! Netdeck - netlist compiler and simulation runner
//!
//! Compiles an editor circuit document, runs it through the engine and
//! prints the labeled outcome as JSON.
//!
//! # Usage
//!
//! ```bash
//! netdeck circuit.json > outcome.json
//! netdeck circuit.json --emit-deck
//! netdeck circuit.json --raw-output saved.log
//! RUST_LOG=netdeck_core=debug netdeck circuit.json --engine /opt/ngspice/bin/ngspice
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use netdeck_core::{
    compile,
    error::{NetdeckError, Result},
    simulate, BatchEngine, CancelToken, Circuit, RecordedOutput, SimulationConfig,
    SimulationEngine,
};

/// Compile a circuit, simulate it and print the outcome
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the circuit document (.json)
    #[arg(value_name = "CIRCUIT_JSON")]
    circuit_file: PathBuf,

    /// JSON configuration file; omitted fields keep their defaults
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Engine executable (overrides the configuration)
    #[arg(long, value_name = "PATH")]
    engine: Option<String>,

    /// Engine timeout in seconds (overrides the configuration)
    #[arg(long, value_name = "SECONDS")]
    timeout_secs: Option<f64>,

    /// Print the compiled deck and exit
    #[arg(long)]
    emit_deck: bool,

    /// Decode a saved engine output instead of running the engine
    #[arg(long, value_name = "FILE")]
    raw_output: Option<PathBuf>,
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| NetdeckError::FileReadError {
        path: path.display().to_string(),
        source,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let circuit = Circuit::from_json(&read_file(&args.circuit_file)?)?;

    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_json(&read_file(path)?)?,
        None => SimulationConfig::default(),
    };
    if let Some(executable) = args.engine {
        config.engine.executable = executable;
    }
    if let Some(seconds) = args.timeout_secs {
        let timeout = Duration::try_from_secs_f64(seconds).map_err(|e| NetdeckError::InvalidConfig {
            message: format!("--timeout-secs: {e}"),
        })?;
        config.engine = config.engine.with_timeout(timeout);
    }

    let mut stdout = io::stdout().lock();

    if args.emit_deck {
        let deck = compile(&circuit, &config.analysis);
        for diagnostic in deck.diagnostics() {
            eprintln!("warning: {diagnostic}");
        }
        stdout.write_all(deck.to_text().as_bytes())?;
        return Ok(());
    }

    let engine: Box<dyn SimulationEngine> = match &args.raw_output {
        Some(path) => Box::new(RecordedOutput::new(read_file(path)?)),
        None => Box::new(BatchEngine::new(config.engine.clone())),
    };

    let outcome = simulate(&circuit, engine.as_ref(), &config, &CancelToken::new());
    serde_json::to_writer_pretty(&mut stdout, &outcome).map_err(io::Error::from)?;
    writeln!(stdout)?;
    stdout.flush()?;

    if !outcome.success {
        std::process::exit(1);
    }
    Ok(())
}
