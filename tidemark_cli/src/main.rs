// CLI entry point for the Tidemark level generator.
//
// Loads constraints (a JSON file, or defaults), applies command-line
// overrides, runs the pipeline on the background worker, and prints a
// summary of the ranked candidates. `--preview` draws the best candidate
// over the terrain; `--json` prints the candidates and the run report as
// JSON instead of the text summary. Log verbosity follows `RUST_LOG`
// (e.g. `RUST_LOG=tidemark::ga=debug`).
//
// Usage:
//   tidemark [OPTIONS]
//     --constraints <PATH>    JSON constraints file (default: built-in defaults)
//     --seed <N>              Seed; 0 or absent draws one from the clock
//     --difficulty <1-10>     Override difficulty
//     --width <N>             Override map width
//     --height <N>            Override map height
//     --temperature <C>       Weather: temperature in °C
//     --weather-code <CODE>   Weather: condition code (default: 800, clear)
//     --top <N>               Candidates listed in the summary (default: 5)
//     --preview               Draw the best candidate over the terrain
//     --json                  Print JSON instead of the text summary

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tidemark_gen::config::Constraints;
use tidemark_gen::pipeline::GeneratedLevel;
use tidemark_gen::types::TileState;
use tidemark_gen::weather::WeatherSample;
use tidemark_gen::worker::spawn_generation;

#[derive(Parser, Debug)]
#[command(author, version, about = "Procedural 2D level generator", long_about = None)]
struct Cli {
    /// JSON constraints file; missing fields take their defaults.
    #[arg(long)]
    constraints: Option<PathBuf>,

    /// Seed for a reproducible run. 0 means unseeded.
    #[arg(long)]
    seed: Option<u64>,

    /// Difficulty, 1 (easiest) to 10.
    #[arg(long)]
    difficulty: Option<u32>,

    #[arg(long)]
    width: Option<i32>,

    #[arg(long)]
    height: Option<i32>,

    /// Observed temperature in °C. Enables the weather input.
    #[arg(long)]
    temperature: Option<f64>,

    /// Observed weather condition code.
    #[arg(long, default_value_t = 800)]
    weather_code: u32,

    /// Number of candidates listed in the summary.
    #[arg(long, default_value_t = 5)]
    top: usize,

    /// Draw the best candidate over an ASCII rendering of the terrain.
    #[arg(long)]
    preview: bool,

    /// Emit JSON instead of the text summary.
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let constraints = match load_constraints(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let weather = cli.temperature.map(|temperature_c| WeatherSample {
        temperature_c,
        condition_code: cli.weather_code,
    });

    let handle = match spawn_generation(constraints, weather) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Failed to start generation worker: {e}");
            process::exit(1);
        }
    };
    let level = match handle.wait() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Generation failed: {e}");
            process::exit(1);
        }
    };

    if cli.json {
        print_json(&level);
    } else {
        print_summary(&level, cli.top);
        if cli.preview {
            let tiles = level.best().map(|c| c.tiles.as_slice()).unwrap_or(&[]);
            println!();
            print!("{}", level.heightmap.ascii_preview_with(tiles));
        }
    }
}

/// Defaults or the constraints file, with command-line overrides applied and
/// the result validated.
fn load_constraints(cli: &Cli) -> Result<Constraints, tidemark_gen::error::ConstraintsError> {
    let mut constraints = match &cli.constraints {
        Some(path) => Constraints::from_file(path)?,
        None => Constraints::default(),
    };
    if let Some(seed) = cli.seed {
        constraints.seed = Some(seed);
    }
    if let Some(difficulty) = cli.difficulty {
        constraints.difficulty = difficulty;
    }
    if let Some(width) = cli.width {
        constraints.map_width = width;
    }
    if let Some(height) = cli.height {
        constraints.map_height = height;
    }
    constraints.validate()?;
    Ok(constraints)
}

fn print_summary(level: &GeneratedLevel, top: usize) {
    let map = &level.heightmap;
    let report = &level.report;
    println!("Seed:        {}", level.seed);
    println!(
        "Terrain:     {}x{}, water level {:.2}, {} cells above water",
        map.width, map.height, map.water_level, map.above_water
    );
    println!(
        "Evolution:   {} generations in {} ms, stopped by {:?}",
        report.generations, report.elapsed_ms, report.termination
    );
    println!(
        "Mean:        {:.3} initial -> {:.3} final",
        report.initial_mean,
        report.final_mean()
    );
    println!();
    println!("rank  fitness  tiles  objectives  enemies  obstacles  items");
    for (rank, candidate) in level.candidates.iter().take(top).enumerate() {
        println!(
            "{:>4}  {:>7.3}  {:>5}  {:>10}  {:>7}  {:>9}  {:>5}",
            rank + 1,
            candidate.fitness,
            candidate.len(),
            candidate.count(TileState::Objective),
            candidate.count(TileState::Enemy),
            candidate.count(TileState::Obstacle),
            candidate.count(TileState::Item),
        );
    }
}

fn print_json(level: &GeneratedLevel) {
    let out = serde_json::json!({
        "seed": level.seed,
        "width": level.heightmap.width,
        "height": level.heightmap.height,
        "water_level": level.heightmap.water_level,
        "report": level.report,
        "candidates": level.candidates,
    });
    match serde_json::to_string_pretty(&out) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Failed to encode result: {e}");
            process::exit(1);
        }
    }
}
