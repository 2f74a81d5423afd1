//! Canvas Placer CLI
//!
//! Usage:
//!   canvas-placer [OPTIONS] [FILE]
//!
//! Options:
//!   -c, --config <FILE>     Placement configuration (TOML format)
//!   -n, --candidates <N>    Print the top N ranked candidates instead of one placement
//!   --grid                  Print the spatial density grid to stderr
//!   --space                 Print the free-space analysis to stderr
//!   -v, --verbose           Debug logging on stderr
//!   -h, --help              Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use canvas_placer::placement::{SpaceAnalyzer, SpatialGrid};
use canvas_placer::{parse_request, PlacementConfig, PlacementEngine};

/// Exit status for requests that fail to decode or validate
const EXIT_BAD_REQUEST: i32 = 2;

#[derive(Parser)]
#[command(name = "canvas-placer")]
#[command(about = "Deterministic element placement for design canvases")]
struct Cli {
    /// JSON request file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Placement configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the top N ranked candidates as JSON
    #[arg(short = 'n', long, value_name = "N")]
    candidates: Option<usize>,

    /// Print the spatial density grid to stderr
    #[arg(long)]
    grid: bool,

    /// Print the free-space analysis to stderr
    #[arg(long)]
    space: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "canvas_placer=debug"
    } else {
        "canvas_placer=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let config = match &cli.config {
        Some(path) => match PlacementConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => PlacementConfig::default(),
    };

    let source = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let query = match parse_request(&source) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_BAD_REQUEST);
        }
    };

    let engine = PlacementEngine::new(config);

    if cli.grid || cli.space {
        let grid = SpatialGrid::with_elements(
            query.canvas,
            engine.config().grid_size,
            query.elements.clone(),
        );
        if cli.grid {
            eprintln!("{}", grid.visual_summary());
        }
        if cli.space {
            let analyzer = SpaceAnalyzer::new(
                &grid,
                query.containment,
                query.obstacle,
                &engine.config().space,
                engine.rules(),
            );
            eprintln!("{}", analyzer.summary());
        }
    }

    let output = match cli.candidates {
        Some(n) => match engine.rank(&query) {
            Ok(mut candidates) => {
                candidates.truncate(n);
                serde_json::to_string_pretty(&candidates)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                let code = if e.is_input_error() {
                    EXIT_BAD_REQUEST
                } else {
                    1
                };
                std::process::exit(code);
            }
        },
        None => serde_json::to_string_pretty(&engine.place(&query)),
    };

    match output {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error encoding response: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_intro() {
    println!(
        r#"Canvas Placer - Deterministic element placement for design canvases

USAGE:
    canvas-placer [OPTIONS] [FILE]
    echo '<json>' | canvas-placer

OPTIONS:
    -c, --config <FILE>    Placement configuration (TOML file)
    -n, --candidates <N>   Print the top N ranked candidates
    --grid                 Print the spatial density grid to stderr
    --space                Print the free-space analysis to stderr
    -v, --verbose          Debug logging on stderr
    -h, --help             Print help

REQUEST:
    {{
      "canvas_size": {{"w": 1080, "h": 1920}},
      "elements": [{{"id": "hero", "type": "image", "x": 140, "y": 400, "width": 800, "height": 900}}],
      "element_to_place": {{"type": "headline", "width": 600, "height": 120}},
      "obstacle_bounds": {{"x": 140, "y": 400, "width": 800, "height": 900}}
    }}

RESPONSE:
    {{"x": <int>, "y": <int>, "confidence": <0.0-1.0>, "reasoning": "<method> placement (score: <s>). ..."}}

EXIT STATUS:
    0  placement printed (possibly the fallback position)
    1  config, I/O or internal error
    2  malformed or invalid request"#
    );
}
