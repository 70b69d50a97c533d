use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use topology_canvas::config::{CONFIG_PATH_ENV, CanvasConfig};
use topology_canvas::doc::{DiagramStore, DocStore};
use topology_canvas::engine::EngineCore;
use topology_canvas::error::CanvasError;
use topology_canvas::geom::Point;
use topology_canvas::hit::{self, Hit};
use topology_canvas::render::NoIcons;
use topology_canvas::surface::RecordingSurface;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
    #[error("failed to encode draw call: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("node {0} is not in the snapshot")]
    UnknownNode(u64),
}

#[derive(Parser, Debug)]
#[command(name = "topology-canvas", about = "Render and hit-test topology diagram snapshots")]
struct Cli {
    /// Theme and link-exclusion config (JSON).
    #[arg(long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a snapshot and print the draw calls as JSON lines.
    Render {
        snapshot: PathBuf,
        #[arg(long, default_value_t = 800.0)]
        width: f64,
        #[arg(long, default_value_t = 600.0)]
        height: f64,
        /// Node to draw as selected.
        #[arg(long)]
        select: Option<u64>,
        /// Node to draw as hovered.
        #[arg(long)]
        hover: Option<u64>,
    },
    /// Print the entity under a point.
    Hit { snapshot: PathBuf, x: f64, y: f64 },
}

fn main() {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "command failed");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => CanvasConfig::from_path(path)?,
        None => CanvasConfig::default(),
    };
    let mut out = io::stdout().lock();

    match cli.command {
        Command::Render { snapshot, width, height, select, hover } => {
            let store = DocStore::from_path(&snapshot)?;
            let mut core = EngineCore::with_store(store).with_config(&config);
            for id in [select, hover].into_iter().flatten() {
                if core.store.node(id).is_none() {
                    return Err(CliError::UnknownNode(id));
                }
            }
            core.ui.selected_id = select;
            core.ui.hovered_id = hover;
            core.set_viewport(width, height, 1.0);

            let mut surface = RecordingSurface::new();
            core.render(&mut surface, &NoIcons)?;
            for call in surface.calls() {
                writeln!(out, "{}", serde_json::to_string(call)?)?;
            }
            tracing::info!(calls = surface.calls().len(), "rendered snapshot");
        }
        Command::Hit { snapshot, x, y } => {
            let store = DocStore::from_path(&snapshot)?;
            match hit::hit_test(&store, Point::new(x, y)) {
                Some(Hit::Node(id)) => {
                    let name = store.node(id).map_or("", |n| n.name.as_str());
                    writeln!(out, "node {id} {name}")?;
                }
                Some(Hit::Bus(id)) => {
                    let name = store.bus(id).map_or("", |b| b.name.as_str());
                    writeln!(out, "bus {id} {name}")?;
                }
                None => writeln!(out, "none")?,
            }
        }
    }
    Ok(())
}
