//! topoview - Entry Point

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::mpsc;
use topoview::model::{NodeId, Size};
use topoview::view::{ColorConfig, RunOptions, SceneStyles};
use topoview::view_state::Easing;
use tracing::info;

/// Output format of `--dump`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DumpFormat {
    /// Recorded scene as pretty JSON.
    Json,
    /// One line per rendered node.
    Text,
}

/// topoview - pannable topology diagram viewer
#[derive(Parser, Debug)]
#[command(name = "topoview")]
#[command(version)]
#[command(about = "Terminal viewer for hierarchical topology diagrams")]
pub struct Args {
    /// Path to the JSON topology document (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Do not render the root node
    #[arg(long)]
    pub hide_root: bool,

    /// Pan easing curve (linear, ease-in-out, ease-out-cubic)
    #[arg(long)]
    pub easing: Option<Easing>,

    /// Select this node id on startup
    #[arg(long, value_parser = parse_node_id)]
    pub select: Option<NodeId>,

    /// Print the recorded scene instead of opening the viewer
    #[arg(long, value_enum)]
    dump: Option<DumpFormat>,

    /// Surface size for --dump, as WIDTHxHEIGHT in pixels
    #[arg(long, default_value = "1280x800", value_parser = parse_size)]
    pub size: Size,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,
}

fn parse_node_id(raw: &str) -> Result<NodeId, String> {
    NodeId::new(raw).map_err(|e| e.to_string())
}

fn parse_size(raw: &str) -> Result<Size, String> {
    let (width, height) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {raw:?}"))?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
            .ok_or_else(|| format!("invalid dimension {value:?}"))
    };
    Ok(Size::new(parse(width)?, parse(height)?))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration with full precedence chain:
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = topoview::config::load_config_with_precedence(args.config.clone())?;
        let merged = topoview::config::merge_config(config_file);
        let with_env = topoview::config::apply_env_overrides(merged);
        let show_root_override = if args.hide_root { Some(false) } else { None };
        topoview::config::apply_cli_overrides(with_env, show_root_override, args.easing)
    };

    let (status_tx, status_rx) = mpsc::channel();
    let interactive = args.dump.is_none();
    topoview::logging::init(&config.log_file_path, interactive.then_some(status_tx))?;

    info!(
        config = ?config,
        file = ?args.file,
        "Starting topoview"
    );

    let document = topoview::source::load_document(args.file.clone())?;

    match args.dump {
        Some(format) => {
            let scene = topoview::view::build_scene(&document, &config, args.size, args.select)?;
            match format {
                DumpFormat::Json => println!("{}", serde_json::to_string_pretty(&scene)?),
                DumpFormat::Text => print!("{}", scene.to_text()),
            }
        }
        None => {
            let options = RunOptions {
                selection: args.select,
                styles: SceneStyles::with_color_config(ColorConfig::from_env_and_args(
                    args.no_color,
                )),
                status: Some(status_rx),
            };
            topoview::view::run(&document, &config, options)?;
        }
    }

    Ok(())
}
