use clap::Parser;
use gridtop::core::config::{self, ConfigError, LayoutConfig};
use gridtop::core::group::CellGroup;
use gridtop::surface::Surface;
use gridtop::tui;
use gridtop::widgets::default_registry;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gridtop", about = "Grid-layout terminal dashboard")]
struct Args {
    /// Layout file (TOML, or JSON with a .json extension)
    #[arg(short, long)]
    layout: Option<PathBuf>,

    /// Milliseconds between redraws
    #[arg(short, long)]
    interval: Option<u64>,
}

fn load_group(args: &Args) -> Result<(CellGroup, std::time::Duration), ConfigError> {
    let file = match config::find_layout(args.layout.as_deref()) {
        Some(path) => config::load_layout(&path)?,
        None => LayoutConfig::default(),
    };
    let resolved = config::resolve(&file, args.interval)?;
    let registry = default_registry();
    let group = CellGroup::from_layout(&resolved.layout, &registry, resolved.glyphs)?;
    Ok((group, resolved.interval))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // stdout is the drawing surface, so logs go to gridtop.log in the current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("gridtop.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    log::info!("Gridtop starting up");

    let (group, interval) = match load_group(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("Startup failed: {}", e);
            eprintln!("gridtop: {e}");
            std::process::exit(1);
        }
    };

    tui::run(group, Surface::stdout(), interval).await?;
    log::info!("Gridtop shut down cleanly");
    Ok(())
}
