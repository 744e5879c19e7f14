use std::process::ExitCode;

use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use clap::Parser;

use rust_mapgen::config::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use rust_mapgen::map_builders::get_builder_keys;
use rust_mapgen::{BuilderType, Map, MapGenConfig, MapGenError, MapGenPlugin};

#[derive(Parser, Debug)]
#[command(name = "rust-mapgen")]
#[command(about = "Generate procedural dungeon, cave, city and maze maps")]
struct Args {
    /// JSON config file; command line options override its values
    #[arg(short, long)]
    config: Option<String>,

    /// Builder to run (see --list)
    #[arg(short, long)]
    algorithm: Option<String>,

    /// Map width in tiles
    #[arg(short = 'W', long)]
    width: Option<i32>,

    /// Map height in tiles
    #[arg(short = 'H', long)]
    height: Option<i32>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// List the available builders and exit
    #[arg(long)]
    list: bool,

    /// Log generation details
    #[arg(short, long)]
    verbose: bool,
}

fn build_config(args: &Args) -> Result<MapGenConfig, MapGenError> {
    let mut config = match &args.config {
        Some(path) => Some(MapGenConfig::load(path)?),
        None => None,
    };

    if let Some(key) = &args.algorithm {
        let builder = BuilderType::from_key(key)?.default_settings();
        config = Some(match config {
            // Keep the file's parameters when it already selects this builder.
            Some(c) if c.builder.builder_type() == builder.builder_type() => c,
            Some(c) => MapGenConfig { builder, ..c },
            None => MapGenConfig::new(DEFAULT_WIDTH, DEFAULT_HEIGHT, builder),
        });
    }

    let mut config = config.ok_or(MapGenError::MissingBuilder)?;
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    config.validate()?;
    Ok(config)
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.list {
        for builder in BuilderType::ALL {
            println!("{:<20} {}", builder.key(), builder.name());
        }
        return ExitCode::SUCCESS;
    }

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            if matches!(e, MapGenError::UnknownBuilder(_) | MapGenError::MissingBuilder) {
                eprintln!("available builders: {}", get_builder_keys().join(", "));
            }
            return ExitCode::FAILURE;
        }
    };

    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    let mut app = App::new();
    app.add_plugins((
        LogPlugin {
            level,
            ..default()
        },
        MapGenPlugin { config },
    ));
    app.update();

    match app.world().get_resource::<Map>() {
        Some(map) => {
            print!("{}", map.to_ascii());
            ExitCode::SUCCESS
        }
        None => ExitCode::FAILURE,
    }
}
