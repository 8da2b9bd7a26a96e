use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use landmass_app::{
    AppDirs, AppError, HeadlessSink, PathKind, PreviewMode, RunOptions, ViewerPath, headless,
    preview,
};
use landmass_config::{CliArgs, Config};
use landmass_streaming::{ChunkManager, GeneratorSettings};

/// Ticks between config file polls with `--watch`.
const RELOAD_INTERVAL: u64 = 60;

#[derive(Parser, Debug)]
#[command(name = "landmass", version, about = "Landmass terrain generator")]
struct Cli {
    #[command(flatten)]
    overrides: CliArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stream terrain headlessly along a scripted viewer path.
    Run {
        /// Number of 60 Hz ticks to simulate.
        #[arg(long, default_value_t = 600)]
        ticks: u64,
        #[arg(long, value_enum, default_value_t = PathKind::Orbit)]
        path: PathKind,
        /// Viewer speed in world units per second.
        #[arg(long, default_value_t = 120.0)]
        speed: f64,
        /// Orbit radius in world units.
        #[arg(long, default_value_t = 600.0)]
        radius: f64,
        /// Poll `config.ron` and restream on change.
        #[arg(long)]
        watch: bool,
    },
    /// Render the chunk at the origin to a PNG.
    Preview {
        #[arg(long, value_enum, default_value_t = PreviewMode::Colour)]
        mode: PreviewMode,
        /// Mesh LOD for `--mode mesh` (defaults to `mesh.preview_lod`).
        #[arg(long)]
        lod: Option<u32>,
        /// Output file (defaults to the preview directory).
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let dirs = AppDirs::resolve(cli.overrides.config.as_deref());

    let on_disk = match Config::load_or_create(&dirs.config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut config = on_disk.clone();
    config.apply_cli_overrides(&cli.overrides);

    let log_dir = match dirs.create_dirs() {
        Ok(()) => Some(dirs.log_dir.as_path()),
        Err(e) => {
            eprintln!("{e}, logging to console only");
            None
        }
    };
    landmass_log::init_logging(log_dir, cfg!(debug_assertions), Some(&config));

    let command = cli.command.unwrap_or(Command::Run {
        ticks: 600,
        path: PathKind::Orbit,
        speed: 120.0,
        radius: 600.0,
        watch: false,
    });

    let result = match command {
        Command::Run {
            ticks,
            path,
            speed,
            radius,
            watch,
        } => {
            let options = RunOptions {
                ticks,
                path: ViewerPath::new(path, speed, radius),
                log_every: RELOAD_INTERVAL,
                settle: true,
            };
            run(&config, options, watch.then_some((&dirs, on_disk, &cli.overrides)))
        }
        Command::Preview { mode, lod, out } => {
            let lod = lod.unwrap_or(config.mesh.preview_lod);
            let out = out.unwrap_or_else(|| dirs.preview_path(default_preview_name(mode)));
            export_preview(&config, mode, lod, &out)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(
    config: &Config,
    options: RunOptions,
    watch: Option<(&AppDirs, Config, &CliArgs)>,
) -> Result<(), AppError> {
    let mut manager = ChunkManager::initialize(config, HeadlessSink::default())?;

    let mut watch = watch;
    headless::run(&mut manager, options, |manager, tick| {
        let Some((dirs, on_disk, overrides)) = watch.as_mut() else {
            return;
        };
        if tick % RELOAD_INTERVAL != 0 {
            return;
        }
        match on_disk.reload(&dirs.config_dir) {
            Ok(Some(reloaded)) => {
                let mut effective = reloaded.clone();
                effective.apply_cli_overrides(overrides);
                if let Err(e) = manager.on_config_changed(&effective) {
                    tracing::warn!("Ignoring reloaded config: {e}");
                }
                *on_disk = reloaded;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Config reload failed: {e}"),
        }
    });

    let sink = manager.into_sink();
    tracing::info!(
        textures = sink.textures_built(),
        meshes = sink.meshes_applied(),
        shown = sink.shown(),
        released = sink.released(),
        "sink totals"
    );
    Ok(())
}

fn default_preview_name(mode: PreviewMode) -> &'static str {
    match mode {
        PreviewMode::Noise => "noise.png",
        PreviewMode::Colour => "colour.png",
        PreviewMode::Mesh => "mesh.png",
    }
}

fn export_preview(
    config: &Config,
    mode: PreviewMode,
    lod: u32,
    out: &std::path::Path,
) -> Result<(), AppError> {
    let settings = GeneratorSettings::from_config(config)?;
    let rendered = preview::render_preview(&settings, mode, lod)?;
    preview::save_png(&rendered.texture, out)?;
    println!("{}", out.display());
    Ok(())
}
