mod config;
mod engine;
mod scene;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Env, Target};
use rand::SeedableRng;
use rand::rngs::StdRng;

use config::GameConfig;
use engine::terminal::TerminalSession;
use engine::{AudioOut, Game, Scene};
use scene::{EndlessScene, FiniteScene, Summary, Variant};

#[derive(Parser, Debug)]
#[command(about = "A minimal Flappy Bird scene in your terminal", version)]
struct Args {
    /// How pipes are managed once they scroll off screen.
    #[arg(long, value_enum, default_value_t = Variant::Endless)]
    variant: Variant,
    /// TOML file overriding the built-in settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding sky.png, bird.png and pipe.png.
    #[arg(long)]
    assets: Option<PathBuf>,
    /// Seed for pipe placement.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value = "flappy-scene.log")]
    log_file: PathBuf,
    /// Simulate this many seconds without a terminal and print a summary.
    #[arg(long, value_name = "SECONDS")]
    headless: Option<f64>,
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn launch<S: Scene + Summary>(scene: S, config: &GameConfig, args: &Args) -> Result<()> {
    let root = args.assets.as_deref().unwrap_or(config.assets.root.as_path());

    match args.headless {
        Some(seconds) => {
            let duration = Duration::try_from_secs_f64(seconds)
                .with_context(|| format!("invalid --headless duration {seconds}"))?;
            let mut game = Game::boot(&config.engine, root, scene, AudioOut::silent());
            game.simulate(duration);
            println!(
                "{} after {} frames ({:.0} ms, {} bodies)",
                game.scene().summary(),
                game.frames(),
                game.time_ms(),
                game.context().physics.len()
            );
            log::info!("{}", game.scene().summary());
        }
        None => {
            let audio = AudioOut::open(config.engine.audio);
            let mut game = Game::boot(&config.engine, root, scene, audio);
            let mut session = TerminalSession::enter()?;
            game.run(session.out())?;
            drop(session);
            log::info!("{}", game.scene().summary());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    log::info!(
        "starting {:?} variant, seed {:?}, {} pipe pairs",
        args.variant,
        args.seed,
        config.pipes.pairs
    );

    match args.variant {
        Variant::Endless => launch(EndlessScene::new(config.clone(), rng), &config, &args),
        Variant::Finite => launch(FiniteScene::new(config.clone(), rng), &config, &args),
    }
}
