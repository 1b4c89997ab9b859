mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

use clipscene::audio::{AudioSource, FeatureExtractor};
use clipscene::config::{self, Config};
use clipscene::pipeline::Pipeline;
use clipscene::scenes::{SceneScheduler, SceneSummary};

use cli::Cli;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let mut config = Config::default();
    if let Some(path) = config::find_config_path(cli.config.as_deref()) {
        match config::load_config(&path) {
            Ok(cfg) => {
                log::info!("Loaded config from {}", path.display());
                config = cfg;
            }
            Err(err) => log::warn!("{:#}", err),
        }
    }

    // CLI flags override the config file
    if let Some(min) = cli.min_scenes {
        config.scenes.min_scenes = min;
    }
    if let Some(max) = cli.max_scenes {
        config.scenes.max_scenes = max;
    }
    if let Some(density) = cli.density {
        config.scenes.density_factor = density;
    }

    if !cli.input.exists() {
        anyhow::bail!("Input file not found: {}", cli.input.display());
    }

    log::info!("clipscene - music to scene structure");
    log::info!("Input: {}", cli.input.display());
    if let Some(duration) = cli.duration {
        log::info!("Virtual duration: {:.2}s", duration);
    }

    let scheduler =
        SceneScheduler::new(config.scenes).context("Invalid scene configuration")?;
    let extractor = if cli.degraded {
        FeatureExtractor::null()
    } else {
        FeatureExtractor::spectral(config.analysis)
    };

    let mut rng = match cli.seed {
        Some(seed) => {
            log::info!("Seed: {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    // 1. Analyze audio and schedule scenes
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("[{elapsed_precise}] {spinner} {msg}")
            .context("Invalid progress template")?,
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Analyzing audio...");

    let pipeline = Pipeline::new(extractor, scheduler);
    let source = AudioSource::Path(cli.input.clone());
    let result = pipeline.run(&source, cli.duration, cli.brief.as_deref(), &mut rng);
    spinner.finish_and_clear();
    let output = result.context("Scene scheduling failed")?;

    let features = &output.features;
    if features.degraded {
        log::warn!("Scenes are based on degraded (fallback) analysis");
    }
    log::info!(
        "Features: {:.1}s, {:.1} BPM, {}, brightness {:.2}",
        features.duration,
        features.tempo,
        features.key,
        features.spectral.brightness
    );

    if cli.summary {
        log::info!("\n{}", SceneSummary::of(&output.structure));
    }

    // 2. Emit
    let json = serde_json::to_string_pretty(&output).context("Failed to serialize output")?;

    match cli.output {
        Some(ref path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            log::info!("Done! Output: {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
