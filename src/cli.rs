use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "clipscene", about = "Music-synchronized scene structure generator")]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG, AAC)
    pub input: PathBuf,

    /// Write the JSON result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file (defaults to clipscene.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Virtual track length in seconds; analysis still covers the full file
    #[arg(short, long)]
    pub duration: Option<f32>,

    /// Seed for reproducible scene schedules
    #[arg(long)]
    pub seed: Option<u64>,

    /// Creative brief forwarded to prompt writers
    #[arg(short, long)]
    pub brief: Option<String>,

    /// Minimum number of scenes
    #[arg(long)]
    pub min_scenes: Option<usize>,

    /// Maximum number of scenes
    #[arg(long)]
    pub max_scenes: Option<usize>,

    /// Scenes per 4-beat measure
    #[arg(long)]
    pub density: Option<f32>,

    /// Skip audio analysis and use the fixed fallback features
    #[arg(long)]
    pub degraded: bool,

    /// Log a human-readable summary of the schedule
    #[arg(long)]
    pub summary: bool,
}
