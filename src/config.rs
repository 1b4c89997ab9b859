use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::scenes::{BoundaryMatch, Transition};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub scenes: SceneConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_energy_chunks")]
    pub energy_chunks: usize,
    #[serde(default = "default_max_beats")]
    pub max_beats: usize,
    #[serde(default = "default_max_structural_segments")]
    pub max_structural_segments: usize,
    #[serde(default = "default_brightness_ceiling_hz")]
    pub brightness_ceiling_hz: f32,
    #[serde(default = "default_min_boundary_gap_secs")]
    pub min_boundary_gap_secs: f32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_low_energy_duration")]
    pub low_energy_duration: f32,
    #[serde(default = "default_mid_energy_duration")]
    pub mid_energy_duration: f32,
    #[serde(default = "default_high_energy_duration")]
    pub high_energy_duration: f32,
    #[serde(default = "default_min_scenes")]
    pub min_scenes: usize,
    #[serde(default = "default_max_scenes")]
    pub max_scenes: usize,
    /// Scenes per 4-beat measure on average
    #[serde(default = "default_density_factor")]
    pub density_factor: f32,
    /// Relative duration jitter, applied as U(1 - jitter, 1 + jitter)
    #[serde(default = "default_jitter")]
    pub jitter: f32,
    #[serde(default = "default_segment_size")]
    pub segment_size: usize,
    #[serde(default = "default_camera_movements")]
    pub camera_movements: Vec<String>,
    #[serde(default = "default_transitions")]
    pub transitions: Vec<Transition>,
    #[serde(default)]
    pub boundary_match: BoundaryMatch,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            energy_chunks: default_energy_chunks(),
            max_beats: default_max_beats(),
            max_structural_segments: default_max_structural_segments(),
            brightness_ceiling_hz: default_brightness_ceiling_hz(),
            min_boundary_gap_secs: default_min_boundary_gap_secs(),
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            low_energy_duration: default_low_energy_duration(),
            mid_energy_duration: default_mid_energy_duration(),
            high_energy_duration: default_high_energy_duration(),
            min_scenes: default_min_scenes(),
            max_scenes: default_max_scenes(),
            density_factor: default_density_factor(),
            jitter: default_jitter(),
            segment_size: default_segment_size(),
            camera_movements: default_camera_movements(),
            transitions: default_transitions(),
            boundary_match: BoundaryMatch::default(),
        }
    }
}

fn default_energy_chunks() -> usize { 30 }
fn default_max_beats() -> usize { 100 }
fn default_max_structural_segments() -> usize { 8 }
fn default_brightness_ceiling_hz() -> f32 { 4000.0 }
fn default_min_boundary_gap_secs() -> f32 { 0.5 }
fn default_low_energy_duration() -> f32 { 6.5 }
fn default_mid_energy_duration() -> f32 { 4.0 }
fn default_high_energy_duration() -> f32 { 2.5 }
fn default_min_scenes() -> usize { 20 }
fn default_max_scenes() -> usize { 120 }
fn default_density_factor() -> f32 { 1.6 }
fn default_jitter() -> f32 { 0.2 }
fn default_segment_size() -> usize { 6 }

fn default_camera_movements() -> Vec<String> {
    [
        "static shot",
        "slow pan left to right",
        "slow pan right to left",
        "dolly in",
        "dolly out",
        "crane up",
        "crane down",
        "tracking shot",
        "handheld",
        "aerial view",
        "low angle",
        "high angle",
        "dutch angle",
        "zoom in",
        "zoom out",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_transitions() -> Vec<Transition> {
    vec![
        Transition::Cut,
        Transition::Dissolve,
        Transition::Fade,
        Transition::Wipe,
    ]
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Explicit path, else `clipscene.toml` in the working directory, else the
/// per-user config file.
pub fn find_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from("clipscene.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("clipscene").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("clipscene").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}
