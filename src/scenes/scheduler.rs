use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

use super::scene::{partition_segments, Scene, SceneStructure, ScheduleMetadata};
use super::vocabulary::{
    moods_for, BoundaryMatch, Transition, CUT_ENERGY, HIGH_ENERGY, LOW_ENERGY,
};
use crate::audio::AudioFeatures;
use crate::config::SceneConfig;
use crate::error::{Result, SceneError};

/// Upper bound accepted for `max_scenes`.
pub const SCENE_LIMIT: usize = 10_000;

/// Partitions a track into scenes. Holds only validated configuration;
/// all randomness comes from the caller's generator.
#[derive(Clone, Debug)]
pub struct SceneScheduler {
    config: SceneConfig,
    weights: WeightedIndex<u32>,
}

impl SceneScheduler {
    pub fn new(config: SceneConfig) -> Result<Self> {
        validate(&config)?;
        let weights = WeightedIndex::new(config.transitions.iter().map(|t| t.weight()))
            .map_err(|_| SceneError::EmptyVocabulary("transition"))?;
        Ok(Self { config, weights })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Scene count before any scene is placed: `(base, multiplier, target)`.
    fn scene_count(&self, duration: f32, tempo: f32, avg_energy: f32) -> (usize, f32, usize) {
        // Each 4-beat measure yields `density_factor` scenes on average
        let measures = duration * (tempo / 60.0) / 4.0;
        let base_scenes = (measures * self.config.density_factor).floor() as usize;

        let energy_multiplier = if avg_energy > HIGH_ENERGY {
            1.3
        } else if avg_energy < LOW_ENERGY {
            0.7
        } else {
            1.0
        };

        let target = (base_scenes as f32 * energy_multiplier).round() as usize;
        let target = target.clamp(self.config.min_scenes, self.config.max_scenes);

        (base_scenes, energy_multiplier, target)
    }

    fn base_duration(&self, energy: f32) -> f32 {
        if energy > HIGH_ENERGY {
            self.config.high_energy_duration
        } else if energy < LOW_ENERGY {
            self.config.low_energy_duration
        } else {
            self.config.mid_energy_duration
        }
    }

    /// Build the scene structure for `features`.
    ///
    /// `brief` is free text for downstream prompt writers and does not
    /// influence the schedule.
    pub fn schedule<R: Rng + ?Sized>(
        &self,
        features: &AudioFeatures,
        brief: Option<&str>,
        rng: &mut R,
    ) -> Result<SceneStructure> {
        let duration = features.duration;
        let tempo = features.tempo;
        if !(duration.is_finite() && duration > 0.0) {
            return Err(SceneError::NonPositive {
                name: "duration",
                value: duration,
            });
        }
        if !(tempo.is_finite() && tempo > 0.0) {
            return Err(SceneError::NonPositive {
                name: "tempo",
                value: tempo,
            });
        }
        if let Some(brief) = brief {
            log::debug!("Creative brief ({} chars) passed through", brief.len());
        }

        let profile = &features.energy_profile;
        let avg_energy = features.average_energy();
        let (base_scenes, energy_multiplier, target) =
            self.scene_count(duration, tempo, avg_energy);

        let shortest_band = self
            .config
            .high_energy_duration
            .min(self.config.mid_energy_duration)
            .min(self.config.low_energy_duration);
        if duration / (target as f32) < shortest_band {
            log::warn!(
                "{} scenes over {:.2}s average {:.2}s each, shorter than every duration band",
                target,
                duration,
                duration / target as f32
            );
        }

        let jitter = self.config.jitter;
        // Every scene but the last lasts at least the shortest jittered band
        let fits = (duration / (shortest_band * (1.0 - jitter))).ceil() as usize + 1;
        let mut scenes: Vec<Scene> = Vec::with_capacity(target.min(fits));
        let mut cursor = 0.0f32;
        let mut stopped_early = false;

        for i in 0..target {
            let progress = i as f32 / target as f32;
            let local_energy = if profile.is_empty() {
                0.5
            } else {
                let index = (progress * (profile.len() - 1) as f32) as usize;
                profile[index.min(profile.len() - 1)]
            };

            let mut scene_duration =
                self.base_duration(local_energy) * rng.gen_range(1.0 - jitter..=1.0 + jitter);

            let reaches_end = cursor + scene_duration >= duration;
            if cursor + scene_duration > duration {
                scene_duration = duration - cursor;
            }

            let camera_movement = self
                .config
                .camera_movements
                .choose(rng)
                .cloned()
                .unwrap_or_default();

            let transition = if i == 0 {
                Transition::Fade
            } else if local_energy > CUT_ENERGY {
                Transition::Cut
            } else if self.config.boundary_match.is_boundary(
                &features.structural_segments,
                target,
                i,
            ) {
                Transition::Dissolve
            } else {
                self.config.transitions[self.weights.sample(rng)]
            };

            let mood = moods_for(local_energy)
                .choose(rng)
                .map(|m| m.to_string())
                .unwrap_or_default();

            let scene = Scene::new(
                i as u32 + 1,
                cursor,
                scene_duration,
                local_energy,
                camera_movement,
                transition,
                mood,
            );
            log::debug!("{}", scene.describe());
            scenes.push(scene);

            if reaches_end {
                // Snap so accumulated rounding cannot leave a sliver
                cursor = duration;
                stopped_early = i + 1 < target;
                break;
            }
            cursor += scene_duration;
        }

        let segments = partition_segments(&scenes, self.config.segment_size);
        let total_scenes = scenes.len();
        let avg_scene_duration = if total_scenes > 0 {
            duration / total_scenes as f32
        } else {
            0.0
        };

        log::info!(
            "Scheduled {} scenes (target {}) in {} segments over {:.1}s, cursor {:.2}s",
            total_scenes,
            target,
            segments.len(),
            duration,
            cursor
        );

        Ok(SceneStructure {
            total_segments: segments.len(),
            total_scenes,
            avg_scene_duration,
            scenes,
            segments,
            metadata: ScheduleMetadata {
                tempo,
                duration,
                avg_energy,
                energy_multiplier,
                base_scenes,
                target_scenes: target,
                stopped_early,
            },
        })
    }
}

fn validate(config: &SceneConfig) -> Result<()> {
    if config.min_scenes == 0 {
        return Err(SceneError::ZeroMinScenes);
    }
    if config.min_scenes > config.max_scenes {
        return Err(SceneError::SceneBounds {
            min: config.min_scenes,
            max: config.max_scenes,
        });
    }
    if config.max_scenes > SCENE_LIMIT {
        return Err(SceneError::TooManyScenes {
            max: config.max_scenes,
            limit: SCENE_LIMIT,
        });
    }
    for (name, value) in [
        ("low_energy_duration", config.low_energy_duration),
        ("mid_energy_duration", config.mid_energy_duration),
        ("high_energy_duration", config.high_energy_duration),
        ("density_factor", config.density_factor),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(SceneError::NonPositive { name, value });
        }
    }
    if !(0.0..1.0).contains(&config.jitter) {
        return Err(SceneError::Jitter(config.jitter));
    }
    if config.segment_size == 0 {
        return Err(SceneError::ZeroSegmentSize);
    }
    if config.camera_movements.is_empty() {
        return Err(SceneError::EmptyVocabulary("camera movement"));
    }
    if config.transitions.is_empty() {
        return Err(SceneError::EmptyVocabulary("transition"));
    }
    if let BoundaryMatch::Nearest { tolerance } = config.boundary_match {
        if !(tolerance.is_finite() && tolerance >= 0.0) {
            return Err(SceneError::BoundaryTolerance(tolerance));
        }
    }
    Ok(())
}
