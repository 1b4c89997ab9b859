use std::fmt;

use super::scene::SceneStructure;
use super::vocabulary::{HIGH_ENERGY, LOW_ENERGY};

/// Human-readable digest of a scene structure.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneSummary {
    pub total_scenes: usize,
    pub total_segments: usize,
    pub avg_scene_duration: f32,
    pub min_scene_duration: f32,
    pub max_scene_duration: f32,
    pub high_energy_scenes: usize,
    pub mid_energy_scenes: usize,
    pub low_energy_scenes: usize,
}

impl SceneSummary {
    pub fn of(structure: &SceneStructure) -> Self {
        let durations = structure.scenes.iter().map(|s| s.duration);
        let min_scene_duration = durations.clone().fold(f32::INFINITY, f32::min);
        let max_scene_duration = durations.fold(0.0f32, f32::max);

        let count = |pred: &dyn Fn(f32) -> bool| {
            structure
                .scenes
                .iter()
                .filter(|s| pred(s.energy_level))
                .count()
        };

        Self {
            total_scenes: structure.total_scenes,
            total_segments: structure.total_segments,
            avg_scene_duration: structure.avg_scene_duration,
            min_scene_duration: if structure.scenes.is_empty() {
                0.0
            } else {
                min_scene_duration
            },
            max_scene_duration,
            high_energy_scenes: count(&|e| e > HIGH_ENERGY),
            mid_energy_scenes: count(&|e| (LOW_ENERGY..=HIGH_ENERGY).contains(&e)),
            low_energy_scenes: count(&|e| e < LOW_ENERGY),
        }
    }
}

impl fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scene structure:")?;
        writeln!(f, "  total scenes:       {}", self.total_scenes)?;
        writeln!(f, "  total segments:     {}", self.total_segments)?;
        writeln!(f, "  avg scene duration: {:.2}s", self.avg_scene_duration)?;
        writeln!(
            f,
            "  duration range:     {:.1}s - {:.1}s",
            self.min_scene_duration, self.max_scene_duration
        )?;
        writeln!(f, "  high energy (>0.7):    {}", self.high_energy_scenes)?;
        writeln!(f, "  mid energy (0.4-0.7):  {}", self.mid_energy_scenes)?;
        write!(f, "  low energy (<0.4):     {}", self.low_energy_scenes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::fallback::degraded_features;
    use crate::config::SceneConfig;
    use crate::scenes::SceneScheduler;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn energy_buckets_cover_every_scene() {
        let scheduler = SceneScheduler::new(SceneConfig::default()).unwrap();
        let mut rng = StdRng::seed_from_u64(21);
        let structure = scheduler
            .schedule(&degraded_features(), None, &mut rng)
            .unwrap();
        let summary = SceneSummary::of(&structure);

        assert_eq!(summary.total_scenes, structure.total_scenes);
        assert_eq!(
            summary.high_energy_scenes + summary.mid_energy_scenes + summary.low_energy_scenes,
            structure.total_scenes
        );
        assert!(summary.min_scene_duration <= summary.max_scene_duration);
        assert!(summary.to_string().contains("total scenes:"));
    }
}
