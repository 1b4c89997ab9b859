use serde::Serialize;
use std::collections::HashMap;

use super::vocabulary::Transition;

/// One shot. Created by the scheduler with an empty prompt; downstream
/// writers extend it through [`Scene::with_prompt`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Scene {
    /// 1-based position in the structure
    pub number: u32,
    pub start_time: f32,
    pub duration: f32,
    /// Sampled from the energy profile (0.0-1.0)
    pub energy_level: f32,
    pub camera_movement: String,
    pub transition: Transition,
    pub mood: String,
    prompt: String,
}

impl Scene {
    pub(crate) fn new(
        number: u32,
        start_time: f32,
        duration: f32,
        energy_level: f32,
        camera_movement: String,
        transition: Transition,
        mood: String,
    ) -> Self {
        Self {
            number,
            start_time,
            duration,
            energy_level,
            camera_movement,
            transition,
            mood,
            prompt: String::new(),
        }
    }

    pub fn end_time(&self) -> f32 {
        self.start_time + self.duration
    }

    /// Empty until a prompt writer has filled it.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Copy of this scene carrying `prompt`.
    pub fn with_prompt(&self, prompt: impl Into<String>) -> Scene {
        Scene {
            prompt: prompt.into(),
            ..self.clone()
        }
    }

    /// One-line form handed to prompt writers.
    pub fn describe(&self) -> String {
        format!(
            "Scene {}: {:.2}s, energy {:.2}, {}, camera: {}, transition: {}",
            self.number,
            self.duration,
            self.energy_level,
            self.mood,
            self.camera_movement,
            self.transition
        )
    }
}

/// A batch of consecutive scenes processed together downstream.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Segment {
    pub number: u32,
    pub scenes: Vec<u32>,
    pub duration: f32,
}

/// Intermediate values behind the scene count.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScheduleMetadata {
    pub tempo: f32,
    pub duration: f32,
    pub avg_energy: f32,
    pub energy_multiplier: f32,
    pub base_scenes: usize,
    /// Scene count after the multiplier and min/max clamp
    pub target_scenes: usize,
    /// The track ran out before `target_scenes` scenes were placed
    pub stopped_early: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SceneStructure {
    pub scenes: Vec<Scene>,
    pub segments: Vec<Segment>,
    pub total_scenes: usize,
    pub total_segments: usize,
    pub avg_scene_duration: f32,
    pub metadata: ScheduleMetadata,
}

impl SceneStructure {
    /// Copy with prompts attached by scene number. Unknown numbers are
    /// ignored; unmentioned scenes keep their current prompt.
    pub fn with_prompts<I>(&self, prompts: I) -> SceneStructure
    where
        I: IntoIterator<Item = (u32, String)>,
    {
        let prompts: HashMap<u32, String> = prompts.into_iter().collect();
        let scenes = self
            .scenes
            .iter()
            .map(|scene| match prompts.get(&scene.number) {
                Some(prompt) => scene.with_prompt(prompt.clone()),
                None => scene.clone(),
            })
            .collect();

        SceneStructure {
            scenes,
            ..self.clone()
        }
    }

    pub fn scene(&self, number: u32) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.number == number)
    }
}

/// Group scenes into consecutive batches of `size`; the last may be short.
pub fn partition_segments(scenes: &[Scene], size: usize) -> Vec<Segment> {
    scenes
        .chunks(size.max(1))
        .enumerate()
        .map(|(i, batch)| Segment {
            number: i as u32 + 1,
            scenes: batch.iter().map(|s| s.number).collect(),
            duration: batch.iter().map(|s| s.duration).sum(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(number: u32, start: f32, duration: f32) -> Scene {
        Scene::new(
            number,
            start,
            duration,
            0.5,
            "dolly in".into(),
            Transition::Cut,
            "gentle".into(),
        )
    }

    #[test]
    fn with_prompt_leaves_original_untouched() {
        let original = scene(1, 0.0, 4.0);
        let extended = original.with_prompt("neon alley at dusk");
        assert_eq!(original.prompt(), "");
        assert_eq!(extended.prompt(), "neon alley at dusk");
        assert_eq!(extended.number, original.number);
        assert_eq!(extended.duration, original.duration);
    }

    #[test]
    fn segments_partition_scenes() {
        let scenes: Vec<Scene> = (0..14).map(|i| scene(i + 1, i as f32, 1.0)).collect();
        let segments = partition_segments(&scenes, 6);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].scenes, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(segments[2].scenes, vec![13, 14]);
        assert_eq!(segments[2].number, 3);
        assert_eq!(segments[1].duration, 6.0);
    }

    #[test]
    fn describe_line() {
        let line = scene(3, 8.0, 4.25).describe();
        assert_eq!(
            line,
            "Scene 3: 4.25s, energy 0.50, gentle, camera: dolly in, transition: cut"
        );
    }

    #[test]
    fn with_prompts_by_number() {
        let scenes = vec![scene(1, 0.0, 2.0), scene(2, 2.0, 2.0)];
        let structure = SceneStructure {
            segments: partition_segments(&scenes, 6),
            total_scenes: 2,
            total_segments: 1,
            avg_scene_duration: 2.0,
            scenes,
            metadata: ScheduleMetadata {
                tempo: 120.0,
                duration: 4.0,
                avg_energy: 0.5,
                energy_multiplier: 1.0,
                base_scenes: 2,
                target_scenes: 2,
                stopped_early: true,
            },
        };

        let filled = structure.with_prompts(vec![(2, "rooftop".to_string()), (9, "x".to_string())]);
        assert_eq!(filled.scene(1).unwrap().prompt(), "");
        assert_eq!(filled.scene(2).unwrap().prompt(), "rooftop");
        assert_eq!(structure.scene(2).unwrap().prompt(), "");
        assert_eq!(filled.total_scenes, 2);
    }
}
