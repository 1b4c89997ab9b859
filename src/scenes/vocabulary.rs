use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Cut,
    Dissolve,
    Fade,
    Wipe,
}

impl Transition {
    /// Relative weight in the random draw: cut 70, dissolve 20, fade 8, wipe 2.
    pub fn weight(self) -> u32 {
        match self {
            Transition::Cut => 70,
            Transition::Dissolve => 20,
            Transition::Fade => 8,
            Transition::Wipe => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Transition::Cut => "cut",
            Transition::Dissolve => "dissolve",
            Transition::Fade => "fade",
            Transition::Wipe => "wipe",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a structural boundary fraction is matched to a scene index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryMatch {
    /// `floor(boundary * target) == index`
    #[default]
    Exact,
    /// `|boundary * target - index| <= tolerance`
    Nearest { tolerance: f32 },
}

impl BoundaryMatch {
    pub fn is_boundary(self, boundaries: &[f32], target: usize, index: usize) -> bool {
        boundaries.iter().any(|&b| {
            let position = b * target as f32;
            match self {
                BoundaryMatch::Exact => position.floor() as usize == index,
                BoundaryMatch::Nearest { tolerance } => {
                    (position - index as f32).abs() <= tolerance
                }
            }
        })
    }
}

/// Energy thresholds for the duration band.
pub const HIGH_ENERGY: f32 = 0.7;
pub const LOW_ENERGY: f32 = 0.4;
/// Above this the transition is always a hard cut.
pub const CUT_ENERGY: f32 = 0.8;

const MOODS_EXPLOSIVE: &[&str] = &["energetic", "intense", "vibrant", "explosive"];
const MOODS_DRIVING: &[&str] = &["dynamic", "exciting", "rhythmic"];
const MOODS_REFLECTIVE: &[&str] = &["contemplative", "gentle", "tranquil"];
const MOODS_QUIET: &[&str] = &["intimate", "serene", "melancholic", "calm"];

/// Mood words for an energy level: `>0.75`, `>0.5`, `>0.3`, else.
pub fn moods_for(energy: f32) -> &'static [&'static str] {
    if energy > 0.75 {
        MOODS_EXPLOSIVE
    } else if energy > 0.5 {
        MOODS_DRIVING
    } else if energy > 0.3 {
        MOODS_REFLECTIVE
    } else {
        MOODS_QUIET
    }
}
