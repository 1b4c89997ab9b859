use serde::{Deserialize, Serialize};
use std::fmt;

/// The twelve pitch classes, sharps spelling, starting at C.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    #[serde(rename = "C#")]
    CSharp,
    D,
    #[serde(rename = "D#")]
    DSharp,
    E,
    F,
    #[serde(rename = "F#")]
    FSharp,
    G,
    #[serde(rename = "G#")]
    GSharp,
    A,
    #[serde(rename = "A#")]
    ASharp,
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Pitch class for a chroma bin index; wraps modulo 12.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 12]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Major,
    Minor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    pub tonic: PitchClass,
    pub mode: Mode,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            Mode::Major => "Major",
            Mode::Minor => "Minor",
        };
        write!(f, "{} {}", self.tonic.name(), mode)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpectralStats {
    /// Mean spectral centroid (Hz)
    pub centroid: f32,
    /// Mean 85% spectral rolloff (Hz)
    pub rolloff: f32,
    /// Centroid against the brightness ceiling, capped at 1.0
    pub brightness: f32,
}

/// Whole-track analysis handed to the scene scheduler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    /// Logical duration in seconds. May differ from the physical length
    /// when a duration override was requested.
    pub duration: f32,
    pub tempo: f32,
    pub key: Key,
    /// Normalized chunk RMS over the physical track (0.0-1.0)
    pub energy_profile: Vec<f32>,
    /// Ascending boundary positions as fractions of the physical track
    pub structural_segments: Vec<f32>,
    pub spectral: SpectralStats,
    pub beat_times: Vec<f32>,
    pub dynamic_range: f32,
    /// Set when analysis failed and the fixed fallback record was used
    #[serde(default)]
    pub degraded: bool,
}

impl AudioFeatures {
    /// Mean of the energy profile, 0.5 when the profile is empty.
    pub fn average_energy(&self) -> f32 {
        if self.energy_profile.is_empty() {
            return 0.5;
        }
        self.energy_profile.iter().sum::<f32>() / self.energy_profile.len() as f32
    }
}
