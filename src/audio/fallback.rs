//! Degraded-analysis record used whenever decoding or analysis fails.

use super::features::{AudioFeatures, Key, Mode, PitchClass, SpectralStats};

pub const FALLBACK_DURATION: f32 = 150.0;
pub const FALLBACK_TEMPO: f32 = 130.0;

const FALLBACK_ENERGY: [f32; 30] = [
    0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0, 0.9, 0.8, //
    0.7, 0.8, 0.9, 1.0, 1.0, 0.9, 0.8, 0.7, 0.6, 0.5, //
    0.6, 0.7, 0.8, 0.9, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3,
];

const FALLBACK_SEGMENTS: [f32; 7] = [0.0, 0.15, 0.35, 0.55, 0.75, 0.9, 1.0];

/// Fixed feature record: 150s at 130 BPM in A major, a rise-and-fall
/// energy arc, a beat every 2s and seven section boundaries.
pub fn degraded_features() -> AudioFeatures {
    AudioFeatures {
        duration: FALLBACK_DURATION,
        tempo: FALLBACK_TEMPO,
        key: Key {
            tonic: PitchClass::A,
            mode: Mode::Major,
        },
        energy_profile: FALLBACK_ENERGY.to_vec(),
        structural_segments: FALLBACK_SEGMENTS.to_vec(),
        spectral: SpectralStats {
            centroid: 2000.0,
            rolloff: 4500.0,
            brightness: 0.6,
        },
        beat_times: (0..150).step_by(2).map(|t| t as f32).collect(),
        dynamic_range: 0.85,
        degraded: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_fully_specified() {
        let f = degraded_features();
        assert_eq!(f.duration, 150.0);
        assert_eq!(f.tempo, 130.0);
        assert_eq!(f.key.to_string(), "A Major");
        assert_eq!(f.energy_profile.len(), 30);
        assert_eq!(f.beat_times.len(), 75);
        assert_eq!(f.beat_times.first(), Some(&0.0));
        assert_eq!(f.beat_times.last(), Some(&148.0));
        assert_eq!(f.structural_segments, FALLBACK_SEGMENTS.to_vec());
        assert_eq!(f.spectral.brightness, 0.6);
        assert!(f.degraded);
    }

    #[test]
    fn fallback_is_deterministic() {
        assert_eq!(degraded_features(), degraded_features());
    }

    #[test]
    fn fallback_energy_in_unit_range() {
        assert!(degraded_features()
            .energy_profile
            .iter()
            .all(|e| (0.0..=1.0).contains(e)));
    }
}
