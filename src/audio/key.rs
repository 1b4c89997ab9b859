//! Krumhansl-Schmuckler key estimation from an averaged chroma vector.

use super::features::{Key, Mode, PitchClass};

const MAJOR_PROFILE: [f32; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];
const MINOR_PROFILE: [f32; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

// Frequency window folded into chroma
const CHROMA_MIN_HZ: f32 = 55.0;
const CHROMA_MAX_HZ: f32 = 5000.0;

/// Accumulate one frame's magnitude spectrum into a 12-bin chroma vector.
pub fn fold_chroma(magnitudes: &[f32], freq_resolution: f32) -> [f32; 12] {
    let mut chroma = [0.0f32; 12];
    for (bin, &mag) in magnitudes.iter().enumerate().skip(1) {
        let freq = bin as f32 * freq_resolution;
        if !(CHROMA_MIN_HZ..=CHROMA_MAX_HZ).contains(&freq) {
            continue;
        }
        // MIDI note 69 = A4 = 440 Hz; pitch class 0 = C
        let midi = 69.0 + 12.0 * (freq / 440.0).log2();
        let class = (midi.round() as i64).rem_euclid(12) as usize;
        chroma[class] += mag * mag;
    }
    chroma
}

/// Rotate a tonic-first profile so its first entry lands on `tonic`.
fn rotate(profile: &[f32; 12], tonic: usize) -> [f32; 12] {
    let mut out = [0.0f32; 12];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = profile[(i + 12 - tonic % 12) % 12];
    }
    out
}

/// Pearson correlation; 0.0 when either side has no variance.
pub fn pearson(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let mean_a = a[..n].iter().sum::<f32>() / n as f32;
    let mean_b = b[..n].iter().sum::<f32>() / n as f32;

    let mut cov = 0.0f32;
    let mut var_a = 0.0f32;
    let mut var_b = 0.0f32;
    for i in 0..n {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = (var_a * var_b).sqrt();
    if denom <= f32::EPSILON || !denom.is_finite() {
        return 0.0;
    }
    cov / denom
}

/// Tonic is the strongest chroma bin; mode is major unless the rotated
/// minor profile correlates strictly better.
pub fn detect_key(chroma: &[f32; 12]) -> Key {
    let tonic = chroma
        .iter()
        .enumerate()
        .fold((0usize, f32::NEG_INFINITY), |best, (i, &v)| {
            if v > best.1 {
                (i, v)
            } else {
                best
            }
        })
        .0;

    let major_corr = pearson(chroma, &rotate(&MAJOR_PROFILE, tonic));
    let minor_corr = pearson(chroma, &rotate(&MINOR_PROFILE, tonic));

    let mode = select_mode(major_corr, minor_corr);

    log::debug!(
        "Key correlation: major={:.3}, minor={:.3}",
        major_corr,
        minor_corr
    );

    Key {
        tonic: PitchClass::from_index(tonic),
        mode,
    }
}

/// Major unless minor correlates strictly better.
fn select_mode(major_corr: f32, minor_corr: f32) -> Mode {
    if minor_corr > major_corr {
        Mode::Minor
    } else {
        Mode::Major
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_puts_tonic_weight_on_key() {
        let rotated = rotate(&MAJOR_PROFILE, 9);
        assert_eq!(rotated[9], MAJOR_PROFILE[0]);
        assert_eq!(rotated[4], MAJOR_PROFILE[7]); // E is the fifth of A
        assert_eq!(rotate(&MAJOR_PROFILE, 0), MAJOR_PROFILE);
    }

    #[test]
    fn pearson_of_identical_vectors_is_one() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!((pearson(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn pearson_of_flat_vector_is_zero() {
        let flat = [0.5; 12];
        assert_eq!(pearson(&flat, &MAJOR_PROFILE), 0.0);
    }

    #[test]
    fn major_profile_detected_as_major() {
        let key = detect_key(&MAJOR_PROFILE);
        assert_eq!(key.tonic, PitchClass::C);
        assert_eq!(key.mode, Mode::Major);
    }

    #[test]
    fn rotated_minor_profile_detected_as_minor() {
        let chroma = rotate(&MINOR_PROFILE, 9);
        let key = detect_key(&chroma);
        assert_eq!(key.tonic, PitchClass::A);
        assert_eq!(key.mode, Mode::Minor);
    }

    #[test]
    fn equal_correlation_resolves_to_major() {
        // Silence has no variance: both correlations are 0
        let key = detect_key(&[0.0; 12]);
        assert_eq!(key.tonic, PitchClass::C);
        assert_eq!(key.mode, Mode::Major);
    }

    #[test]
    fn tied_nonzero_correlations_pick_major() {
        assert_eq!(select_mode(0.62, 0.62), Mode::Major);
        assert_eq!(select_mode(-0.3, -0.3), Mode::Major);
        assert_eq!(select_mode(0.62, 0.621), Mode::Minor);
        assert_eq!(select_mode(0.621, 0.62), Mode::Major);
    }

    #[test]
    fn a440_folds_into_pitch_class_a() {
        let freq_resolution = 10.0;
        let mut mags = vec![0.0f32; 100];
        mags[44] = 1.0; // 440 Hz
        let chroma = fold_chroma(&mags, freq_resolution);
        assert_eq!(chroma[9], 1.0);
        assert_eq!(chroma.iter().sum::<f32>(), 1.0);
    }
}
