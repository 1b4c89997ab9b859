use anyhow::{ensure, Result};
use rayon::prelude::*;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::decode::AudioData;
use super::features::{AudioFeatures, SpectralStats};
use super::key::{detect_key, fold_chroma};
use crate::config::AnalysisConfig;

const FFT_SIZE: usize = 2048;
const HOP_SIZE: usize = 512;
const ROLLOFF_FRACTION: f32 = 0.85;
const DEFAULT_TEMPO: f32 = 120.0;
const MIN_TEMPO: f32 = 60.0;
const MAX_TEMPO: f32 = 200.0;
// Frames per parallel work unit; each unit recomputes one leading frame
const FLUX_BLOCK_FRAMES: usize = 256;

/// Per-frame spectral summary (Pass 2 output)
struct FrameSpectrum {
    flux: f32,
    centroid: f32,
    rolloff: f32,
    chroma: [f32; 12],
}

/// Full-track analysis. Every curve is computed over the whole physical
/// signal; `duration` is the physical length.
pub fn analyze(audio: &AudioData, config: &AnalysisConfig) -> Result<AudioFeatures> {
    let samples = &audio.samples;
    let sr = audio.sample_rate;
    ensure!(sr > 0, "Sample rate is zero");
    ensure!(!samples.is_empty(), "Audio contains no samples");

    let duration = audio.duration();

    log::info!("Pass 1: Chunk energy ({} chunks)...", config.energy_chunks);
    let energy_profile = energy_profile(samples, config.energy_chunks);
    let dynamic_range = dynamic_range(samples);

    log::info!("Pass 2: Per-frame FFT ({} frames)...", frame_count(samples.len()));
    let frames = spectral_frames(samples, sr);

    log::info!("Pass 3: Onsets, tempo, key and structure...");
    let frame_rate = sr as f32 / HOP_SIZE as f32;
    let onset = onset_envelope(&frames);
    let flux_values: Vec<(f32, f32)> = onset
        .iter()
        .enumerate()
        .map(|(i, &flux)| (i as f32 / frame_rate, flux))
        .collect();

    let mut beat_times = detect_beats(&flux_values);
    let tempo = estimate_tempo_autocorr(&onset, frame_rate)
        .or_else(|| estimate_tempo(&beat_times))
        .unwrap_or(DEFAULT_TEMPO);
    beat_times.truncate(config.max_beats);

    let mut chroma = [0.0f32; 12];
    for frame in &frames {
        for (acc, v) in chroma.iter_mut().zip(frame.chroma.iter()) {
            *acc += v;
        }
    }
    for v in chroma.iter_mut() {
        *v /= frames.len().max(1) as f32;
    }
    let key = detect_key(&chroma);

    let spectral = spectral_stats(&frames, config.brightness_ceiling_hz);

    let peaks = find_peaks(&onset, min_distance_frames(config.min_boundary_gap_secs, frame_rate));
    let peak_times: Vec<f32> = peaks.iter().map(|&i| i as f32 / frame_rate).collect();
    let structural_segments =
        structural_segments(&peak_times, duration, config.max_structural_segments);

    log::info!(
        "Global: duration={:.1}s, tempo={:.1} BPM, key={}, beats={}, boundaries={}, centroid={:.0}Hz",
        duration,
        tempo,
        key,
        beat_times.len(),
        structural_segments.len(),
        spectral.centroid
    );

    Ok(AudioFeatures {
        duration,
        tempo,
        key,
        energy_profile,
        structural_segments,
        spectral,
        beat_times,
        dynamic_range,
        degraded: false,
    })
}

/// RMS of `chunks` equal slices, the last one absorbing the remainder,
/// normalized by the loudest chunk (or by 1.0 when all are silent).
pub fn energy_profile(samples: &[f32], chunks: usize) -> Vec<f32> {
    if chunks == 0 {
        return Vec::new();
    }

    let chunk_len = samples.len() / chunks;
    let raw: Vec<f32> = (0..chunks)
        .map(|i| {
            let start = i * chunk_len;
            let end = if i == chunks - 1 {
                samples.len()
            } else {
                start + chunk_len
            };
            rms(&samples[start..end])
        })
        .collect();

    let peak = raw.iter().copied().fold(0.0f32, f32::max);
    let divisor = if peak > 0.0 { peak } else { 1.0 };

    raw.into_iter().map(|e| (e / divisor).min(1.0)).collect()
}

fn rms(chunk: &[f32]) -> f32 {
    if chunk.is_empty() {
        return 0.0;
    }
    (chunk.iter().map(|s| s * s).sum::<f32>() / chunk.len() as f32).sqrt()
}

fn dynamic_range(samples: &[f32]) -> f32 {
    let (lo, hi) = samples
        .iter()
        .map(|s| s.abs())
        .fold((f32::MAX, 0.0f32), |(lo, hi), a| (lo.min(a), hi.max(a)));
    if samples.is_empty() {
        0.0
    } else {
        (hi - lo).max(0.0)
    }
}

/// STFT frames over `len` samples; a short signal still yields one
/// zero-padded frame.
fn frame_count(len: usize) -> usize {
    len.saturating_sub(FFT_SIZE) / HOP_SIZE + 1
}

fn spectral_frames(samples: &[f32], sample_rate: u32) -> Vec<FrameSpectrum> {
    let total_frames = frame_count(samples.len());
    let freq_resolution = sample_rate as f32 / FFT_SIZE as f32;
    let hann = hann_window(FFT_SIZE);

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(FFT_SIZE);

    // Only the previous frame's magnitudes are alive at any time per block
    let blocks = total_frames.div_ceil(FLUX_BLOCK_FRAMES);
    (0..blocks)
        .into_par_iter()
        .flat_map_iter(|block| {
            let first = block * FLUX_BLOCK_FRAMES;
            let last = (first + FLUX_BLOCK_FRAMES).min(total_frames);

            let mut prev = first
                .checked_sub(1)
                .map(|idx| frame_magnitudes(samples, idx, &hann, fft.as_ref()));
            let mut out = Vec::with_capacity(last - first);
            for frame_idx in first..last {
                let magnitudes = frame_magnitudes(samples, frame_idx, &hann, fft.as_ref());
                let flux = prev
                    .as_deref()
                    .map_or(0.0, |p| spectral_flux(&magnitudes, p));
                out.push(summarize_frame(&magnitudes, freq_resolution, flux));
                prev = Some(magnitudes);
            }
            out
        })
        .collect()
}

/// Windowed magnitude spectrum of one hop-aligned frame.
fn frame_magnitudes(
    samples: &[f32],
    frame_idx: usize,
    hann: &[f32],
    fft: &dyn Fft<f32>,
) -> Vec<f32> {
    let start = frame_idx * HOP_SIZE;
    let end = (start + FFT_SIZE).min(samples.len());

    // Zero-padded when the tail is shorter than the window
    let mut buffer: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); FFT_SIZE];
    for i in 0..end.saturating_sub(start) {
        buffer[i] = Complex::new(samples[start + i] * hann[i], 0.0);
    }
    fft.process(&mut buffer);

    buffer[..FFT_SIZE / 2].iter().map(|c| c.norm()).collect()
}

/// Half-wave rectified difference against the previous frame.
fn spectral_flux(current: &[f32], previous: &[f32]) -> f32 {
    current
        .iter()
        .zip(previous.iter())
        .map(|(cur, prev)| (cur - prev).max(0.0))
        .sum()
}

fn summarize_frame(magnitudes: &[f32], freq_resolution: f32, flux: f32) -> FrameSpectrum {
    let total: f32 = magnitudes.iter().sum();
    let centroid = if total > 1e-10 {
        magnitudes
            .iter()
            .enumerate()
            .map(|(i, &mag)| i as f32 * freq_resolution * mag)
            .sum::<f32>()
            / total
    } else {
        0.0
    };

    let rolloff = if total > 1e-10 {
        let threshold = total * ROLLOFF_FRACTION;
        let mut cumulative = 0.0f32;
        let bin = magnitudes
            .iter()
            .position(|&mag| {
                cumulative += mag;
                cumulative >= threshold
            })
            .unwrap_or(magnitudes.len() - 1);
        bin as f32 * freq_resolution
    } else {
        0.0
    };

    FrameSpectrum {
        flux,
        centroid,
        rolloff,
        chroma: fold_chroma(magnitudes, freq_resolution),
    }
}

/// Spectral-flux onset strength; the first frame has no predecessor.
fn onset_envelope(frames: &[FrameSpectrum]) -> Vec<f32> {
    frames.iter().map(|f| f.flux).collect()
}

fn spectral_stats(frames: &[FrameSpectrum], brightness_ceiling_hz: f32) -> SpectralStats {
    let n = frames.len().max(1) as f32;
    let centroid = frames.iter().map(|f| f.centroid).sum::<f32>() / n;
    let rolloff = frames.iter().map(|f| f.rolloff).sum::<f32>() / n;
    let brightness = if brightness_ceiling_hz > 0.0 {
        (centroid / brightness_ceiling_hz).min(1.0)
    } else {
        0.0
    };

    SpectralStats {
        centroid,
        rolloff,
        brightness,
    }
}

fn detect_beats(flux_values: &[(f32, f32)]) -> Vec<f32> {
    if flux_values.is_empty() {
        return Vec::new();
    }

    // Local mean over 20 onset frames either side
    let window = 20;
    let mut beat_times = Vec::new();

    for i in 0..flux_values.len() {
        let start = i.saturating_sub(window);
        let end = (i + window + 1).min(flux_values.len());
        let local_mean: f32 = flux_values[start..end].iter().map(|(_, f)| f).sum::<f32>()
            / (end - start) as f32;

        let threshold = local_mean * 1.5 + 0.01;

        if flux_values[i].1 > threshold {
            let is_peak = (i == 0 || flux_values[i].1 >= flux_values[i - 1].1)
                && (i == flux_values.len() - 1 || flux_values[i].1 >= flux_values[i + 1].1);

            // Minimum gap between beats (100ms)
            let far_enough = beat_times
                .last()
                .map_or(true, |&last: &f32| flux_values[i].0 - last > 0.1);

            if is_peak && far_enough {
                beat_times.push(flux_values[i].0);
            }
        }
    }

    beat_times
}

/// Global tempo from the autocorrelation of the onset envelope, weighted
/// by a log-normal prior around 120 BPM. `None` when the envelope is too
/// short or carries no periodicity.
fn estimate_tempo_autocorr(onset: &[f32], frame_rate: f32) -> Option<f32> {
    let min_lag = (frame_rate * 60.0 / MAX_TEMPO).round().max(1.0) as usize;
    let max_lag = (frame_rate * 60.0 / MIN_TEMPO).round() as usize;
    if onset.len() <= max_lag + 1 || min_lag >= max_lag {
        return None;
    }

    let mean = onset.iter().sum::<f32>() / onset.len() as f32;
    let centered: Vec<f32> = onset.iter().map(|v| v - mean).collect();

    let autocorr = |lag: usize| -> f32 {
        centered[lag..]
            .iter()
            .zip(centered.iter())
            .map(|(a, b)| a * b)
            .sum()
    };

    let scores: Vec<(usize, f32)> = (min_lag..=max_lag)
        .map(|lag| {
            let bpm = 60.0 * frame_rate / lag as f32;
            let octaves = (bpm / DEFAULT_TEMPO).log2();
            let prior = (-0.5 * octaves * octaves).exp();
            (lag, autocorr(lag) * prior)
        })
        .collect();

    let (best_idx, &(best_lag, best_score)) = scores
        .iter()
        .enumerate()
        .max_by(|a, b| a.1 .1.total_cmp(&b.1 .1))?;
    if best_score <= 0.0 || !best_score.is_finite() {
        return None;
    }

    // Parabolic refinement between neighbouring lags
    let mut lag = best_lag as f32;
    if best_idx > 0 && best_idx + 1 < scores.len() {
        let (l, c, r) = (scores[best_idx - 1].1, best_score, scores[best_idx + 1].1);
        let denom = l - 2.0 * c + r;
        if denom.abs() > 1e-12 {
            let offset = 0.5 * (l - r) / denom;
            if offset.abs() < 1.0 {
                lag += offset;
            }
        }
    }

    Some(60.0 * frame_rate / lag)
}

/// Median inter-beat interval within the 60-200 BPM window.
fn estimate_tempo(beat_times: &[f32]) -> Option<f32> {
    if beat_times.len() < 2 {
        return None;
    }

    let mut reasonable: Vec<f32> = beat_times
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|&i| (0.3..=1.0).contains(&i))
        .collect();

    if reasonable.is_empty() {
        return None;
    }

    reasonable.sort_by(|a, b| a.total_cmp(b));
    Some(60.0 / reasonable[reasonable.len() / 2])
}

fn min_distance_frames(gap_secs: f32, frame_rate: f32) -> usize {
    (gap_secs * frame_rate).ceil().max(1.0) as usize
}

/// Local maxima at least `distance` frames apart; taller peaks claim their
/// neighbourhood first. Returned in ascending frame order.
fn find_peaks(envelope: &[f32], distance: usize) -> Vec<usize> {
    if envelope.len() < 3 {
        return Vec::new();
    }

    let mut candidates: Vec<usize> = (1..envelope.len() - 1)
        .filter(|&i| envelope[i] > envelope[i - 1] && envelope[i] >= envelope[i + 1])
        .collect();

    candidates.sort_by(|&a, &b| envelope[b].total_cmp(&envelope[a]).then(a.cmp(&b)));

    let mut kept: Vec<usize> = Vec::new();
    for peak in candidates {
        if kept.iter().all(|&k| k.abs_diff(peak) >= distance) {
            kept.push(peak);
        }
    }

    kept.sort_unstable();
    kept
}

/// Peak times as ascending fractions of `duration`, subsampled to at most
/// `max_segments`. Falls back to quartiles when nothing was found.
pub fn structural_segments(peak_times: &[f32], duration: f32, max_segments: usize) -> Vec<f32> {
    let max_segments = max_segments.max(1);
    if peak_times.is_empty() || duration <= 0.0 {
        return vec![0.0, 0.25, 0.5, 0.75, 1.0];
    }

    let selected: Vec<f32> = if peak_times.len() > max_segments {
        let step = peak_times.len() / max_segments;
        peak_times
            .iter()
            .step_by(step)
            .take(max_segments)
            .copied()
            .collect()
    } else {
        peak_times.to_vec()
    };

    let mut fractions: Vec<f32> = selected
        .into_iter()
        .map(|t| (t / duration).clamp(0.0, 1.0))
        .collect();
    fractions.sort_by(|a, b| a.total_cmp(b));
    fractions.dedup();
    fractions
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos())
        })
        .collect()
}
