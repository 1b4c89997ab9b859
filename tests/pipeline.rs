//! End-to-end runs over synthetic WAV files.

use hound::{SampleFormat, WavSpec, WavWriter};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f32::consts::PI;
use std::path::Path;

use clipscene::audio::fallback::degraded_features;
use clipscene::audio::{AudioSource, FeatureExtractor};
use clipscene::config::{AnalysisConfig, SceneConfig};
use clipscene::pipeline::Pipeline;
use clipscene::scenes::{SceneScheduler, Transition};

const SAMPLE_RATE: u32 = 22050;

/// Stereo 16-bit WAV: a 220 Hz pad whose loudness swells over the track,
/// with a click every `beat_period` seconds.
fn write_track(path: &Path, seconds: f32, beat_period: f32) {
    let spec = WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();

    let total = (SAMPLE_RATE as f32 * seconds) as usize;
    let beat_samples = (SAMPLE_RATE as f32 * beat_period) as usize;
    let click_len = SAMPLE_RATE as usize / 100;

    for i in 0..total {
        let t = i as f32 / SAMPLE_RATE as f32;
        let swell = 0.1 + 0.3 * (i as f32 / total as f32);
        let mut sample = (2.0 * PI * 220.0 * t).sin() * swell;
        let offset = i % beat_samples;
        if offset < click_len {
            let decay = 1.0 - offset as f32 / click_len as f32;
            sample += (2.0 * PI * 1500.0 * t).sin() * 0.5 * decay;
        }
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(value).unwrap();
        writer.write_sample(value).unwrap();
    }
    writer.finalize().unwrap();
}

fn pipeline() -> Pipeline {
    Pipeline::new(
        FeatureExtractor::spectral(AnalysisConfig::default()),
        SceneScheduler::new(SceneConfig::default()).unwrap(),
    )
}

#[test]
fn wav_file_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("swell.wav");
    write_track(&path, 20.0, 0.5);

    let mut rng = StdRng::seed_from_u64(17);
    let output = pipeline()
        .run(&AudioSource::Path(path), None, Some("slow sunrise"), &mut rng)
        .unwrap();

    let features = &output.features;
    assert!(!features.degraded);
    assert!((features.duration - 20.0).abs() < 0.05);
    assert!(features.tempo > 0.0);
    assert_eq!(features.energy_profile.len(), 30);
    assert!(features.energy_profile.iter().all(|e| (0.0..=1.0).contains(e)));
    // Loudness swells, so the last chunk is louder than the first
    assert!(features.energy_profile[29] > features.energy_profile[0]);
    assert!(features.beat_times.len() <= 100);
    assert!(features.structural_segments.len() <= 8);

    let structure = &output.structure;
    assert_eq!(structure.scenes[0].transition, Transition::Fade);
    assert!(structure.metadata.target_scenes >= 20);
    let numbers: Vec<u32> = structure.scenes.iter().map(|s| s.number).collect();
    assert_eq!(numbers, (1..=structure.total_scenes as u32).collect::<Vec<_>>());
    let last = structure.scenes.last().unwrap();
    assert!(last.end_time() <= features.duration + 1e-3);
}

#[test]
fn virtual_duration_schedules_a_sub_window() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("swell.wav");
    write_track(&path, 12.0, 0.5);

    let source = AudioSource::Path(path);
    let mut rng = StdRng::seed_from_u64(3);
    let full = pipeline().run(&source, None, None, &mut rng).unwrap();
    let mut rng = StdRng::seed_from_u64(3);
    let trimmed = pipeline().run(&source, Some(5.0), None, &mut rng).unwrap();

    assert_eq!(trimmed.features.duration, 5.0);
    assert_eq!(trimmed.features.energy_profile, full.features.energy_profile);
    assert_eq!(trimmed.structure.metadata.duration, 5.0);
    // The minimum scene floor still applies to the short window
    assert_eq!(trimmed.structure.metadata.target_scenes, 20);
    let end = trimmed.structure.scenes.last().unwrap().end_time();
    assert!(end <= 5.0 + 1e-3);
}

#[test]
fn encoded_bytes_match_file_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("swell.wav");
    write_track(&path, 6.0, 0.5);
    let bytes = std::fs::read(&path).unwrap();

    let extractor = FeatureExtractor::spectral(AnalysisConfig::default());
    let from_file = extractor.extract(&AudioSource::Path(path), None);
    let from_bytes = extractor.extract(&AudioSource::Bytes(bytes), None);
    assert_eq!(from_file, from_bytes);
}

#[test]
fn unreadable_input_falls_back_to_degraded_analysis() {
    let mut rng = StdRng::seed_from_u64(5);
    let output = pipeline()
        .run(
            &AudioSource::Path("/nonexistent/missing.flac".into()),
            None,
            None,
            &mut rng,
        )
        .unwrap();

    assert_eq!(output.features, degraded_features());
    assert_eq!(output.structure.metadata.tempo, 130.0);
    assert_eq!(output.structure.metadata.duration, 150.0);
}

#[test]
fn output_serializes_with_empty_prompts() {
    let mut rng = StdRng::seed_from_u64(8);
    let pipeline = Pipeline::new(
        FeatureExtractor::null(),
        SceneScheduler::new(SceneConfig::default()).unwrap(),
    );
    let output = pipeline
        .run(&AudioSource::Bytes(Vec::new()), None, None, &mut rng)
        .unwrap();

    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["features"]["key"]["tonic"], "A");
    let scenes = json["structure"]["scenes"].as_array().unwrap();
    assert!(!scenes.is_empty());
    assert!(scenes.iter().all(|s| s["prompt"] == ""));
    assert_eq!(scenes[0]["transition"], "fade");
}
