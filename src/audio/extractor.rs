use anyhow::Result;
use std::path::PathBuf;

use super::analysis::analyze;
use super::decode::{decode_bytes, decode_file, AudioData};
use super::fallback::degraded_features;
use super::features::AudioFeatures;
use crate::config::AnalysisConfig;

/// Where the audio to analyze comes from.
#[derive(Clone, Debug)]
pub enum AudioSource {
    /// Encoded file on disk (format probed from extension and content)
    Path(PathBuf),
    /// Encoded stream held in memory
    Bytes(Vec<u8>),
    /// Already-decoded mono samples
    Pcm(AudioData),
}

impl AudioSource {
    fn decode(&self) -> Result<AudioData> {
        match self {
            AudioSource::Path(path) => decode_file(path),
            AudioSource::Bytes(bytes) => decode_bytes(bytes),
            AudioSource::Pcm(audio) => Ok(audio.clone()),
        }
    }
}

/// Turns an audio source into features. Implementations may fail; the
/// extractor owns the fallback policy.
pub trait AnalysisBackend: Send + Sync {
    fn name(&self) -> &'static str;
    fn analyze(&self, source: &AudioSource) -> Result<AudioFeatures>;
}

/// Decodes with symphonia and runs the STFT analysis.
pub struct SpectralBackend {
    config: AnalysisConfig,
}

impl SpectralBackend {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }
}

impl AnalysisBackend for SpectralBackend {
    fn name(&self) -> &'static str {
        "spectral"
    }

    fn analyze(&self, source: &AudioSource) -> Result<AudioFeatures> {
        let audio = source.decode()?;
        analyze(&audio, &self.config)
    }
}

/// Never touches the audio; always yields the degraded record.
pub struct NullBackend;

impl AnalysisBackend for NullBackend {
    fn name(&self) -> &'static str {
        "null"
    }

    fn analyze(&self, _source: &AudioSource) -> Result<AudioFeatures> {
        Ok(degraded_features())
    }
}

pub struct FeatureExtractor {
    backend: Box<dyn AnalysisBackend>,
}

impl FeatureExtractor {
    pub fn new(backend: Box<dyn AnalysisBackend>) -> Self {
        Self { backend }
    }

    pub fn spectral(config: AnalysisConfig) -> Self {
        Self::new(Box::new(SpectralBackend::new(config)))
    }

    pub fn null() -> Self {
        Self::new(Box::new(NullBackend))
    }

    /// Analyze `source`, substituting the degraded record on any failure.
    ///
    /// `duration_override` replaces only the reported duration; every
    /// curve still describes the full physical signal.
    pub fn extract(&self, source: &AudioSource, duration_override: Option<f32>) -> AudioFeatures {
        let mut features = match self.backend.analyze(source) {
            Ok(features) => features,
            Err(err) => {
                log::warn!(
                    "Audio analysis failed ({} backend): {:#}; using degraded analysis",
                    self.backend.name(),
                    err
                );
                degraded_features()
            }
        };

        if let Some(duration) = duration_override {
            log::info!(
                "Virtual duration {:.2}s replaces analyzed {:.2}s",
                duration,
                features.duration
            );
            features.duration = duration;
        }

        features
    }
}
