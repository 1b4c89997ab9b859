//! Extraction followed by scheduling, one job at a time.

use rand::Rng;
use serde::Serialize;

use crate::audio::{AudioFeatures, AudioSource, FeatureExtractor};
use crate::error::Result;
use crate::scenes::{SceneScheduler, SceneStructure};

/// Everything the downstream collaborators receive for one job.
#[derive(Clone, Debug, Serialize)]
pub struct PipelineOutput {
    pub features: AudioFeatures,
    pub structure: SceneStructure,
}

pub struct Pipeline {
    extractor: FeatureExtractor,
    scheduler: SceneScheduler,
}

impl Pipeline {
    pub fn new(extractor: FeatureExtractor, scheduler: SceneScheduler) -> Self {
        Self {
            extractor,
            scheduler,
        }
    }

    /// Analyze `source` and schedule its scenes. Analysis failures degrade
    /// to the fallback record; only invalid scheduling input is an error.
    pub fn run<R: Rng + ?Sized>(
        &self,
        source: &AudioSource,
        duration_override: Option<f32>,
        brief: Option<&str>,
        rng: &mut R,
    ) -> Result<PipelineOutput> {
        let features = self.extractor.extract(source, duration_override);
        let structure = self.scheduler.schedule(&features, brief, rng)?;
        Ok(PipelineOutput {
            features,
            structure,
        })
    }
}
