pub mod analysis;
pub mod decode;
pub mod extractor;
pub mod fallback;
pub mod features;
pub mod key;

pub use decode::AudioData;
pub use extractor::{AnalysisBackend, AudioSource, FeatureExtractor, NullBackend, SpectralBackend};
pub use features::{AudioFeatures, Key, Mode, PitchClass, SpectralStats};
