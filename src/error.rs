use thiserror::Error;

/// Fatal problems with scheduler configuration or input; never retried.
#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("min_scenes must be at least 1")]
    ZeroMinScenes,

    #[error("min_scenes ({min}) exceeds max_scenes ({max})")]
    SceneBounds { min: usize, max: usize },

    #[error("max_scenes ({max}) exceeds the supported limit of {limit}")]
    TooManyScenes { max: usize, limit: usize },

    #[error("{name} must be a positive finite number, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    #[error("jitter must lie in [0, 1), got {0}")]
    Jitter(f32),

    #[error("segment_size must be at least 1")]
    ZeroSegmentSize,

    #[error("{0} vocabulary is empty")]
    EmptyVocabulary(&'static str),

    #[error("boundary tolerance must be non-negative, got {0}")]
    BoundaryTolerance(f32),
}

pub type Result<T, E = SceneError> = std::result::Result<T, E>;
