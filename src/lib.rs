//! Music-to-scene structuring.
//!
//! [`audio`] turns a track into [`AudioFeatures`]: tempo, key, an energy
//! curve, structural boundaries and spectral statistics. [`scenes`] turns
//! those features into a [`SceneStructure`], a time-ordered list of shots
//! batched into segments. [`pipeline`] runs the two back to back.
//!
//! ```no_run
//! use clipscene::audio::{AudioSource, FeatureExtractor};
//! use clipscene::config::Config;
//! use clipscene::pipeline::Pipeline;
//! use clipscene::scenes::SceneScheduler;
//! use rand::SeedableRng;
//!
//! let config = Config::default();
//! let pipeline = Pipeline::new(
//!     FeatureExtractor::spectral(config.analysis),
//!     SceneScheduler::new(config.scenes)?,
//! );
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let output = pipeline.run(&AudioSource::Path("song.mp3".into()), None, None, &mut rng)?;
//! println!("{} scenes", output.structure.total_scenes);
//! # Ok::<(), clipscene::SceneError>(())
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod scenes;

pub use audio::{AudioFeatures, AudioSource};
pub use error::SceneError;
pub use scenes::{Scene, SceneStructure, Segment};
