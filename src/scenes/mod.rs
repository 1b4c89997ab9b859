pub mod scene;
pub mod scheduler;
pub mod summary;
pub mod vocabulary;

pub use scene::{Scene, SceneStructure, ScheduleMetadata, Segment};
pub use scheduler::SceneScheduler;
pub use summary::SceneSummary;
pub use vocabulary::{BoundaryMatch, Transition};
