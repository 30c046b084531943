//! Genre-neutral runtime pieces for the RPG: geometry, input snapshots, the
//! scene runner, observer lists, grid path finding and a headless loop.

mod atomic_io;
mod geometry;
mod input;
mod loop_runner;
mod observers;
mod path_finding;
mod scene;

pub use atomic_io::{write_bytes_atomic, write_text_atomic};
pub use geometry::{Camera2D, Rect, Vec2, DEFAULT_CAMERA_SIZE};
pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{run_headless, AppError, LoopConfig, RunSummary, StopReason};
pub use observers::{Observers, Subscription};
pub use path_finding::{GridCell, PathFinder, PathFinderHandle, WallGrid};
pub use scene::{BoxedSourceError, Millis, Scene, SceneError, SceneRunner, SceneTransition};
