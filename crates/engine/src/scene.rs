use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;
use tracing::info;

use crate::input::InputSnapshot;

/// Game-time duration in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Millis(pub u64);

impl Millis {
    pub const ZERO: Millis = Millis(0);

    pub fn saturating_add(self, other: Millis) -> Millis {
        Millis(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Millis) -> Millis {
        Millis(self.0.saturating_sub(other.0))
    }

    pub fn as_seconds_f32(self) -> f32 {
        self.0 as f32 / 1000.0
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

pub type BoxedSourceError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("scene {scene} failed: {source}")]
    Failed {
        scene: &'static str,
        #[source]
        source: BoxedSourceError,
    },
    #[error("scene {scene} was run again after it completed its transition")]
    AlreadyCompleted { scene: &'static str },
}

impl SceneError {
    pub fn failed(scene: &'static str, source: impl Into<BoxedSourceError>) -> Self {
        Self::Failed {
            scene,
            source: source.into(),
        }
    }
}

pub struct SceneTransition {
    scene: Box<dyn Scene>,
}

impl SceneTransition {
    pub fn new(scene: Box<dyn Scene>) -> Self {
        Self { scene }
    }

    pub fn scene(&self) -> &dyn Scene {
        self.scene.as_ref()
    }

    pub fn into_scene(self) -> Box<dyn Scene> {
        self.scene
    }
}

impl fmt::Debug for SceneTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneTransition")
            .field("scene", &self.scene.debug_name())
            .finish()
    }
}

pub trait Scene {
    fn debug_name(&self) -> &'static str;

    fn on_enter(&mut self) {}

    /// Called once when the scene is replaced or the loop shuts down.
    fn on_exit(&mut self) {}

    fn run_one_frame(
        &mut self,
        time_passed: Millis,
        input: &InputSnapshot,
    ) -> Result<Option<SceneTransition>, SceneError>;
}

/// Drives exactly one active scene and swaps it when the scene asks for it.
pub struct SceneRunner {
    active: Box<dyn Scene>,
    transitions: u64,
}

impl SceneRunner {
    pub fn new(mut initial: Box<dyn Scene>) -> Self {
        initial.on_enter();
        info!(scene = initial.debug_name(), "scene_entered");
        Self {
            active: initial,
            transitions: 0,
        }
    }

    pub fn active_scene_name(&self) -> &'static str {
        self.active.debug_name()
    }

    pub fn transition_count(&self) -> u64 {
        self.transitions
    }

    /// Lets the active scene release or persist its state. Not called when
    /// the loop stops on a scene error.
    pub fn shutdown(&mut self) {
        self.active.on_exit();
        info!(scene = self.active.debug_name(), "scene_exited");
    }

    /// Returns true when the active scene changed during this frame.
    pub fn run_one_frame(
        &mut self,
        time_passed: Millis,
        input: &InputSnapshot,
    ) -> Result<bool, SceneError> {
        let Some(transition) = self.active.run_one_frame(time_passed, input)? else {
            return Ok(false);
        };

        let from = self.active.debug_name();
        self.active.on_exit();
        let mut next = transition.into_scene();
        next.on_enter();
        info!(from, to = next.debug_name(), "scene_switched");
        self.active = next;
        self.transitions = self.transitions.saturating_add(1);
        Ok(true)
    }
}
