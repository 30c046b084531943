use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::input::InputSnapshot;
use crate::scene::{Millis, Scene, SceneError, SceneRunner};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    /// Zero means no limit; the loop then only stops on quit input.
    pub max_frames: u64,
    /// Sleep one fixed step per frame instead of running as fast as possible.
    pub realtime: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frames: 3600,
            realtime: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("scene failed on frame {frame}: {source}")]
    Scene {
        frame: u64,
        #[source]
        source: SceneError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    QuitRequested,
    FrameLimitReached,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub transitions: u64,
    pub game_time: Millis,
    pub final_scene: &'static str,
    pub stop_reason: StopReason,
}

/// Runs scenes on a fixed timestep without a window. Any scene error ends the
/// loop; there is no recovery into the previous scene.
pub fn run_headless(
    config: LoopConfig,
    initial_scene: Box<dyn Scene>,
    mut input_source: impl FnMut(u64) -> InputSnapshot,
) -> Result<RunSummary, AppError> {
    let fixed_dt = fixed_step(config.target_tps);
    info!(
        target_tps = config.target_tps.max(1),
        fixed_dt_ms = fixed_dt.0,
        max_frames = config.max_frames,
        realtime = config.realtime,
        "loop_config"
    );

    let mut runner = SceneRunner::new(initial_scene);
    let mut frames = 0u64;
    let mut game_time = Millis::ZERO;

    let stop_reason = loop {
        if config.max_frames != 0 && frames >= config.max_frames {
            break StopReason::FrameLimitReached;
        }

        let input = input_source(frames);
        if input.quit_requested() {
            info!(frame = frames, reason = "quit_input", "shutdown_requested");
            break StopReason::QuitRequested;
        }

        let switched = runner
            .run_one_frame(fixed_dt, &input)
            .map_err(|source| AppError::Scene {
                frame: frames,
                source,
            })?;
        if switched {
            debug!(
                frame = frames,
                scene = runner.active_scene_name(),
                "frame_switched_scene"
            );
        }

        frames = frames.saturating_add(1);
        game_time = game_time.saturating_add(fixed_dt);
        if config.realtime {
            thread::sleep(Duration::from_millis(fixed_dt.0));
        }
    };

    runner.shutdown();
    let summary = RunSummary {
        frames,
        transitions: runner.transition_count(),
        game_time,
        final_scene: runner.active_scene_name(),
        stop_reason,
    };
    info!(
        frames = summary.frames,
        transitions = summary.transitions,
        game_time_ms = summary.game_time.0,
        scene = summary.final_scene,
        "shutdown"
    );
    Ok(summary)
}

fn fixed_step(target_tps: u32) -> Millis {
    Millis((1000 / u64::from(target_tps.max(1))).max(1))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::input::InputAction;
    use crate::scene::SceneTransition;

    struct IdleScene;

    impl Scene for IdleScene {
        fn debug_name(&self) -> &'static str {
            "idle"
        }

        fn run_one_frame(
            &mut self,
            _time_passed: Millis,
            _input: &InputSnapshot,
        ) -> Result<Option<SceneTransition>, SceneError> {
            Ok(None)
        }
    }

    struct HandOffScene;

    impl Scene for HandOffScene {
        fn debug_name(&self) -> &'static str {
            "hand_off"
        }

        fn run_one_frame(
            &mut self,
            _time_passed: Millis,
            _input: &InputSnapshot,
        ) -> Result<Option<SceneTransition>, SceneError> {
            Ok(Some(SceneTransition::new(Box::new(IdleScene))))
        }
    }

    struct BrokenScene;

    impl Scene for BrokenScene {
        fn debug_name(&self) -> &'static str {
            "broken"
        }

        fn run_one_frame(
            &mut self,
            _time_passed: Millis,
            _input: &InputSnapshot,
        ) -> Result<Option<SceneTransition>, SceneError> {
            Err(SceneError::AlreadyCompleted { scene: "broken" })
        }
    }

    struct ExitFlagScene {
        exited: Rc<Cell<bool>>,
        fail: bool,
    }

    impl Scene for ExitFlagScene {
        fn debug_name(&self) -> &'static str {
            "exit_flag"
        }

        fn on_exit(&mut self) {
            self.exited.set(true);
        }

        fn run_one_frame(
            &mut self,
            _time_passed: Millis,
            _input: &InputSnapshot,
        ) -> Result<Option<SceneTransition>, SceneError> {
            if self.fail {
                return Err(SceneError::AlreadyCompleted { scene: "exit_flag" });
            }
            Ok(None)
        }
    }

    #[test]
    fn normal_stop_exits_active_scene_but_error_does_not() {
        let exited = Rc::new(Cell::new(false));
        let scene = ExitFlagScene {
            exited: Rc::clone(&exited),
            fail: false,
        };
        run_headless(LoopConfig::default(), Box::new(scene), |frame| {
            InputSnapshot::empty().with_action_down(InputAction::Quit, frame == 2)
        })
        .expect("run");
        assert!(exited.get());

        let exited = Rc::new(Cell::new(false));
        let scene = ExitFlagScene {
            exited: Rc::clone(&exited),
            fail: true,
        };
        run_headless(LoopConfig::default(), Box::new(scene), |_| InputSnapshot::empty())
            .expect_err("err");
        assert!(!exited.get());
    }

    #[test]
    fn fixed_step_never_rounds_to_zero() {
        assert_eq!(fixed_step(60), Millis(16));
        assert_eq!(fixed_step(0), Millis(1000));
        assert_eq!(fixed_step(5000), Millis(1));
    }

    #[test]
    fn loop_stops_at_frame_limit() {
        let config = LoopConfig {
            target_tps: 50,
            max_frames: 10,
            realtime: false,
        };
        let summary =
            run_headless(config, Box::new(HandOffScene), |_| InputSnapshot::empty()).expect("run");
        assert_eq!(summary.frames, 10);
        assert_eq!(summary.transitions, 1);
        assert_eq!(summary.game_time, Millis(200));
        assert_eq!(summary.final_scene, "idle");
        assert_eq!(summary.stop_reason, StopReason::FrameLimitReached);
    }

    #[test]
    fn quit_input_stops_before_running_the_frame() {
        let summary = run_headless(LoopConfig::default(), Box::new(IdleScene), |frame| {
            InputSnapshot::empty().with_action_down(InputAction::Quit, frame == 3)
        })
        .expect("run");
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.stop_reason, StopReason::QuitRequested);
    }

    #[test]
    fn scene_error_ends_the_loop() {
        let err = run_headless(LoopConfig::default(), Box::new(BrokenScene), |_| {
            InputSnapshot::empty()
        })
        .expect_err("err");
        assert!(matches!(err, AppError::Scene { frame: 0, .. }));
    }
}
