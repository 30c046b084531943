use std::process::ExitCode;

use engine::{run_headless, InputAction, InputSnapshot};
use tracing::error;

use super::bootstrap::AppWiring;

/// Frames spent in each autopilot leg before the heading changes.
const AUTOPILOT_LEG_FRAMES: u64 = 600;

/// Scripted input for the windowless build: walk east, then north-east,
/// alternating legs.
pub(crate) fn autopilot_input(frame: u64) -> InputSnapshot {
    let heading_east = InputSnapshot::empty().with_action_down(InputAction::MoveRight, true);
    if (frame / AUTOPILOT_LEG_FRAMES) % 2 == 1 {
        heading_east.with_action_down(InputAction::MoveUp, true)
    } else {
        heading_east
    }
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    if let Err(err) = run_headless(app.config, app.initial_scene, autopilot_input) {
        error!(error = %err, "run_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
