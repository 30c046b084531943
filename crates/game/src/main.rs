mod app;
mod character_file;
mod scenes;
mod ui;
mod wiring;
mod world;

use std::process::ExitCode;

use tracing::error;

fn main() -> ExitCode {
    let app = match app::build_app() {
        Ok(app) => app,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };
    app::run(app)
}
