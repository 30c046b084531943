use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use engine::{LoopConfig, PathFinderHandle, Scene};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::character_file::{load_character_file, CharacterFile, CharacterFileError};
use crate::scenes::{GameSceneFactory, PlayingSceneArgs, SceneFactory};
use crate::ui::GameUiView;
use crate::wiring::{
    register_game_engine_observers, register_game_state_observers, ObserverSubscriptions,
};
use crate::world::{behavior_for, build_world, builtin_map, PlayerState, WorldBuildError};

const CHARACTER_FILE_ENV_VAR: &str = "ARPG_CHARACTER_FILE";
const MAX_FRAMES_ENV_VAR: &str = "ARPG_MAX_FRAMES";
const TARGET_TPS_ENV_VAR: &str = "ARPG_TARGET_TPS";
const REALTIME_ENV_VAR: &str = "ARPG_REALTIME";
const DEFAULT_CHARACTER_FILE: &str = "saves/hero.json";

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    CharacterFile(#[from] CharacterFileError),
    #[error("failed to build starting world: {0}")]
    World(#[from] WorldBuildError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GameConfig {
    pub(crate) character_file: PathBuf,
    pub(crate) max_frames: u64,
    pub(crate) target_tps: u32,
    /// Paces frames to wall-clock time instead of running flat out.
    pub(crate) realtime: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        let loop_defaults = LoopConfig::default();
        Self {
            character_file: PathBuf::from(DEFAULT_CHARACTER_FILE),
            max_frames: loop_defaults.max_frames,
            target_tps: loop_defaults.target_tps,
            realtime: loop_defaults.realtime,
        }
    }
}

impl GameConfig {
    pub(crate) fn from_env() -> Self {
        Self::with_overrides(|name| std::env::var(name).ok())
    }

    /// Unparseable overrides are logged and ignored.
    pub(crate) fn with_overrides(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let character_file = lookup(CHARACTER_FILE_ENV_VAR)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.character_file);
        Self {
            character_file,
            max_frames: parse_override(&lookup, MAX_FRAMES_ENV_VAR, defaults.max_frames),
            target_tps: parse_override(&lookup, TARGET_TPS_ENV_VAR, defaults.target_tps),
            realtime: parse_override(&lookup, REALTIME_ENV_VAR, defaults.realtime),
        }
    }

    pub(crate) fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            target_tps: self.target_tps,
            max_frames: self.max_frames,
            realtime: self.realtime,
        }
    }
}

fn parse_override<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    let Some(raw) = lookup(name) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(var = name, value = %raw, "config_override_ignored");
            default
        }
    }
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) initial_scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== ARPG Startup ===");

    let game_config = GameConfig::from_env();
    let initial_scene = build_initial_scene(&game_config)?;
    Ok(AppWiring {
        config: game_config.loop_config(),
        initial_scene,
    })
}

/// Loads (or creates) the hero and wires the first playing scene. This is
/// the only place player-state observers are registered.
pub(crate) fn build_initial_scene(config: &GameConfig) -> Result<Box<dyn Scene>, BootstrapError> {
    let (character, new_hero_was_created) = match load_character_file(&config.character_file)? {
        Some(character) => (character, false),
        None => (CharacterFile::new_hero(), true),
    };
    info!(
        path = %config.character_file.display(),
        new_hero = new_hero_was_created,
        world = %character.world,
        money = character.money,
        "character_loaded"
    );

    let path_finder = PathFinderHandle::default();
    let map = builtin_map(character.world)?;
    let mut game_engine =
        build_world(&map, PlayerState::new(character.money), path_finder.clone())?;
    path_finder.set_grid(Arc::clone(game_engine.game_state().pathfinder_wall_grid()));

    let ui_view = GameUiView::default().shared();
    let game_state = game_engine.game_state_mut();
    game_state.center_camera_on_player();
    ui_view
        .borrow_mut()
        .on_world_area_updated(game_state.entire_world_area(), game_state.camera_world_area());

    let mut subscriptions = ObserverSubscriptions::default();
    subscriptions.extend(register_game_engine_observers(&game_engine, &ui_view));
    subscriptions.extend(register_game_state_observers(
        game_engine.game_state(),
        &ui_view,
        true,
    ));

    let scene_factory = GameSceneFactory::new(path_finder);
    Ok(scene_factory.playing_scene(PlayingSceneArgs {
        game_engine,
        world_behavior: behavior_for(character.world),
        ui_view,
        subscriptions,
        new_hero_was_created,
        character_file: config.character_file.clone(),
        total_time_played_on_character: character.total_time_played(),
    }))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
