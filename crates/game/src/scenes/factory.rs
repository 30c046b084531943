use std::path::PathBuf;
use std::rc::Rc;

use engine::{Millis, PathFinderHandle, Scene};

use super::{PlayingScene, SwitchingGameWorldScene};
use crate::ui::SharedUiView;
use crate::wiring::ObserverSubscriptions;
use crate::world::{GameEngine, WorldBehavior, WorldBuilder};

pub(crate) struct PlayingSceneArgs {
    /// Owns the game state of the world being played.
    pub(crate) game_engine: GameEngine,
    pub(crate) world_behavior: Box<dyn WorldBehavior>,
    pub(crate) ui_view: SharedUiView,
    pub(crate) subscriptions: ObserverSubscriptions,
    pub(crate) new_hero_was_created: bool,
    pub(crate) character_file: PathBuf,
    pub(crate) total_time_played_on_character: Millis,
}

pub(crate) struct SwitchingSceneArgs {
    pub(crate) game_engine: GameEngine,
    pub(crate) ui_view: SharedUiView,
    pub(crate) character_file: PathBuf,
    pub(crate) total_time_played_on_character: Millis,
    pub(crate) world_builder: Box<dyn WorldBuilder>,
}

/// Constructs the scenes that make up a play session. Scenes keep an `Rc` to
/// the factory so they can build their successors.
pub(crate) trait SceneFactory {
    fn playing_scene(self: Rc<Self>, args: PlayingSceneArgs) -> Box<dyn Scene>;

    fn switching_game_world_scene(self: Rc<Self>, args: SwitchingSceneArgs) -> Box<dyn Scene>;
}

#[derive(Debug, Clone)]
pub(crate) struct GameSceneFactory {
    path_finder: PathFinderHandle,
}

impl GameSceneFactory {
    pub(crate) fn new(path_finder: PathFinderHandle) -> Rc<Self> {
        Rc::new(Self { path_finder })
    }
}

impl SceneFactory for GameSceneFactory {
    fn playing_scene(self: Rc<Self>, args: PlayingSceneArgs) -> Box<dyn Scene> {
        Box::new(PlayingScene::new(self, args))
    }

    fn switching_game_world_scene(self: Rc<Self>, args: SwitchingSceneArgs) -> Box<dyn Scene> {
        let path_finder = self.path_finder.clone();
        Box::new(SwitchingGameWorldScene::new(self, path_finder, args))
    }
}
