mod factory;
mod playing;
mod switching_game_world;

pub(crate) use factory::{GameSceneFactory, PlayingSceneArgs, SceneFactory, SwitchingSceneArgs};
pub(crate) use playing::PlayingScene;
pub(crate) use switching_game_world::SwitchingGameWorldScene;
