mod behavior;
mod builder;
mod game_engine;
mod game_state;
mod game_world;
mod map_data;
mod player_state;

use std::fmt;

use serde::{Deserialize, Serialize};

pub(crate) use behavior::{behavior_for, WorldBehavior};
pub(crate) use builder::{build_world, MapWorldBuilder, WorldBuildError, WorldBuilder};
pub(crate) use game_engine::{GameEngine, GameEngineEvent};
pub(crate) use game_state::{GameState, GameStateEvent};
pub(crate) use game_world::{GameWorld, Npc, Pickup, PickupKind, Portal, WorldEntity};
pub(crate) use map_data::{builtin_map, MapData};
pub(crate) use player_state::{PlayerState, PlayerStateEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum WorldId {
    Town,
    Dungeon,
}

impl WorldId {
    pub(crate) fn as_token(self) -> &'static str {
        match self {
            Self::Town => "town",
            Self::Dungeon => "dungeon",
        }
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}
