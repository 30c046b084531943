use engine::{Camera2D, PathFinderHandle, Rect, DEFAULT_CAMERA_SIZE};
use thiserror::Error;
use tracing::info;

use super::game_world::EntityId;
use super::{
    behavior_for, builtin_map, GameEngine, GameState, GameWorld, MapData, Npc, Pickup,
    PickupKind, PlayerState, Portal, WorldBehavior, WorldEntity, WorldId,
};

const HERO_SIZE: f32 = 16.0;
const HERO_BASE_SPEED: f32 = 120.0;
const NPC_SIZE: f32 = 12.0;
const NPC_BASE_SPEED: f32 = 60.0;
const COIN_SIZE: f32 = 12.0;
const SPEED_SHRINE_SIZE: f32 = 16.0;
const SPEED_SHRINE_BONUS: f32 = 0.2;

#[derive(Debug, Error)]
pub(crate) enum WorldBuildError {
    #[error("failed to parse map json at {path}: {source}")]
    MapParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("map {world} has an empty world area")]
    EmptyWorldArea { world: WorldId },
    #[error("map file for {expected} declares world {actual}")]
    MapIdMismatch { expected: WorldId, actual: WorldId },
    #[error("hero spawn ({x}, {y}) in {world} is blocked")]
    HeroSpawnBlocked { world: WorldId, x: f32, y: f32 },
}

/// Builds the world that replaces `previous`. The previous engine is
/// consumed; anything carried over (the player state) is moved out of it.
pub(crate) trait WorldBuilder {
    fn build(
        &mut self,
        previous: GameEngine,
        path_finder: &PathFinderHandle,
    ) -> Result<(GameEngine, Box<dyn WorldBehavior>), WorldBuildError>;
}

impl<F> WorldBuilder for F
where
    F: FnMut(
        GameEngine,
        &PathFinderHandle,
    ) -> Result<(GameEngine, Box<dyn WorldBehavior>), WorldBuildError>,
{
    fn build(
        &mut self,
        previous: GameEngine,
        path_finder: &PathFinderHandle,
    ) -> Result<(GameEngine, Box<dyn WorldBehavior>), WorldBuildError> {
        self(previous, path_finder)
    }
}

/// Loads one of the built-in maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MapWorldBuilder {
    destination: WorldId,
}

impl MapWorldBuilder {
    pub(crate) fn new(destination: WorldId) -> Self {
        Self { destination }
    }
}

impl WorldBuilder for MapWorldBuilder {
    fn build(
        &mut self,
        previous: GameEngine,
        path_finder: &PathFinderHandle,
    ) -> Result<(GameEngine, Box<dyn WorldBehavior>), WorldBuildError> {
        let map = builtin_map(self.destination)?;
        let player_state = previous.into_game_state().into_player_state();
        let engine = build_world(&map, player_state, path_finder.clone())?;
        Ok((engine, behavior_for(self.destination)))
    }
}

pub(crate) fn build_world(
    map: &MapData,
    player_state: PlayerState,
    path_finder: PathFinderHandle,
) -> Result<GameEngine, WorldBuildError> {
    let hero = WorldEntity::new(EntityId(0), map.hero_spawn, HERO_SIZE, HERO_BASE_SPEED);
    let npcs = map
        .npcs
        .iter()
        .enumerate()
        .map(|(index, position)| {
            let id = EntityId(index as u32 + 1);
            Npc::new(WorldEntity::new(id, *position, NPC_SIZE, NPC_BASE_SPEED))
        })
        .collect();

    let coins = map.coins.iter().map(|coin| Pickup {
        area: Rect::centered_on(coin.position, COIN_SIZE, COIN_SIZE),
        kind: PickupKind::Coin { value: coin.value },
    });
    let shrines = map.speed_shrines.iter().map(|position| Pickup {
        area: Rect::centered_on(*position, SPEED_SHRINE_SIZE, SPEED_SHRINE_SIZE),
        kind: PickupKind::SpeedShrine {
            bonus: SPEED_SHRINE_BONUS,
        },
    });

    let game_world = GameWorld {
        world_id: map.world_id,
        player_entity: hero,
        npcs,
        walls: map.walls.clone(),
        pickups: coins.chain(shrines).collect(),
        portals: map
            .portals
            .iter()
            .map(|portal| Portal {
                area: portal.area,
                destination: portal.destination,
            })
            .collect(),
        camera: Camera2D::with_size(DEFAULT_CAMERA_SIZE.x, DEFAULT_CAMERA_SIZE.y),
        entire_world_area: map.world_area(),
    };

    if game_world.is_blocked(&game_world.player_entity.body()) {
        return Err(WorldBuildError::HeroSpawnBlocked {
            world: map.world_id,
            x: map.hero_spawn.x,
            y: map.hero_spawn.y,
        });
    }

    let game_state = GameState::new(game_world, player_state, map.cell_size, path_finder);
    info!(
        world = %map.world_id,
        npcs = game_state.game_world().npcs.len(),
        pickups = game_state.game_world().pickups.len(),
        blocked_cells = game_state.pathfinder_wall_grid().blocked_cell_count(),
        "world_built"
    );
    Ok(GameEngine::new(game_state))
}
