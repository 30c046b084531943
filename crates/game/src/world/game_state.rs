use std::sync::Arc;

use engine::{Observers, PathFinderHandle, Rect, Subscription, Vec2, WallGrid};

use super::{GameWorld, PlayerState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum GameStateEvent {
    PlayerMoved { position: Vec2 },
}

pub(crate) struct GameState {
    game_world: GameWorld,
    player_state: PlayerState,
    pathfinder_wall_grid: Arc<WallGrid>,
    path_finder: PathFinderHandle,
    observers: Observers<GameStateEvent>,
}

impl GameState {
    /// The wall grid is derived from the world's walls; binding it to the
    /// path finder is up to whoever activates this state.
    pub(crate) fn new(
        game_world: GameWorld,
        player_state: PlayerState,
        cell_size: f32,
        path_finder: PathFinderHandle,
    ) -> Self {
        let pathfinder_wall_grid = Arc::new(WallGrid::from_walls(
            game_world.entire_world_area,
            cell_size,
            &game_world.walls,
        ));
        Self {
            game_world,
            player_state,
            pathfinder_wall_grid,
            path_finder,
            observers: Observers::default(),
        }
    }

    pub(crate) fn game_world(&self) -> &GameWorld {
        &self.game_world
    }

    pub(crate) fn game_world_mut(&mut self) -> &mut GameWorld {
        &mut self.game_world
    }

    pub(crate) fn player_state(&self) -> &PlayerState {
        &self.player_state
    }

    pub(crate) fn player_state_mut(&mut self) -> &mut PlayerState {
        &mut self.player_state
    }

    pub(crate) fn into_player_state(self) -> PlayerState {
        self.player_state
    }

    pub(crate) fn pathfinder_wall_grid(&self) -> &Arc<WallGrid> {
        &self.pathfinder_wall_grid
    }

    pub(crate) fn path_finder(&self) -> &PathFinderHandle {
        &self.path_finder
    }

    pub(crate) fn entire_world_area(&self) -> Rect {
        self.game_world.entire_world_area
    }

    pub(crate) fn camera_world_area(&self) -> Rect {
        self.game_world.camera.world_area()
    }

    pub(crate) fn center_camera_on_player(&mut self) {
        let hero_position = self.game_world.player_entity.position();
        self.game_world.camera.center_on(hero_position);
    }

    pub(crate) fn set_hero_movement_speed(&mut self, multiplier: f32) {
        self.game_world.set_hero_movement_speed(multiplier);
    }

    pub(crate) fn subscribe(
        &self,
        callback: impl FnMut(&GameStateEvent) + 'static,
    ) -> Subscription {
        self.observers.subscribe(callback)
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.observers.subscriber_count()
    }

    pub(crate) fn notify_player_moved(&self) {
        self.observers.notify(&GameStateEvent::PlayerMoved {
            position: self.game_world.player_entity.position(),
        });
    }
}
