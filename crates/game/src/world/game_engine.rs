use std::fmt;

use engine::{Millis, Observers, Subscription, Vec2};
use tracing::debug;

use super::{GameState, PickupKind, WorldId};

const NPC_AGGRO_RADIUS: f32 = 200.0;
const NPC_REPATH_INTERVAL: Millis = Millis(500);
const WAYPOINT_ARRIVAL_THRESHOLD: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum GameEngineEvent {
    InfoMessage(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FrameOutcome {
    pub(crate) entered_portal: Option<WorldId>,
}

/// Advances one world's simulation, one frame at a time.
pub(crate) struct GameEngine {
    game_state: GameState,
    observers: Observers<GameEngineEvent>,
}

impl fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let world = self.game_state.game_world();
        f.debug_struct("GameEngine")
            .field("world", &world.world_id)
            .field("hero", &world.player_entity.position())
            .field("npcs", &world.npcs.len())
            .field("observers", &self.observers)
            .finish()
    }
}

impl GameEngine {
    pub(crate) fn new(game_state: GameState) -> Self {
        Self {
            game_state,
            observers: Observers::default(),
        }
    }

    pub(crate) fn game_state(&self) -> &GameState {
        &self.game_state
    }

    pub(crate) fn game_state_mut(&mut self) -> &mut GameState {
        &mut self.game_state
    }

    pub(crate) fn into_game_state(self) -> GameState {
        self.game_state
    }

    pub(crate) fn subscribe(
        &self,
        callback: impl FnMut(&GameEngineEvent) + 'static,
    ) -> Subscription {
        self.observers.subscribe(callback)
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.observers.subscriber_count()
    }

    pub(crate) fn run_one_frame(&mut self, time_passed: Millis, direction: Vec2) -> FrameOutcome {
        self.move_hero(time_passed, direction);
        self.collect_pickups();
        self.update_npcs(time_passed);

        let hero_position = self.game_state.game_world().player_entity.position();
        let entered_portal = self
            .game_state
            .game_world()
            .portals
            .iter()
            .find(|portal| portal.area.contains_point(hero_position))
            .map(|portal| portal.destination);
        FrameOutcome { entered_portal }
    }

    /// Axis-separated movement so the hero slides along walls.
    fn move_hero(&mut self, time_passed: Millis, direction: Vec2) {
        if direction == Vec2::ZERO {
            return;
        }
        let world = self.game_state.game_world_mut();
        let distance = world.player_entity.effective_speed() * time_passed.as_seconds_f32();
        let step = direction.scaled(distance);

        let mut moved = false;
        for delta in [Vec2::new(step.x, 0.0), Vec2::new(0.0, step.y)] {
            if delta == Vec2::ZERO {
                continue;
            }
            let candidate = world.player_entity.body().translated(delta);
            if !world.is_blocked(&candidate) {
                world.player_entity.move_by(delta);
                moved = true;
            }
        }

        if moved {
            self.game_state.center_camera_on_player();
            self.game_state.notify_player_moved();
        }
    }

    fn collect_pickups(&mut self) {
        let hero_body = self.game_state.game_world().player_entity.body();
        let (collected, remaining) = self
            .game_state
            .game_world()
            .pickups
            .iter()
            .copied()
            .partition::<Vec<_>, _>(|pickup| pickup.area.intersects(&hero_body));
        if collected.is_empty() {
            return;
        }
        self.game_state.game_world_mut().pickups = remaining;

        for pickup in collected {
            match pickup.kind {
                PickupKind::Coin { value } => {
                    self.game_state.player_state_mut().add_money(value);
                    self.observers.notify(&GameEngineEvent::InfoMessage(format!(
                        "Picked up {value} gold"
                    )));
                }
                PickupKind::SpeedShrine { bonus } => {
                    self.game_state
                        .game_world_mut()
                        .player_entity
                        .add_to_speed_multiplier(bonus);
                    self.observers.notify(&GameEngineEvent::InfoMessage(
                        "You feel faster".to_string(),
                    ));
                }
            }
        }
    }

    fn update_npcs(&mut self, time_passed: Millis) {
        let hero_position = self.game_state.game_world().player_entity.position();
        let path_finder = self.game_state.path_finder().clone();
        let seconds = time_passed.as_seconds_f32();

        for npc in &mut self.game_state.game_world_mut().npcs {
            npc.repath_cooldown = npc.repath_cooldown.saturating_sub(time_passed);
            let npc_position = npc.entity.position();
            if npc.repath_cooldown == Millis::ZERO
                && npc_position.distance(hero_position) <= NPC_AGGRO_RADIUS
            {
                npc.path = path_finder
                    .find_path(npc_position, hero_position)
                    .unwrap_or_default();
                npc.repath_cooldown = NPC_REPATH_INTERVAL;
                debug!(
                    npc = npc.entity.id.0,
                    waypoints = npc.path.len(),
                    "npc_repathed"
                );
            }

            let mut budget = npc.entity.effective_speed() * seconds;
            while budget > 0.0 {
                let Some(&waypoint) = npc.path.first() else {
                    break;
                };
                let position = npc.entity.position();
                let offset = waypoint - position;
                let distance = offset.length();
                if distance <= WAYPOINT_ARRIVAL_THRESHOLD {
                    npc.entity.move_by(offset);
                    npc.path.remove(0);
                    continue;
                }
                let step = distance.min(budget);
                npc.entity.move_by(offset.normalized_or_zero().scaled(step));
                budget -= step;
            }
        }
    }
}
