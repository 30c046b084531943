use engine::Millis;

use super::{GameState, WorldId};

/// Area-specific rules layered above the base engine. Returned strings are
/// shown to the player as info messages.
pub(crate) trait WorldBehavior {
    fn debug_name(&self) -> &'static str;

    fn on_startup(&mut self, new_hero_was_created: bool) -> Vec<String>;

    fn control(&mut self, time_passed: Millis, game_state: &GameState) -> Vec<String>;
}

pub(crate) fn behavior_for(world_id: WorldId) -> Box<dyn WorldBehavior> {
    match world_id {
        WorldId::Town => Box::new(TownBehavior),
        WorldId::Dungeon => Box::new(DungeonBehavior::default()),
    }
}

#[derive(Debug, Default)]
pub(crate) struct TownBehavior;

impl WorldBehavior for TownBehavior {
    fn debug_name(&self) -> &'static str {
        "town"
    }

    fn on_startup(&mut self, new_hero_was_created: bool) -> Vec<String> {
        if new_hero_was_created {
            vec![
                "Welcome, traveler!".to_string(),
                "A portal to the east leads into the dungeon".to_string(),
            ]
        } else {
            vec!["You are back in town".to_string()]
        }
    }

    fn control(&mut self, _time_passed: Millis, _game_state: &GameState) -> Vec<String> {
        Vec::new()
    }
}

#[derive(Debug, Default)]
pub(crate) struct DungeonBehavior {
    time_inside: Millis,
    cleared_announced: bool,
}

impl DungeonBehavior {
    #[cfg(test)]
    pub(crate) fn time_inside(&self) -> Millis {
        self.time_inside
    }
}

impl WorldBehavior for DungeonBehavior {
    fn debug_name(&self) -> &'static str {
        "dungeon"
    }

    fn on_startup(&mut self, _new_hero_was_created: bool) -> Vec<String> {
        vec!["You descend into the dungeon".to_string()]
    }

    fn control(&mut self, time_passed: Millis, game_state: &GameState) -> Vec<String> {
        self.time_inside = self.time_inside.saturating_add(time_passed);
        if self.cleared_announced || game_state.game_world().coins_remaining() > 0 {
            return Vec::new();
        }
        self.cleared_announced = true;
        vec![format!(
            "Every coin collected after {}s. The way back is to the north-east",
            self.time_inside.0 / 1000
        )]
    }
}
