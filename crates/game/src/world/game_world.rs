use engine::{Camera2D, Millis, Rect, Vec2};

use super::WorldId;

const DEFAULT_SPEED_MULTIPLIER: f32 = 1.0;
const MIN_SPEED_MULTIPLIER: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct EntityId(pub(crate) u32);

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WorldEntity {
    pub(crate) id: EntityId,
    body: Rect,
    base_speed: f32,
    speed_multiplier: f32,
}

impl WorldEntity {
    pub(crate) fn new(id: EntityId, center: Vec2, size: f32, base_speed: f32) -> Self {
        Self {
            id,
            body: Rect::centered_on(center, size, size),
            base_speed,
            speed_multiplier: DEFAULT_SPEED_MULTIPLIER,
        }
    }

    pub(crate) fn body(&self) -> Rect {
        self.body
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.body.center()
    }

    pub(crate) fn move_by(&mut self, delta: Vec2) {
        self.body = self.body.translated(delta);
    }

    pub(crate) fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub(crate) fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.speed_multiplier = multiplier;
    }

    pub(crate) fn add_to_speed_multiplier(&mut self, amount: f32) {
        self.speed_multiplier = (self.speed_multiplier + amount).max(MIN_SPEED_MULTIPLIER);
    }

    /// World units per second.
    pub(crate) fn effective_speed(&self) -> f32 {
        self.base_speed * self.speed_multiplier
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Npc {
    pub(crate) entity: WorldEntity,
    pub(crate) path: Vec<Vec2>,
    pub(crate) repath_cooldown: Millis,
}

impl Npc {
    pub(crate) fn new(entity: WorldEntity) -> Self {
        Self {
            entity,
            path: Vec::new(),
            repath_cooldown: Millis::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PickupKind {
    Coin { value: u32 },
    SpeedShrine { bonus: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Pickup {
    pub(crate) area: Rect,
    pub(crate) kind: PickupKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Portal {
    pub(crate) area: Rect,
    pub(crate) destination: WorldId,
}

/// Entities, terrain and camera of one playable area.
#[derive(Debug, Clone)]
pub(crate) struct GameWorld {
    pub(crate) world_id: WorldId,
    pub(crate) player_entity: WorldEntity,
    pub(crate) npcs: Vec<Npc>,
    pub(crate) walls: Vec<Rect>,
    pub(crate) pickups: Vec<Pickup>,
    pub(crate) portals: Vec<Portal>,
    pub(crate) camera: Camera2D,
    pub(crate) entire_world_area: Rect,
}

impl GameWorld {
    pub(crate) fn set_hero_movement_speed(&mut self, multiplier: f32) {
        self.player_entity.set_speed_multiplier(multiplier);
    }

    /// True when `body` overlaps a wall or leaves the world area.
    pub(crate) fn is_blocked(&self, body: &Rect) -> bool {
        !self.entire_world_area.contains_rect(body)
            || self.walls.iter().any(|wall| wall.intersects(body))
    }

    pub(crate) fn coins_remaining(&self) -> usize {
        self.pickups
            .iter()
            .filter(|pickup| matches!(pickup.kind, PickupKind::Coin { .. }))
            .count()
    }
}
