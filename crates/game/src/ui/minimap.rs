use engine::{Rect, Vec2};

const TRAIL_CELL_SIZE: f32 = 32.0;

/// Overview of the current world. The exploration trail records the coarse
/// cells the hero has walked through.
#[derive(Debug, Default)]
pub(crate) struct Minimap {
    world_area: Option<Rect>,
    revealed_area: Option<Rect>,
    exploration_trail: Vec<(i32, i32)>,
}

impl Minimap {
    /// `camera_area` decides which walls start out revealed, so the camera
    /// has to be positioned before this is called.
    pub(crate) fn on_world_area_updated(&mut self, world_area: Rect, camera_area: Rect) {
        self.world_area = Some(world_area);
        self.revealed_area = Some(camera_area);
    }

    pub(crate) fn on_player_moved(&mut self, position: Vec2) {
        let cell = (
            (position.x / TRAIL_CELL_SIZE).floor() as i32,
            (position.y / TRAIL_CELL_SIZE).floor() as i32,
        );
        if !self.exploration_trail.contains(&cell) {
            self.exploration_trail.push(cell);
        }
    }

    pub(crate) fn clear_exploration(&mut self) {
        self.exploration_trail.clear();
    }

    #[cfg(test)]
    pub(crate) fn exploration_trail(&self) -> &[(i32, i32)] {
        &self.exploration_trail
    }

    pub(crate) fn world_area(&self) -> Option<Rect> {
        self.world_area
    }

    pub(crate) fn revealed_area(&self) -> Option<Rect> {
        self.revealed_area
    }
}
