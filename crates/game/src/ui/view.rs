use std::cell::RefCell;
use std::rc::Rc;

use engine::{Millis, Rect, Vec2};
use tracing::debug;

use super::{InfoMessage, Minimap};

pub(crate) type SharedUiView = Rc<RefCell<GameUiView>>;

/// On-screen HUD state. Lives for the whole session, across world switches.
#[derive(Debug, Default)]
pub(crate) struct GameUiView {
    pub(crate) info_message: InfoMessage,
    pub(crate) minimap: Minimap,
    money: u32,
    world_area_updates: u32,
}

impl GameUiView {
    pub(crate) fn shared(self) -> SharedUiView {
        Rc::new(RefCell::new(self))
    }

    pub(crate) fn on_world_area_updated(&mut self, world_area: Rect, camera_area: Rect) {
        self.world_area_updates = self.world_area_updates.saturating_add(1);
        self.minimap.on_world_area_updated(world_area, camera_area);
        if let (Some(world), Some(revealed)) =
            (self.minimap.world_area(), self.minimap.revealed_area())
        {
            debug!(
                updates = self.world_area_updates,
                world_w = world.w,
                world_h = world.h,
                revealed_x = revealed.x,
                revealed_y = revealed.y,
                "minimap_world_updated"
            );
        }
    }

    pub(crate) fn on_player_moved(&mut self, position: Vec2) {
        self.minimap.on_player_moved(position);
    }

    pub(crate) fn on_money_updated(&mut self, money: u32) {
        self.money = money;
        debug!(money = self.money, "hud_money_updated");
    }

    pub(crate) fn tick(&mut self, time_passed: Millis) {
        self.info_message.tick(time_passed);
    }

    #[cfg(test)]
    pub(crate) fn money(&self) -> u32 {
        self.money
    }

    #[cfg(test)]
    pub(crate) fn world_area_updates(&self) -> u32 {
        self.world_area_updates
    }
}
