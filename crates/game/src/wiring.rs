use std::rc::Rc;

use engine::Subscription;

use crate::ui::SharedUiView;
use crate::world::{GameEngine, GameEngineEvent, GameState, GameStateEvent, PlayerStateEvent};

/// Subscriptions that keep UI callbacks attached to one engine and its state.
/// Dropping the set detaches the UI from that world.
#[derive(Debug, Default)]
pub(crate) struct ObserverSubscriptions {
    subscriptions: Vec<Subscription>,
}

impl ObserverSubscriptions {
    pub(crate) fn extend(&mut self, subscriptions: Vec<Subscription>) {
        self.subscriptions.extend(subscriptions);
    }

    pub(crate) fn len(&self) -> usize {
        self.subscriptions.len()
    }
}

pub(crate) fn register_game_engine_observers(
    game_engine: &GameEngine,
    ui_view: &SharedUiView,
) -> Vec<Subscription> {
    let ui = Rc::downgrade(ui_view);
    vec![game_engine.subscribe(move |event| {
        let Some(ui) = ui.upgrade() else {
            return;
        };
        match event {
            GameEngineEvent::InfoMessage(text) => ui.borrow_mut().info_message.enqueue(text.clone()),
        }
    })]
}

/// Player-state callbacks are detached: the player state outlives every
/// world, so they must only be registered once per session.
pub(crate) fn register_game_state_observers(
    game_state: &GameState,
    ui_view: &SharedUiView,
    include_player_state: bool,
) -> Vec<Subscription> {
    let ui = Rc::downgrade(ui_view);
    let subscriptions = vec![game_state.subscribe(move |event| {
        let Some(ui) = ui.upgrade() else {
            return;
        };
        match event {
            GameStateEvent::PlayerMoved { position } => ui.borrow_mut().on_player_moved(*position),
        }
    })];

    if include_player_state {
        ui_view
            .borrow_mut()
            .on_money_updated(game_state.player_state().money());
        let ui = Rc::downgrade(ui_view);
        game_state
            .player_state()
            .subscribe(move |event| {
                let Some(ui) = ui.upgrade() else {
                    return;
                };
                match event {
                    PlayerStateEvent::MoneyChanged { money } => {
                        ui.borrow_mut().on_money_updated(*money)
                    }
                }
            })
            .detach();
    }

    subscriptions
}

#[cfg(test)]
mod tests {
    use engine::{Millis, PathFinderHandle, Vec2};

    use super::*;
    use crate::ui::GameUiView;
    use crate::world::{build_world, builtin_map, PlayerState, WorldId};

    fn town_engine() -> GameEngine {
        let map = builtin_map(WorldId::Town).expect("town");
        build_world(&map, PlayerState::new(3), PathFinderHandle::default()).expect("town")
    }

    #[test]
    fn state_observers_forward_movement_and_money() {
        let ui = GameUiView::default().shared();
        let mut engine = town_engine();
        let _engine_subs = register_game_engine_observers(&engine, &ui);
        let _state_subs = register_game_state_observers(engine.game_state(), &ui, true);
        assert_eq!(ui.borrow().money(), 3);

        for _ in 0..60 {
            engine.run_one_frame(Millis(16), Vec2::new(1.0, 0.0));
        }

        let ui = ui.borrow();
        assert_eq!(ui.money(), 8);
        assert!(!ui.minimap.exploration_trail().is_empty());
        assert_eq!(ui.info_message.messages(), vec!["Picked up 5 gold"]);
    }

    #[test]
    fn player_state_is_skipped_when_excluded() {
        let ui = GameUiView::default().shared();
        let engine = town_engine();
        let subs = register_game_state_observers(engine.game_state(), &ui, false);
        assert_eq!(subs.len(), 1);
        assert_eq!(engine.game_state().player_state().subscriber_count(), 0);
        assert_eq!(ui.borrow().money(), 0);
    }

    #[test]
    fn dropped_subscriptions_stop_forwarding() {
        let ui = GameUiView::default().shared();
        let mut engine = town_engine();
        let subs = register_game_state_observers(engine.game_state(), &ui, false);
        drop(subs);
        engine.run_one_frame(Millis(16), Vec2::new(1.0, 0.0));
        assert!(ui.borrow().minimap.exploration_trail().is_empty());
        assert_eq!(engine.game_state().subscriber_count(), 0);
    }
}
