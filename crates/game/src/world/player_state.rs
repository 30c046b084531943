use engine::{Observers, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlayerStateEvent {
    MoneyChanged { money: u32 },
}

/// Per-player progress. Unlike the hero entity it is carried from one world
/// into the next, together with the observers subscribed to it.
#[derive(Debug, Default)]
pub(crate) struct PlayerState {
    money: u32,
    observers: Observers<PlayerStateEvent>,
}

impl PlayerState {
    pub(crate) fn new(money: u32) -> Self {
        Self {
            money,
            observers: Observers::default(),
        }
    }

    pub(crate) fn money(&self) -> u32 {
        self.money
    }

    pub(crate) fn add_money(&mut self, amount: u32) {
        if amount == 0 {
            return;
        }
        self.money = self.money.saturating_add(amount);
        self.observers.notify(&PlayerStateEvent::MoneyChanged { money: self.money });
    }

    pub(crate) fn subscribe(
        &self,
        callback: impl FnMut(&PlayerStateEvent) + 'static,
    ) -> Subscription {
        self.observers.subscribe(callback)
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.observers.subscriber_count()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn add_money_notifies_new_total() {
        let mut player_state = PlayerState::new(5);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _subscription = player_state.subscribe(move |event| sink.borrow_mut().push(*event));

        player_state.add_money(3);
        player_state.add_money(0);

        assert_eq!(player_state.money(), 8);
        assert_eq!(
            *seen.borrow(),
            vec![PlayerStateEvent::MoneyChanged { money: 8 }]
        );
    }
}
