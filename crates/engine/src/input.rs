use crate::geometry::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Quit,
}

const ACTION_COUNT: usize = 5;

#[derive(Debug, Clone, Copy, Default)]
struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Quit => 4,
        }
    }
}

/// Input state sampled once per simulation tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    actions: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn quit_requested(&self) -> bool {
        self.is_down(InputAction::Quit)
    }

    /// Screen-space movement direction (y grows downward), normalized so
    /// diagonals are not faster than straight moves.
    pub fn movement_direction(&self) -> Vec2 {
        let mut direction = Vec2::ZERO;
        if self.is_down(InputAction::MoveUp) {
            direction.y -= 1.0;
        }
        if self.is_down(InputAction::MoveDown) {
            direction.y += 1.0;
        }
        if self.is_down(InputAction::MoveLeft) {
            direction.x -= 1.0;
        }
        if self.is_down(InputAction::MoveRight) {
            direction.x += 1.0;
        }
        direction.normalized_or_zero()
    }
}
