use serde::{Deserialize, Serialize};

/// A named logical input. The set is closed: every key binding resolves to
/// one of these or to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Move along the view direction.
    Forward,
    /// Move against the view direction.
    Back,
    /// Strafe left.
    Left,
    /// Strafe right.
    Right,
    /// Rotate counter-clockwise seen from above (yaw increases).
    TurnLeft,
    /// Rotate clockwise seen from above (yaw decreases).
    TurnRight,
    /// Hold to highlight the object under the crosshair.
    Trigger,
}

impl Action {
    pub const COUNT: usize = 7;

    pub const ALL: [Action; Action::COUNT] = [
        Action::Forward,
        Action::Back,
        Action::Left,
        Action::Right,
        Action::TurnLeft,
        Action::TurnRight,
        Action::Trigger,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Held state for every action. Unset actions read as released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSet {
    held: [bool; Action::COUNT],
}

impl ActionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, action: Action, held: bool) {
        self.held[action.index()] = held;
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held[action.index()]
    }

    /// `positive - negative` with held flags counted as 0 or 1.
    ///
    /// Both held, or neither, yields 0.
    pub fn axis(&self, positive: Action, negative: Action) -> f32 {
        f32::from(u8::from(self.is_held(positive))) - f32::from(u8::from(self.is_held(negative)))
    }

    pub fn any_held(&self) -> bool {
        self.held.iter().any(|h| *h)
    }

    /// Release everything, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held = [false; Action::COUNT];
    }

    pub fn held(&self) -> impl Iterator<Item = Action> + '_ {
        Action::ALL.into_iter().filter(|a| self.is_held(*a))
    }
}
