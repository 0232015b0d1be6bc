use crate::action::{Action, ActionSet};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Map from key identifier to action.
///
/// Key identifiers are the DOM `KeyboardEvent.key` spellings (`"w"`,
/// `"ArrowLeft"`); hosts translate their native key events into these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyBindings {
    keys: BTreeMap<String, Action>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_pairs([
            ("w", Action::Forward),
            ("s", Action::Back),
            ("a", Action::Left),
            ("d", Action::Right),
            ("ArrowLeft", Action::TurnLeft),
            ("ArrowRight", Action::TurnRight),
            ("f", Action::Trigger),
        ])
    }
}

impl KeyBindings {
    /// Bindings with no keys at all.
    pub fn empty() -> Self {
        Self {
            keys: BTreeMap::new(),
        }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, Action)>) -> Self {
        Self {
            keys: pairs
                .into_iter()
                .map(|(key, action)| (key.to_string(), action))
                .collect(),
        }
    }

    pub fn bind(&mut self, key: impl Into<String>, action: Action) {
        self.keys.insert(key.into(), action);
    }

    pub fn action_for(&self, key: &str) -> Option<Action> {
        self.keys.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Action)> + '_ {
        self.keys.iter().map(|(k, a)| (k.as_str(), *a))
    }
}

/// Input state: bindings plus the live [`ActionSet`].
///
/// The only writer of the action set. Key events for unbound identifiers are
/// dropped without error. An action stays held while any key bound to it is
/// down.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    bindings: KeyBindings,
    actions: ActionSet,
    held_keys: BTreeSet<String>,
}

impl InputState {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            actions: ActionSet::new(),
            held_keys: BTreeSet::new(),
        }
    }

    /// Key pressed. Returns the action it maps to, if any.
    pub fn key_down(&mut self, key: &str) -> Option<Action> {
        self.apply(key, true)
    }

    /// Key released. Returns the action it maps to, if any.
    pub fn key_up(&mut self, key: &str) -> Option<Action> {
        self.apply(key, false)
    }

    pub fn handle_key(&mut self, key: &str, pressed: bool) -> Option<Action> {
        self.apply(key, pressed)
    }

    fn apply(&mut self, key: &str, pressed: bool) -> Option<Action> {
        let Some(action) = self.bindings.action_for(key) else {
            tracing::trace!(key, pressed, "unbound key ignored");
            return None;
        };
        if pressed {
            self.held_keys.insert(key.to_string());
        } else {
            self.held_keys.remove(key);
        }
        let held = self
            .held_keys
            .iter()
            .any(|k| self.bindings.action_for(k) == Some(action));
        self.actions.set(action, held);
        tracing::trace!(key, ?action, pressed, held, "action updated");
        Some(action)
    }

    pub fn actions(&self) -> &ActionSet {
        &self.actions
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn release_all(&mut self) {
        self.held_keys.clear();
        self.actions.release_all();
    }
}
