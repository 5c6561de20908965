//! Easter-egg sequence matching and reward dispatch.
//!
//! Matching is stateless: the caller passes the history it owns. Firing a
//! reward is a separate step through [`RewardDispatcher`], keyed by the
//! reward's action identifier.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{Reward, SecretPattern};

/// A pattern that matched the tail of the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EasterEggMatch {
    pub id: String,
    pub name: String,
    pub description: String,
    pub reward: Reward,
}

impl EasterEggMatch {
    fn from_pattern(pattern: &SecretPattern) -> Self {
        Self {
            id: pattern.id.clone(),
            name: pattern.name.clone(),
            description: pattern.description.clone(),
            reward: pattern.reward.clone(),
        }
    }
}

/// Public listing entry; carries the hint, never the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EasterEggHint {
    pub id: String,
    pub name: String,
    pub hint: String,
}

pub const NO_HINT: &str = "No hint available.";

/// Compare the newest `pattern.len()` entries against the pattern.
fn tail_matches<S: AsRef<str>>(history: &[S], pattern: &SecretPattern) -> bool {
    let len = pattern.len();
    if len == 0 || history.len() < len {
        return false;
    }
    history[history.len() - len..]
        .iter()
        .zip(&pattern.sequence)
        .all(|(seen, expected)| seen.as_ref() == expected)
}

/// Matcher over a fixed, ordered set of secret patterns.
#[derive(Debug, Clone, Copy)]
pub struct SequenceMatcher<'a> {
    patterns: &'a [SecretPattern],
}

impl<'a> SequenceMatcher<'a> {
    pub fn new(patterns: &'a [SecretPattern]) -> Self {
        Self { patterns }
    }

    /// First pattern, in declaration order, whose sequence equals the end of
    /// `history`. `None` is the common case.
    pub fn check<S: AsRef<str>>(&self, history: &[S]) -> Option<EasterEggMatch> {
        self.patterns
            .iter()
            .find(|p| tail_matches(history, p))
            .map(EasterEggMatch::from_pattern)
    }

    /// Starting frequency and length, without the rest of the sequence.
    pub fn hint(&self, id: &str) -> String {
        match self.patterns.iter().find(|p| p.id == id) {
            Some(p) => match p.sequence.first() {
                Some(first) => format!(
                    "Start with frequency {} and enter a sequence of {} frequencies to unlock the {} easter egg.",
                    first,
                    p.len(),
                    p.name
                ),
                None => NO_HINT.to_string(),
            },
            None => NO_HINT.to_string(),
        }
    }

    pub fn catalog(&self) -> Vec<EasterEggHint> {
        self.patterns
            .iter()
            .map(|p| EasterEggHint {
                id: p.id.clone(),
                name: p.name.clone(),
                hint: self.hint(&p.id),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Reward dispatch
// ---------------------------------------------------------------------------

pub trait RewardHandler: Send + Sync {
    fn on_reward(&self, egg: &EasterEggMatch);
}

impl<F> RewardHandler for F
where
    F: Fn(&EasterEggMatch) + Send + Sync,
{
    fn on_reward(&self, egg: &EasterEggMatch) {
        self(egg)
    }
}

/// Routes a match to the handler registered for its reward action.
#[derive(Default, Clone)]
pub struct RewardDispatcher {
    handlers: HashMap<String, Arc<dyn RewardHandler>>,
}

impl RewardDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous one for `action`.
    pub fn register(&mut self, action: impl Into<String>, handler: impl RewardHandler + 'static) {
        self.handlers.insert(action.into(), Arc::new(handler));
    }

    pub fn with(mut self, action: impl Into<String>, handler: impl RewardHandler + 'static) -> Self {
        self.register(action, handler);
        self
    }

    /// Invoke the handler for `egg.reward.action`. Returns false if none is
    /// registered.
    pub fn dispatch(&self, egg: &EasterEggMatch) -> bool {
        match self.handlers.get(&egg.reward.action) {
            Some(handler) => {
                handler.on_reward(egg);
                true
            }
            None => {
                tracing::debug!(action = %egg.reward.action, "no handler for reward action");
                false
            }
        }
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for RewardDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewardDispatcher")
            .field("actions", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
