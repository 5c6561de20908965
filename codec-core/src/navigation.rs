//! Navigation controller: the per-session codec state machine.
//!
//! ```text
//!  select / tune / key ──► NavigationController
//!                             │
//!          ┌──────────────────┼──────────────────────┐
//!          ▼                  ▼                      ▼
//!   registry lookup    SelectionHistory ──► SequenceMatcher
//!          │                                         │
//!          ▼                                         ▼
//!     Typewriter ──► RenderSnapshot ◄──── latest EasterEggMatch
//! ```
//!
//! All state lives in the controller value; nothing is global, so any number
//! of sessions can run side by side over one shared registry.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::history::SelectionHistory;
use crate::matcher::{EasterEggMatch, SequenceMatcher};
use crate::registry::CodecRegistry;
use crate::typewriter::{RevealMode, Typewriter};
use crate::types::{AccessibilityFlag, Direction, KeyInput};

/// Dialogue shown while tuned to a value the registry does not know.
pub const INVALID_FREQUENCY_TEXT: &str = "Invalid Frequency";

/// Character reference shown when no real character applies.
pub const PLACEHOLDER_CHARACTER: &str = "?";

// ─── State ────────────────────────────────────────────────────

/// What the receiver is tuned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum Tuning {
    /// A registry frequency.
    Locked(String),
    /// A value with no registry entry; carries the rejected input.
    Invalid(String),
}

impl Tuning {
    /// The registry value, if locked.
    pub fn frequency(&self) -> Option<&str> {
        match self {
            Self::Locked(v) => Some(v),
            Self::Invalid(_) => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityFlags {
    pub reduced_motion: bool,
    pub high_contrast: bool,
    pub disable_scanlines: bool,
}

impl AccessibilityFlags {
    pub fn get(&self, flag: AccessibilityFlag) -> bool {
        match flag {
            AccessibilityFlag::ReducedMotion => self.reduced_motion,
            AccessibilityFlag::HighContrast => self.high_contrast,
            AccessibilityFlag::DisableScanlines => self.disable_scanlines,
        }
    }

    fn toggle(&mut self, flag: AccessibilityFlag) -> bool {
        let slot = match flag {
            AccessibilityFlag::ReducedMotion => &mut self.reduced_motion,
            AccessibilityFlag::HighContrast => &mut self.high_contrast,
            AccessibilityFlag::DisableScanlines => &mut self.disable_scanlines,
        };
        *slot = !*slot;
        *slot
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    pub tuning: Tuning,
    pub projects_visible: bool,
    pub accessibility: AccessibilityFlags,
}

// ─── Outcomes ─────────────────────────────────────────────────

/// Result of a select or tune. Never an error: an unknown frequency is
/// reported through `error` and the invalid tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TuneOutcome {
    pub tuning: Tuning,
    pub error: Option<String>,
    pub easter_egg: Option<EasterEggMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "camelCase")]
pub enum KeyEffect {
    Tuned(TuneOutcome),
    PanelClosed,
    Ignored,
}

/// Character slot as the presentation layer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterView {
    pub id: String,
    pub title: String,
}

impl CharacterView {
    fn placeholder() -> Self {
        Self {
            id: PLACEHOLDER_CHARACTER.to_string(),
            title: PLACEHOLDER_CHARACTER.to_string(),
        }
    }
}

/// Everything the presentation layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSnapshot {
    pub tuning: Tuning,
    pub frequency_name: String,
    pub dialogue: String,
    pub dialogue_complete: bool,
    pub left: CharacterView,
    pub right: CharacterView,
    pub projects_visible: bool,
    pub accessibility: AccessibilityFlags,
    pub easter_egg: Option<EasterEggMatch>,
}

// ─── Controller ───────────────────────────────────────────────

pub struct NavigationController {
    registry: Arc<CodecRegistry>,
    clock: Arc<dyn Clock>,
    state: NavigationState,
    history: SelectionHistory,
    dialogue: Typewriter,
    easter_egg: Option<EasterEggMatch>,
}

impl NavigationController {
    /// New session tuned to the registry's first frequency. The initial
    /// tuning is not a user selection and is not recorded in the history.
    pub fn new(registry: Arc<CodecRegistry>, clock: Arc<dyn Clock>, char_delay: Duration) -> Self {
        let first = registry.first();
        let state = NavigationState {
            tuning: Tuning::Locked(first.value.clone()),
            projects_visible: first.opens_projects(),
            accessibility: AccessibilityFlags::default(),
        };
        let mut dialogue = Typewriter::new(char_delay);
        dialogue.start(&first.dialogue, RevealMode::Progressive, clock.now());
        let history = SelectionHistory::with_capacity(registry.max_pattern_len());

        Self {
            registry,
            clock,
            state,
            history,
            dialogue,
            easter_egg: None,
        }
    }

    /// Start with accessibility flags already set (e.g. from a
    /// `prefers-reduced-motion` media query).
    pub fn with_accessibility(mut self, flags: AccessibilityFlags) -> Self {
        self.state.accessibility = flags;
        if flags.reduced_motion {
            self.dialogue.skip();
        }
        self
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn history(&self) -> &SelectionHistory {
        &self.history
    }

    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    /// Most recent easter egg unlocked in this session.
    pub fn easter_egg(&self) -> Option<&EasterEggMatch> {
        self.easter_egg.as_ref()
    }

    fn reveal_mode(&self) -> RevealMode {
        RevealMode::for_reduced_motion(self.state.accessibility.reduced_motion)
    }

    /// Tune to `value`. Unknown values move to the invalid state instead of
    /// failing. Either way the value is recorded and patterns are checked.
    pub fn select_frequency(&mut self, value: &str) -> TuneOutcome {
        let now = self.clock.now();
        let error = match self.registry.lookup(value) {
            Some(freq) => {
                self.state.tuning = Tuning::Locked(freq.value.clone());
                self.state.projects_visible = freq.opens_projects();
                let mode = RevealMode::for_reduced_motion(self.state.accessibility.reduced_motion);
                self.dialogue.start(&freq.dialogue, mode, now);
                tracing::debug!(frequency = %freq.value, name = %freq.name, "tuned");
                None
            }
            None => {
                tracing::warn!("Invalid frequency selected: {}", value);
                self.state.tuning = Tuning::Invalid(value.to_string());
                self.state.projects_visible = false;
                self.dialogue
                    .start(INVALID_FREQUENCY_TEXT, RevealMode::Instant, now);
                Some(format!("Invalid frequency selected: {}", value))
            }
        };

        self.history.push(value);
        let easter_egg = SequenceMatcher::new(self.registry.patterns()).check(self.history.as_slice());
        if let Some(egg) = &easter_egg {
            tracing::info!(id = %egg.id, action = %egg.reward.action, "easter egg unlocked");
            self.easter_egg = Some(egg.clone());
        }

        TuneOutcome {
            tuning: self.state.tuning.clone(),
            error,
            easter_egg,
        }
    }

    /// Move one step through the registry's declared order, wrapping around.
    /// From the invalid state, up lands on the first entry and down on the last.
    pub fn tune(&mut self, direction: Direction) -> TuneOutcome {
        let len = self.registry.len();
        let current = self
            .state
            .tuning
            .frequency()
            .and_then(|v| self.registry.position(v));
        let next = match (current, direction) {
            (Some(i), Direction::Up) => (i + 1) % len,
            (Some(i), Direction::Down) => (i + len - 1) % len,
            (None, Direction::Up) => 0,
            (None, Direction::Down) => len - 1,
        };
        let value = match self.registry.get(next) {
            Some(freq) => freq.value.clone(),
            None => self.registry.first().value.clone(),
        };
        self.select_frequency(&value)
    }

    /// Flip the projects panel regardless of the current frequency.
    pub fn toggle_projects_panel(&mut self) -> bool {
        self.state.projects_visible = !self.state.projects_visible;
        self.state.projects_visible
    }

    /// Hide the projects panel. Returns whether it was visible.
    pub fn close_projects_panel(&mut self) -> bool {
        std::mem::replace(&mut self.state.projects_visible, false)
    }

    /// Flip one accessibility flag and return its new value. Turning reduced
    /// motion on finishes the current reveal at once.
    pub fn toggle_accessibility(&mut self, flag: AccessibilityFlag) -> bool {
        let enabled = self.state.accessibility.toggle(flag);
        if flag == AccessibilityFlag::ReducedMotion && enabled {
            self.dialogue.skip();
        }
        enabled
    }

    pub fn handle_key(&mut self, key: KeyInput) -> KeyEffect {
        match key {
            KeyInput::ArrowUp => KeyEffect::Tuned(self.tune(Direction::Up)),
            KeyInput::ArrowDown => KeyEffect::Tuned(self.tune(Direction::Down)),
            KeyInput::Escape if self.state.projects_visible => {
                self.close_projects_panel();
                KeyEffect::PanelClosed
            }
            KeyInput::Escape | KeyInput::Other => KeyEffect::Ignored,
        }
    }

    /// Complete the in-flight reveal immediately.
    pub fn skip_reveal(&mut self) {
        self.dialogue.skip();
    }

    /// Replay the current dialogue from the start.
    pub fn replay_dialogue(&mut self) {
        let text = self.dialogue.target().to_string();
        let mode = match self.state.tuning {
            Tuning::Locked(_) => self.reveal_mode(),
            Tuning::Invalid(_) => RevealMode::Instant,
        };
        self.dialogue.start(&text, mode, self.clock.now());
    }

    /// Advance the reveal to the clock's current time and describe the frame.
    pub fn render(&mut self) -> RenderSnapshot {
        self.dialogue.advance(self.clock.now());

        let (frequency_name, left, right) = match &self.state.tuning {
            Tuning::Locked(value) => match self.registry.lookup(value) {
                Some(freq) => (
                    freq.name.clone(),
                    self.character_view(&freq.left),
                    self.character_view(&freq.right),
                ),
                None => invalid_view(),
            },
            Tuning::Invalid(_) => invalid_view(),
        };

        RenderSnapshot {
            tuning: self.state.tuning.clone(),
            frequency_name,
            dialogue: self.dialogue.displayed().to_string(),
            dialogue_complete: !self.dialogue.is_revealing(),
            left,
            right,
            projects_visible: self.state.projects_visible,
            accessibility: self.state.accessibility,
            easter_egg: self.easter_egg.clone(),
        }
    }

    fn character_view(&self, id: &str) -> CharacterView {
        match self.registry.character(id) {
            Some(c) => CharacterView {
                id: c.id.clone(),
                title: c.title.clone(),
            },
            None => CharacterView::placeholder(),
        }
    }
}

fn invalid_view() -> (String, CharacterView, CharacterView) {
    (
        "Invalid".to_string(),
        CharacterView::placeholder(),
        CharacterView::placeholder(),
    )
}

impl std::fmt::Debug for NavigationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationController")
            .field("state", &self.state)
            .field("history", &self.history)
            .field("dialogue", &self.dialogue)
            .field("easter_egg", &self.easter_egg)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VirtualClock;

    const DELAY: Duration = Duration::from_millis(50);

    fn controller() -> (NavigationController, Arc<VirtualClock>) {
        let registry = Arc::new(CodecRegistry::builtin().unwrap());
        let clock = Arc::new(VirtualClock::new());
        let nav = NavigationController::new(registry, clock.clone(), DELAY);
        (nav, clock)
    }

    #[test]
    fn starts_on_first_frequency_with_empty_history() {
        let (mut nav, _clock) = controller();
        assert_eq!(nav.state().tuning, Tuning::Locked("140.85".into()));
        assert!(!nav.state().projects_visible);
        assert!(nav.history().is_empty());
        let snap = nav.render();
        assert_eq!(snap.frequency_name, "HOME");
        assert_eq!(snap.dialogue, "");
        assert!(!snap.dialogue_complete);
    }

    #[test]
    fn select_sets_tuning_and_dialogue_source() {
        let (mut nav, clock) = controller();
        let outcome = nav.select_frequency("142.52");
        assert_eq!(outcome.tuning, Tuning::Locked("142.52".into()));
        assert!(outcome.error.is_none());

        clock.advance(Duration::from_secs(3_600));
        let snap = nav.render();
        let contact = nav.registry().lookup("142.52").unwrap().dialogue.clone();
        assert_eq!(snap.dialogue, contact);
        assert!(snap.dialogue_complete);
        assert_eq!(snap.left.title, "DEV-TEAM");
        assert_eq!(snap.right.title, "CONTACT");
    }

    #[test]
    fn invalid_selection_shows_fallback_and_records_history() {
        let (mut nav, _clock) = controller();
        let outcome = nav.select_frequency("999.99");
        assert_eq!(outcome.tuning, Tuning::Invalid("999.99".into()));
        assert_eq!(
            outcome.error.as_deref(),
            Some("Invalid frequency selected: 999.99")
        );
        assert_eq!(nav.history().last(), Some("999.99"));

        let snap = nav.render();
        assert_eq!(snap.dialogue, INVALID_FREQUENCY_TEXT);
        assert!(snap.dialogue_complete);
        assert_eq!(snap.left.id, PLACEHOLDER_CHARACTER);
        assert_eq!(snap.right.id, PLACEHOLDER_CHARACTER);
        assert_eq!(snap.frequency_name, "Invalid");
    }

    #[test]
    fn tune_wraps_both_ways() {
        let (mut nav, _clock) = controller();
        assert_eq!(nav.tune(Direction::Down).tuning, Tuning::Locked("142.52".into()));
        assert_eq!(nav.tune(Direction::Up).tuning, Tuning::Locked("140.85".into()));
    }

    #[test]
    fn tune_from_invalid_state() {
        let (mut nav, _clock) = controller();
        nav.select_frequency("000.00");
        assert_eq!(nav.tune(Direction::Up).tuning, Tuning::Locked("140.85".into()));
        nav.select_frequency("000.00");
        assert_eq!(nav.tune(Direction::Down).tuning, Tuning::Locked("142.52".into()));
    }

    #[test]
    fn projects_panel_follows_frequency_and_manual_toggle() {
        let (mut nav, _clock) = controller();
        nav.select_frequency("141.80");
        assert!(nav.state().projects_visible);
        assert!(!nav.toggle_projects_panel());
        assert!(nav.toggle_projects_panel());
        nav.select_frequency("141.12");
        assert!(!nav.state().projects_visible);
        assert!(nav.toggle_projects_panel());
    }

    #[test]
    fn escape_closes_only_a_visible_panel() {
        let (mut nav, _clock) = controller();
        assert_eq!(nav.handle_key(KeyInput::Escape), KeyEffect::Ignored);
        nav.select_frequency("141.80");
        assert_eq!(nav.handle_key(KeyInput::Escape), KeyEffect::PanelClosed);
        assert!(!nav.state().projects_visible);
        assert_eq!(nav.state().tuning, Tuning::Locked("141.80".into()));
    }

    #[test]
    fn arrow_keys_tune() {
        let (mut nav, _clock) = controller();
        match nav.handle_key(KeyInput::ArrowUp) {
            KeyEffect::Tuned(outcome) => {
                assert_eq!(outcome.tuning, Tuning::Locked("141.12".into()))
            }
            other => panic!("unexpected {:?}", other),
        }
        match nav.handle_key(KeyInput::ArrowDown) {
            KeyEffect::Tuned(outcome) => {
                assert_eq!(outcome.tuning, Tuning::Locked("140.85".into()))
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(nav.handle_key(KeyInput::Other), KeyEffect::Ignored);
        assert_eq!(nav.history().len(), 2);
    }

    #[test]
    fn accessibility_toggles_leave_navigation_alone() {
        let (mut nav, _clock) = controller();
        nav.select_frequency("141.12");
        let before = nav.history().len();
        assert!(nav.toggle_accessibility(AccessibilityFlag::HighContrast));
        assert!(nav.toggle_accessibility(AccessibilityFlag::DisableScanlines));
        assert!(!nav.toggle_accessibility(AccessibilityFlag::HighContrast));
        assert_eq!(nav.history().len(), before);
        assert_eq!(nav.state().tuning, Tuning::Locked("141.12".into()));
        assert!(!nav.state().accessibility.high_contrast);
        assert!(nav.state().accessibility.disable_scanlines);
    }

    #[test]
    fn reduced_motion_mid_reveal_completes_dialogue() {
        let (mut nav, clock) = controller();
        nav.select_frequency("141.12");
        clock.advance(DELAY * 3);
        assert_eq!(nav.render().dialogue, "ABO");

        nav.toggle_accessibility(AccessibilityFlag::ReducedMotion);
        let snap = nav.render();
        assert!(snap.dialogue_complete);
        assert!(snap.dialogue.starts_with("ABOUT ME"));

        nav.select_frequency("140.85");
        let snap = nav.render();
        assert!(snap.dialogue_complete);
        assert!(snap.dialogue.starts_with("Welcome"));
    }

    #[test]
    fn with_accessibility_applies_reduced_motion_to_initial_dialogue() {
        let (nav, _clock) = controller();
        let mut nav = nav.with_accessibility(AccessibilityFlags {
            reduced_motion: true,
            ..AccessibilityFlags::default()
        });
        let snap = nav.render();
        assert!(snap.dialogue_complete);
        assert!(snap.dialogue.starts_with("Welcome"));
    }

    #[test]
    fn easter_egg_persists_until_replaced() {
        let (mut nav, _clock) = controller();
        nav.select_frequency("141.80");
        nav.select_frequency("140.85");
        let outcome = nav.select_frequency("141.52");
        assert_eq!(outcome.easter_egg.as_ref().map(|e| e.id.as_str()), Some("mgs2"));

        let next = nav.select_frequency("141.12");
        assert!(next.easter_egg.is_none());
        assert_eq!(nav.easter_egg().map(|e| e.id.as_str()), Some("mgs2"));
        assert_eq!(
            nav.render().easter_egg.map(|e| e.reward.action),
            Some("enableRaidenTheme".to_string())
        );
    }

    #[test]
    fn skip_and_replay() {
        let (mut nav, clock) = controller();
        nav.skip_reveal();
        assert!(nav.render().dialogue.starts_with("Welcome"));

        nav.replay_dialogue();
        assert_eq!(nav.render().dialogue, "");
        clock.advance(DELAY);
        assert_eq!(nav.render().dialogue, "W");
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let (mut nav, _clock) = controller();
        let json = serde_json::to_value(nav.render()).unwrap();
        assert_eq!(json["tuning"]["status"], "locked");
        assert_eq!(json["tuning"]["value"], "140.85");
        assert_eq!(json["frequencyName"], "HOME");
        assert_eq!(json["projectsVisible"], false);
        assert_eq!(json["accessibility"]["reducedMotion"], false);
        assert!(json["easterEgg"].is_null());
    }
}
