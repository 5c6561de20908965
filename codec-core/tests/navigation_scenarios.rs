//! End-to-end navigation scenarios over the built-in registry.
//!
//! Time is driven by a `VirtualClock`, so reveal timing is exact.

use std::sync::Arc;
use std::time::Duration;

use codec_core::{
    AccessibilityFlag, CodecRegistry, Direction, NavigationController, RevealMode, Typewriter,
    Tuning, VirtualClock, INVALID_FREQUENCY_TEXT,
};

const DELAY: Duration = Duration::from_millis(30);

fn session() -> (NavigationController, Arc<VirtualClock>) {
    let registry = Arc::new(CodecRegistry::builtin().unwrap());
    let clock = Arc::new(VirtualClock::new());
    let nav = NavigationController::new(registry, clock.clone(), DELAY);
    (nav, clock)
}

fn locked(value: &str) -> Tuning {
    Tuning::Locked(value.to_string())
}

#[test]
fn every_registry_frequency_is_selectable() {
    let (mut nav, clock) = session();
    let frequencies = nav.registry().frequencies().to_vec();
    for freq in frequencies {
        let outcome = nav.select_frequency(&freq.value);
        assert_eq!(outcome.tuning, locked(&freq.value));
        assert!(outcome.error.is_none());

        clock.advance(DELAY * (freq.dialogue.chars().count() as u32));
        let snap = nav.render();
        assert_eq!(snap.dialogue, freq.dialogue);
        assert_eq!(snap.frequency_name, freq.name);
    }
}

#[test]
fn tuning_up_walks_registry_and_toggles_projects_panel() {
    let (mut nav, _clock) = session();
    assert_eq!(nav.state().tuning, locked("140.85"));

    nav.tune(Direction::Up);
    assert_eq!(nav.state().tuning, locked("141.12"));
    assert!(!nav.state().projects_visible);

    nav.tune(Direction::Up);
    assert_eq!(nav.state().tuning, locked("141.80"));
    assert!(nav.state().projects_visible);

    nav.tune(Direction::Up);
    assert_eq!(nav.state().tuning, locked("142.52"));
    assert!(!nav.state().projects_visible);

    nav.tune(Direction::Up);
    assert_eq!(nav.state().tuning, locked("140.85"));
}

#[test]
fn tune_is_a_cycle_with_period_equal_to_registry_size() {
    let (mut nav, _clock) = session();
    let len = nav.registry().len();
    for start in nav.registry().frequencies().to_vec() {
        nav.select_frequency(&start.value);
        for _ in 0..len {
            nav.tune(Direction::Up);
        }
        assert_eq!(nav.state().tuning, locked(&start.value));

        nav.tune(Direction::Up);
        nav.tune(Direction::Down);
        assert_eq!(nav.state().tuning, locked(&start.value));
    }
}

#[test]
fn unknown_frequency_falls_back_without_losing_history() {
    let (mut nav, _clock) = session();
    let outcome = nav.select_frequency("999.99");
    assert!(outcome.tuning.is_invalid());
    assert!(outcome.error.is_some());
    assert_eq!(nav.history().last(), Some("999.99"));

    let snap = nav.render();
    assert_eq!(snap.dialogue, INVALID_FREQUENCY_TEXT);
    assert!(!snap.projects_visible);
}

#[test]
fn every_selection_appends_exactly_one_history_entry() {
    let (mut nav, _clock) = session();
    nav.select_frequency("140.85");
    nav.select_frequency("123.45");
    nav.tune(Direction::Up);
    nav.toggle_projects_panel();
    nav.toggle_accessibility(AccessibilityFlag::HighContrast);
    assert_eq!(
        nav.history().iter().collect::<Vec<_>>(),
        vec!["140.85", "123.45", "140.85"]
    );
}

#[test]
fn konami_sequence_unlocks_through_mixed_valid_and_invalid_frequencies() {
    let (mut nav, _clock) = session();
    let sequence = [
        "140.96", "140.96", "141.12", "141.12", "141.80", "141.52", "141.80", "141.52", "141.24",
    ];
    for value in sequence {
        assert!(nav.select_frequency(value).easter_egg.is_none());
    }
    let outcome = nav.select_frequency("141.80");
    let egg = outcome.easter_egg.unwrap();
    assert_eq!(egg.id, "konami");
    assert_eq!(egg.reward.action, "revealExtraProjects");
    assert_eq!(nav.state().tuning, locked("141.80"));
}

#[test]
fn stale_reveal_never_leaks_into_new_dialogue() {
    let (mut nav, clock) = session();
    nav.select_frequency("141.12");
    clock.advance(DELAY * 5);
    let partial = nav.render().dialogue;
    assert_eq!(partial, "ABOUT");

    nav.select_frequency("142.52");
    let contact = nav.registry().lookup("142.52").unwrap().dialogue.clone();
    assert_eq!(nav.render().dialogue, "");
    for _ in 0..contact.chars().count() {
        clock.advance(DELAY);
        let shown = nav.render().dialogue;
        assert!(contact.starts_with(&shown));
    }
    assert_eq!(nav.render().dialogue, contact);
}

#[test]
fn reveal_frames_match_typewriter_contract() {
    let text = "Snake? Snake!";
    let mut tw = Typewriter::new(DELAY);
    tw.start(text, RevealMode::Progressive, Duration::ZERO);

    let mut frames = vec![tw.displayed().to_string()];
    let mut now = Duration::ZERO;
    while tw.is_revealing() {
        now += DELAY;
        assert_eq!(tw.advance(now), 1);
        frames.push(tw.displayed().to_string());
    }
    assert_eq!(frames.len(), text.chars().count() + 1);
    assert_eq!(frames.first().map(String::as_str), Some(""));
    assert_eq!(frames.last().map(String::as_str), Some(text));

    tw.start(text, RevealMode::Instant, now);
    assert_eq!(tw.displayed(), text);
    assert!(!tw.is_revealing());
}
