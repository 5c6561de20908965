//! Codec portfolio core.
//!
//! Frequency-driven navigation for the codec interface: a validated registry
//! of frequencies, characters, projects and secret patterns; a typewriter
//! reveal engine driven by an injectable clock; a stateless easter-egg
//! matcher; and the per-session [`NavigationController`] that ties them
//! together.

pub mod clock;
pub mod error;
pub mod history;
pub mod matcher;
pub mod navigation;
pub mod registry;
pub mod typewriter;
pub mod types;

pub use clock::{Clock, SystemClock, VirtualClock};
pub use error::{RegistryError, RegistryIssue};
pub use history::SelectionHistory;
pub use matcher::{EasterEggHint, EasterEggMatch, RewardDispatcher, RewardHandler, SequenceMatcher};
pub use navigation::{
    AccessibilityFlags, CharacterView, KeyEffect, NavigationController, NavigationState,
    RenderSnapshot, TuneOutcome, Tuning, INVALID_FREQUENCY_TEXT, PLACEHOLDER_CHARACTER,
};
pub use registry::CodecRegistry;
pub use typewriter::{Reveal, RevealMode, Typewriter, DEFAULT_CHAR_DELAY};
pub use types::{
    AccessibilityFlag, Character, Direction, Frequency, KeyInput, Project, Reward, RewardKind,
    SecretPattern,
};
