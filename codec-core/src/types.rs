use serde::{Deserialize, Serialize};

// ─── Registry records ─────────────────────────────────────────

/// Display name of the frequency that opens the projects panel.
pub const PROJECTS_FREQUENCY_NAME: &str = "PROJECTS";

/// A user-selectable navigation destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frequency {
    /// Full decimal value, e.g. `"140.85"`. The only lookup key.
    pub value: String,
    pub name: String,
    pub description: String,
    /// Character shown on the left portrait.
    pub left: String,
    /// Character shown on the right portrait.
    pub right: String,
    pub dialogue: String,
}

impl Frequency {
    /// Tuning to this frequency opens the projects panel.
    pub fn opens_projects(&self) -> bool {
        self.name == PROJECTS_FREQUENCY_NAME
    }
}

/// A portrait that frequencies reference by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub title: String,
    /// SVG path data for the face silhouette.
    pub portrait: String,
}

/// An entry in the project showcase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub url: String,
}

// ─── Easter eggs ──────────────────────────────────────────────

/// What kind of effect a reward has on the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardKind {
    Visual,
    Sound,
    Audio,
    Theme,
}

/// Reward granted when a secret pattern is entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub kind: RewardKind,
    pub name: String,
    pub description: String,
    /// Identifier the caller uses to pick a reward handler.
    pub action: String,
    #[serde(default)]
    pub icon: String,
}

/// An ordered frequency sequence paired with exactly one reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretPattern {
    pub id: String,
    pub name: String,
    pub description: String,
    pub sequence: Vec<String>,
    pub reward: Reward,
}

impl SecretPattern {
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

// ─── Navigation inputs ────────────────────────────────────────

/// Tuning direction through the registry's declared order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// The three accessibility switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessibilityFlag {
    ReducedMotion,
    HighContrast,
    DisableScanlines,
}

impl AccessibilityFlag {
    /// Parse the kebab-case form used in URLs (`reduced-motion`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "reduced-motion" => Some(Self::ReducedMotion),
            "high-contrast" => Some(Self::HighContrast),
            "disable-scanlines" => Some(Self::DisableScanlines),
            _ => None,
        }
    }
}

/// Keyboard input the controller reacts to. Anything else maps to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    ArrowUp,
    ArrowDown,
    Escape,
    Other,
}

impl KeyInput {
    /// Map a DOM `KeyboardEvent.key` name.
    pub fn from_key_name(name: &str) -> Self {
        match name {
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "Escape" => Self::Escape,
            _ => Self::Other,
        }
    }
}
