//! Codec registry: frequencies, characters, projects and secret patterns.
//!
//! The registry is declared in YAML and compiled once into a validated,
//! immutable [`CodecRegistry`]. Every lookup afterwards is infallible in the
//! sense that a miss is an ordinary `None`, never a corrupted record.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use crate::error::{RegistryError, RegistryIssue};
use crate::types::{Character, Frequency, Project, Reward, SecretPattern};

/// Registry shipped with the crate.
const BUILTIN_REGISTRY: &str = include_str!("../data/registry.yaml");

// ---------------------------------------------------------------------------
// Raw definition (YAML shape)
// ---------------------------------------------------------------------------

/// Registry as written in YAML, before validation.
///
/// Rewards are keyed by pattern id in a separate table, so the one-reward-
/// per-pattern rule has to be checked rather than assumed.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryDef {
    pub characters: Vec<Character>,
    pub frequencies: Vec<Frequency>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub patterns: Vec<PatternDef>,
    #[serde(default)]
    pub rewards: BTreeMap<String, Reward>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PatternDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub sequence: Vec<String>,
}

/// Check a definition for referential integrity. Returns all issues found.
pub fn validate_def(def: &RegistryDef) -> Vec<RegistryIssue> {
    let mut issues = Vec::new();

    if def.frequencies.is_empty() {
        issues.push(RegistryIssue::new(
            "empty-registry",
            "at least one frequency is required",
        ));
    }

    let mut character_ids = HashSet::new();
    for character in &def.characters {
        if !character_ids.insert(character.id.as_str()) {
            issues.push(RegistryIssue::new(
                "duplicate-character",
                format!("duplicate character id: {}", character.id),
            ));
        }
    }

    let mut values = HashSet::new();
    for freq in &def.frequencies {
        if !values.insert(freq.value.as_str()) {
            issues.push(RegistryIssue::new(
                "duplicate-frequency",
                format!("duplicate frequency value: {}", freq.value),
            ));
        }
        for side in [&freq.left, &freq.right] {
            if !character_ids.contains(side.as_str()) {
                issues.push(RegistryIssue::new(
                    "unknown-character",
                    format!("frequency {} references unknown character '{}'", freq.value, side),
                ));
            }
        }
    }

    let mut project_ids = HashSet::new();
    for project in &def.projects {
        if !project_ids.insert(project.id.as_str()) {
            issues.push(RegistryIssue::new(
                "duplicate-project",
                format!("duplicate project id: {}", project.id),
            ));
        }
    }

    let mut pattern_ids = HashSet::new();
    for pattern in &def.patterns {
        if !pattern_ids.insert(pattern.id.as_str()) {
            issues.push(RegistryIssue::new(
                "duplicate-pattern",
                format!("duplicate pattern id: {}", pattern.id),
            ));
        }
        if pattern.sequence.is_empty() {
            issues.push(RegistryIssue::new(
                "empty-pattern",
                format!("pattern '{}' has no frequencies", pattern.id),
            ));
        }
        if !def.rewards.contains_key(&pattern.id) {
            issues.push(RegistryIssue::new(
                "missing-reward",
                format!("pattern '{}' has no reward", pattern.id),
            ));
        }
    }

    for id in def.rewards.keys() {
        if !pattern_ids.contains(id.as_str()) {
            issues.push(RegistryIssue::new(
                "orphan-reward",
                format!("reward '{}' has no pattern", id),
            ));
        }
    }

    issues
}

// ---------------------------------------------------------------------------
// CodecRegistry
// ---------------------------------------------------------------------------

/// Validated, immutable registry shared by every session.
#[derive(Debug, Clone)]
pub struct CodecRegistry {
    frequencies: Vec<Frequency>,
    /// value → position in `frequencies`
    by_value: HashMap<String, usize>,
    characters: Vec<Character>,
    by_character: HashMap<String, usize>,
    projects: Vec<Project>,
    patterns: Vec<SecretPattern>,
}

impl CodecRegistry {
    /// The registry embedded in the crate.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_yaml_str(BUILTIN_REGISTRY)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, RegistryError> {
        let def: RegistryDef = serde_yaml::from_str(yaml)?;
        Self::from_def(def)
    }

    /// Load and validate a registry file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Reading {}", path.display()))?;
        let registry = Self::from_yaml_str(&content)
            .with_context(|| format!("Loading registry {}", path.display()))?;
        Ok(registry)
    }

    /// Validate a definition and build the indexed registry.
    pub fn from_def(def: RegistryDef) -> Result<Self, RegistryError> {
        let issues = validate_def(&def);
        if !issues.is_empty() {
            for issue in &issues {
                tracing::error!("{}", issue);
            }
            return Err(RegistryError::Invalid(issues));
        }

        let RegistryDef {
            characters,
            frequencies,
            projects,
            patterns,
            mut rewards,
        } = def;

        let by_value = frequencies
            .iter()
            .enumerate()
            .map(|(i, f)| (f.value.clone(), i))
            .collect();
        let by_character = characters
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();

        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            // Presence checked by validate_def.
            let Some(reward) = rewards.remove(&pattern.id) else {
                continue;
            };
            compiled.push(SecretPattern {
                id: pattern.id,
                name: pattern.name,
                description: pattern.description,
                sequence: pattern.sequence,
                reward,
            });
        }

        tracing::debug!(
            frequencies = frequencies.len(),
            characters = characters.len(),
            patterns = compiled.len(),
            "codec registry loaded"
        );

        Ok(Self {
            frequencies,
            by_value,
            characters,
            by_character,
            projects,
            patterns: compiled,
        })
    }

    /// Look up a frequency by its full decimal value.
    ///
    /// Returns `None` for any value not declared, including values that share
    /// a leading prefix with a declared one.
    pub fn lookup(&self, value: &str) -> Option<&Frequency> {
        self.by_value.get(value).map(|&i| &self.frequencies[i])
    }

    /// Position of a value in tuning order.
    pub fn position(&self, value: &str) -> Option<usize> {
        self.by_value.get(value).copied()
    }

    pub fn get(&self, index: usize) -> Option<&Frequency> {
        self.frequencies.get(index)
    }

    /// The default frequency for a new session.
    pub fn first(&self) -> &Frequency {
        // Non-empty by validation.
        &self.frequencies[0]
    }

    pub fn last(&self) -> &Frequency {
        &self.frequencies[self.frequencies.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Frequencies in declared tuning order.
    pub fn frequencies(&self) -> &[Frequency] {
        &self.frequencies
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn character(&self, id: &str) -> Option<&Character> {
        self.by_character.get(id).map(|&i| &self.characters[i])
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Secret patterns in declaration (and therefore match priority) order.
    pub fn patterns(&self) -> &[SecretPattern] {
        &self.patterns
    }

    pub fn pattern(&self, id: &str) -> Option<&SecretPattern> {
        self.patterns.iter().find(|p| p.id == id)
    }

    /// Longest pattern; history older than this can never match.
    pub fn max_pattern_len(&self) -> usize {
        self.patterns.iter().map(SecretPattern::len).max().unwrap_or(0)
    }
}
