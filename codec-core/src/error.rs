//! Error types for registry construction.
//!
//! Navigation itself never fails: an unknown frequency is a display state,
//! and a missing easter-egg match is `None`. The only hard failures are a
//! malformed registry, detected once at startup.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry rejected: {} issue(s)", .0.len())]
    Invalid(Vec<RegistryIssue>),

    #[error("registry parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
}

impl RegistryError {
    /// Issues found by validation; empty for parse errors.
    pub fn issues(&self) -> &[RegistryIssue] {
        match self {
            Self::Invalid(issues) => issues,
            Self::Parse(_) => &[],
        }
    }
}

/// One referential-integrity problem in a registry definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryIssue {
    pub rule: &'static str,
    pub message: String,
}

impl RegistryIssue {
    pub(crate) fn new(rule: &'static str, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RegistryIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.rule, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_counts_issues() {
        let issue = RegistryIssue::new("empty-pattern", "pattern 'x' has no frequencies");
        let err = RegistryError::Invalid(vec![issue.clone(), issue]);
        assert_eq!(err.to_string(), "registry rejected: 2 issue(s)");
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn display_issue() {
        let issue = RegistryIssue::new("unknown-character", "frequency 140.85 references 'ghost'");
        assert_eq!(
            issue.to_string(),
            "[unknown-character] frequency 140.85 references 'ghost'"
        );
    }

    #[test]
    fn parse_error_has_no_issues() {
        let err: RegistryError = serde_yaml::from_str::<Vec<String>>("{")
            .map_err(RegistryError::from)
            .unwrap_err();
        assert!(err.issues().is_empty());
        assert!(err.to_string().starts_with("registry parse error"));
    }
}
