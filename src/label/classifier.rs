//! Map pull request labels to a single increment directive.

use tracing::warn;

use crate::error::LabelError;

use super::IncrementDirective;

/// Default label text for each directive.
pub const DEFAULT_MAJOR_LABEL: &str = "Version: Major";
pub const DEFAULT_MINOR_LABEL: &str = "Version: Minor";
pub const DEFAULT_PATCH_LABEL: &str = "Version: Patch";
pub const DEFAULT_INTERNAL_LABEL: &str = "Version: Internal";
pub const DEFAULT_RELEASED_LABEL: &str = "Released";

/// Ordered `(label text, directive)` pairs.
///
/// Rules are always kept in [`IncrementDirective::PRECEDENCE`] order, so the
/// first matching rule is the highest-precedence one no matter how the
/// labels on an event are ordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRules {
    rules: Vec<(String, IncrementDirective)>,
}

impl LabelRules {
    pub fn new(
        major: impl Into<String>,
        minor: impl Into<String>,
        patch: impl Into<String>,
        internal: impl Into<String>,
        released: impl Into<String>,
    ) -> Self {
        Self {
            rules: vec![
                (major.into(), IncrementDirective::Major),
                (minor.into(), IncrementDirective::Minor),
                (patch.into(), IncrementDirective::Patch),
                (internal.into(), IncrementDirective::None),
                (released.into(), IncrementDirective::Released),
            ],
        }
    }

    /// Label text configured for a directive.
    pub fn label_for(&self, directive: IncrementDirective) -> &str {
        self.rules
            .iter()
            .find(|(_, d)| *d == directive)
            .map(|(label, _)| label.as_str())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, IncrementDirective)> {
        self.rules.iter()
    }

    /// Classify a set of labels.
    ///
    /// A label matches a rule when it starts with the rule's label text
    /// (case-sensitive), so `"Version: Minor (api)"` still counts as minor.
    /// Returns `None` when no labels are present or none match.
    pub fn classify<S: AsRef<str>>(&self, labels: &[S]) -> Option<IncrementDirective> {
        self.rules
            .iter()
            .find(|(text, _)| {
                labels
                    .iter()
                    .any(|label| label.as_ref().starts_with(text.as_str()))
            })
            .map(|(_, directive)| *directive)
    }

    /// Whether any label carries the released marker.
    ///
    /// Release gating checks this before [`classify`](Self::classify): a PR
    /// keeps its version label after it ships, and that label outranks the
    /// marker in precedence.
    pub fn is_released<S: AsRef<str>>(&self, labels: &[S]) -> bool {
        let marker = self.label_for(IncrementDirective::Released);
        !marker.is_empty() && labels.iter().any(|label| label.as_ref().starts_with(marker))
    }

    /// Classify with the lenient fallback used by release and refresh flows.
    ///
    /// Bare commits pass `None` for `labels`. A missing or unrecognized label is
    /// logged and replaced with `fallback`.
    pub fn classify_or<S: AsRef<str>>(
        &self,
        labels: Option<&[S]>,
        fallback: IncrementDirective,
    ) -> IncrementDirective {
        match labels.and_then(|labels| self.classify(labels)) {
            Some(directive) => directive,
            None => {
                if labels.is_some() {
                    warn!(fallback = %fallback, "No recognized version label, using fallback");
                }
                fallback
            }
        }
    }

    /// Strict check-mode validation for a single pull request.
    pub fn require<S: AsRef<str>>(
        &self,
        pr: u64,
        labels: &[S],
    ) -> Result<IncrementDirective, LabelError> {
        self.classify(labels).ok_or_else(|| LabelError::MissingLabel {
            pr,
            expected: self
                .rules
                .iter()
                .map(|(text, _)| format!("'{}'", text))
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

impl Default for LabelRules {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAJOR_LABEL,
            DEFAULT_MINOR_LABEL,
            DEFAULT_PATCH_LABEL,
            DEFAULT_INTERNAL_LABEL,
            DEFAULT_RELEASED_LABEL,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_label_classifies_as_major() {
        let rules = LabelRules::default();
        assert_eq!(rules.classify(&["Version: Major"]), Some(IncrementDirective::Major));
    }

    #[test]
    fn test_precedence_ignores_label_order() {
        let rules = LabelRules::default();
        let labels = ["Released", "Version: Patch", "Version: Minor"];
        assert_eq!(rules.classify(&labels), Some(IncrementDirective::Minor));
    }

    #[test]
    fn test_prefix_match_allows_suffix_annotations() {
        let rules = LabelRules::default();
        assert_eq!(
            rules.classify(&["Version: Patch (docs only)"]),
            Some(IncrementDirective::Patch)
        );
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let rules = LabelRules::default();
        assert_eq!(rules.classify(&["version: major"]), None);
    }

    #[test]
    fn test_no_labels_returns_none() {
        let rules = LabelRules::default();
        let empty: [&str; 0] = [];
        assert_eq!(rules.classify(&empty), None);
    }

    #[test]
    fn test_fallback_for_unlabeled_event() {
        let rules = LabelRules::default();
        let labels = ["bug"];
        assert_eq!(
            rules.classify_or(Some(&labels[..]), IncrementDirective::Patch),
            IncrementDirective::Patch
        );
        assert_eq!(
            rules.classify_or::<&str>(None, IncrementDirective::None),
            IncrementDirective::None
        );
    }

    #[test]
    fn test_require_reports_missing_label() {
        let rules = LabelRules::default();
        let err = rules.require(42, &["enhancement"]).unwrap_err();
        let LabelError::MissingLabel { pr, expected } = err;
        assert_eq!(pr, 42);
        assert!(expected.contains("'Version: Major'"));
    }

    #[test]
    fn test_released_marker_is_seen_next_to_version_label() {
        let rules = LabelRules::default();
        assert!(rules.is_released(&["Version: Minor", "Released"]));
        assert!(rules.is_released(&["Released (v1.2.0)"]));
        assert!(!rules.is_released(&["Version: Minor"]));
        assert!(!rules.is_released(&["released"]));
    }

    #[test]
    fn test_custom_labels() {
        let rules = LabelRules::new("breaking", "feature", "fix", "chore", "shipped");
        assert_eq!(rules.classify(&["feature: search"]), Some(IncrementDirective::Minor));
        assert_eq!(rules.label_for(IncrementDirective::Released), "shipped");
    }
}
