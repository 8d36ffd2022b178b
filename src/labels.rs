//! Decision labels shown under the slots

use serde::{Deserialize, Serialize};

use crate::consts::MAX_SLOTS;

/// Longest label, in characters
pub const MAX_LABEL_CHARS: usize = 20;

const DEFAULT_LABELS: [&str; MAX_SLOTS as usize] =
    ["Yes", "No", "Maybe", "Ask Again", "Definitely", "Never"];

/// Up to six slot labels, left to right
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels(Vec<String>);

impl Default for Labels {
    fn default() -> Self {
        Self(DEFAULT_LABELS.iter().map(|s| s.to_string()).collect())
    }
}

impl Labels {
    /// Build from arbitrary input; extra labels are dropped and long ones truncated
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            labels
                .into_iter()
                .take(MAX_SLOTS as usize)
                .map(|s| truncate(s.as_ref()))
                .collect(),
        )
    }

    /// Replace one label. Returns false if `index` is out of range.
    pub fn set(&mut self, index: usize, text: &str) -> bool {
        match self.0.get_mut(index) {
            Some(label) => {
                *label = truncate(text);
                true
            }
            None => false,
        }
    }

    pub fn label_for(&self, slot: usize) -> Option<&str> {
        self.0.get(slot).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn truncate(text: &str) -> String {
    text.chars().take(MAX_LABEL_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let labels = Labels::default();
        assert_eq!(labels.len(), 6);
        assert_eq!(labels.label_for(0), Some("Yes"));
        assert_eq!(labels.label_for(5), Some("Never"));
        assert_eq!(labels.label_for(6), None);
    }

    #[test]
    fn test_new_caps_count_and_length() {
        let labels = Labels::new(["a", "b", "c", "d", "e", "f", "g"]);
        assert_eq!(labels.len(), 6);
        let labels = Labels::new(["x".repeat(30)]);
        assert_eq!(labels.label_for(0).map(str::len), Some(MAX_LABEL_CHARS));
    }

    #[test]
    fn test_truncates_on_char_boundary() {
        let mut labels = Labels::default();
        assert!(labels.set(2, &"é".repeat(25)));
        assert_eq!(labels.label_for(2).unwrap().chars().count(), MAX_LABEL_CHARS);
        assert!(!labels.set(6, "nope"));
    }
}
