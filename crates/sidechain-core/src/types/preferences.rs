//! Per-user notification preference map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::events::NotificationCategory;
use crate::result::AppResult;

/// Category → enabled switches for one user.
///
/// Absent categories are enabled. Stored maps may contain category names
/// this build does not know; those are ignored on read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationPreferences(pub BTreeMap<NotificationCategory, bool>);

impl NotificationPreferences {
    /// Whether a category is enabled.
    pub fn is_enabled(&self, category: NotificationCategory) -> bool {
        self.0.get(&category).copied().unwrap_or(true)
    }

    /// Overlay `changes` on top of these preferences.
    pub fn merge(&mut self, changes: &NotificationPreferences) {
        for (category, enabled) in &changes.0 {
            self.0.insert(*category, *enabled);
        }
    }

    /// A full map with every known category present.
    pub fn effective(&self) -> NotificationPreferences {
        NotificationPreferences(
            NotificationCategory::ALL
                .into_iter()
                .map(|c| (c, self.is_enabled(c)))
                .collect(),
        )
    }

    /// Build a change set from category names supplied by a client.
    /// Unknown names are rejected.
    pub fn from_named<I, K>(entries: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (K, bool)>,
        K: AsRef<str>,
    {
        entries
            .into_iter()
            .map(|(name, enabled)| Ok((name.as_ref().parse()?, enabled)))
            .collect::<AppResult<BTreeMap<_, _>>>()
            .map(NotificationPreferences)
    }

    /// Parse a stored JSON object, skipping unknown categories and non-bool
    /// values.
    pub fn from_json_lenient(value: &serde_json::Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };
        NotificationPreferences(
            object
                .iter()
                .filter_map(|(k, v)| Some((k.parse().ok()?, v.as_bool()?)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_categories_are_enabled() {
        let prefs = NotificationPreferences::default();
        assert!(prefs.is_enabled(NotificationCategory::Follows));
    }

    #[test]
    fn test_lenient_parse_skips_unknown() {
        let raw = serde_json::json!({ "follows": false, "telepathy": false, "likes": "yes" });
        let prefs = NotificationPreferences::from_json_lenient(&raw);
        assert!(!prefs.is_enabled(NotificationCategory::Follows));
        assert!(prefs.is_enabled(NotificationCategory::Likes));
        assert_eq!(prefs.0.len(), 1);
    }

    #[test]
    fn test_named_update_rejects_unknown_category() {
        let ok = NotificationPreferences::from_named([("likes", false)]).unwrap();
        assert!(!ok.is_enabled(NotificationCategory::Likes));

        let err = NotificationPreferences::from_named([("likes", false), ("telepathy", true)])
            .unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Validation);
    }

    #[test]
    fn test_merge_and_effective() {
        let mut prefs = NotificationPreferences::default();
        let mut change = BTreeMap::new();
        change.insert(NotificationCategory::Dms, false);
        prefs.merge(&NotificationPreferences(change));
        let full = prefs.effective();
        assert_eq!(full.0.len(), NotificationCategory::ALL.len());
        assert_eq!(full.0.get(&NotificationCategory::Dms), Some(&false));
        assert_eq!(full.0.get(&NotificationCategory::Likes), Some(&true));
    }
}
