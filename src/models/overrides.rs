//! Per-section override records and patches.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Visual and textual modifications layered over a section's default render.
///
/// Records are sparse: a section without edits has no record at all. Text
/// overrides are keyed by HTML tag name, deliberately first-match-per-tag
/// within a section rather than per element instance; this is a scope
/// limitation of the design, not an implementation shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverrideRecord {
    /// Space-separated utility classes applied to the section wrapper.
    #[serde(default)]
    pub style_classes: String,
    /// New text content per tag name (`h1`, `p`, `button`, ...).
    #[serde(default)]
    pub text_overrides: BTreeMap<String, String>,
    /// URL of a background image applied to the wrapper.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image_url: Option<String>,
}

impl OverrideRecord {
    /// True when the record carries no information at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.style_classes.is_empty()
            && self.text_overrides.is_empty()
            && self.background_image_url.is_none()
    }

    /// Merges a patch into this record.
    ///
    /// Text overrides merge key-by-key (new keys add, existing keys are
    /// overwritten); style classes and the background image are replaced
    /// wholesale when the patch carries them.
    pub fn apply(&mut self, patch: &OverridePatch) {
        if let Some(classes) = &patch.style_classes {
            self.style_classes = classes.clone();
        }
        for (tag, text) in &patch.text_overrides {
            self.text_overrides
                .insert(tag.to_lowercase(), text.clone());
        }
        if patch.clear_background {
            self.background_image_url = None;
        } else if let Some(url) = &patch.background_image_url {
            self.background_image_url = Some(url.clone());
        }
    }
}

/// A partial update to an [`OverrideRecord`].
///
/// `None` fields leave the existing value untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverridePatch {
    /// Replacement for the wrapper class string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_classes: Option<String>,
    /// Text overrides to merge in, keyed by tag name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub text_overrides: BTreeMap<String, String>,
    /// Replacement background image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image_url: Option<String>,
    /// When true, removes any background image (wins over
    /// `background_image_url`).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub clear_background: bool,
}

impl OverridePatch {
    /// Patch replacing the wrapper class string.
    #[must_use]
    pub fn classes(classes: impl Into<String>) -> Self {
        Self {
            style_classes: Some(classes.into()),
            ..Self::default()
        }
    }

    /// Patch overriding the text of a single tag.
    #[must_use]
    pub fn text(tag: impl Into<String>, text: impl Into<String>) -> Self {
        let mut text_overrides = BTreeMap::new();
        text_overrides.insert(tag.into().to_lowercase(), text.into());
        Self {
            text_overrides,
            ..Self::default()
        }
    }

    /// Patch setting the background image URL.
    #[must_use]
    pub fn background(url: impl Into<String>) -> Self {
        Self {
            background_image_url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Patch removing the background image.
    #[must_use]
    pub fn clear_background() -> Self {
        Self {
            clear_background: true,
            ..Self::default()
        }
    }
}
