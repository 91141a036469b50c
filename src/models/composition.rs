//! The composition store: ordered sections plus position-keyed overrides.
//!
//! All mutation happens synchronously on a single logical flow, so the store
//! needs no locking; its job is keeping the ordered section list and the
//! sparse override map index-consistent under insertion, removal and
//! reordering.

use crate::models::overrides::{OverridePatch, OverrideRecord};
use crate::models::section::{MoveDirection, PlacedSection, SectionHandle};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Descriptive metadata saved alongside a composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionMetadata {
    /// Page name (e.g. "Landing Page")
    pub name: String,
    /// Selected theme id, if any
    pub theme_id: Option<String>,
    /// Creation timestamp (ISO 8601)
    pub created: DateTime<Utc>,
    /// Last modification timestamp (ISO 8601)
    pub modified: DateTime<Utc>,
}

impl CompositionMetadata {
    /// Creates metadata for a new composition.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            theme_id: None,
            created: now,
            modified: now,
        }
    }

    /// Updates the modification timestamp to now.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }
}

impl Default for CompositionMetadata {
    fn default() -> Self {
        Self::new("Untitled Page")
    }
}

/// Read-only view of the store state handed to projectors and generators.
///
/// Borrows from the store; callers cannot mutate through it.
#[derive(Debug, Clone, Copy)]
pub struct CompositionSnapshot<'a> {
    /// Ordered placed sections.
    pub sections: &'a [PlacedSection],
    /// Sparse override map keyed by position.
    pub overrides: &'a BTreeMap<usize, OverrideRecord>,
}

/// Ordered list of placed sections plus their position-keyed overrides.
///
/// # Invariant
///
/// Every key `k` in the override map satisfies `k < sections.len()` after
/// every operation. Position-addressed operations reject invalid indices
/// before touching any state, so a failed call leaves the store unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    /// Page metadata.
    pub metadata: CompositionMetadata,
    sections: Vec<PlacedSection>,
    overrides: BTreeMap<usize, OverrideRecord>,
    next_handle: u64,
}

impl Default for Composition {
    fn default() -> Self {
        Self::new("Untitled Page")
    }
}

impl Composition {
    /// Creates an empty composition.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: CompositionMetadata::new(name),
            sections: Vec::new(),
            overrides: BTreeMap::new(),
            next_handle: 0,
        }
    }

    /// Number of placed sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// True when no section has been placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Ordered placed sections.
    #[must_use]
    pub fn sections(&self) -> &[PlacedSection] {
        &self.sections
    }

    /// Returns the override record at `position`, if one exists.
    #[must_use]
    pub fn override_at(&self, position: usize) -> Option<&OverrideRecord> {
        self.overrides.get(&position)
    }

    /// Appends a new section referencing `template_id` and returns its
    /// stable handle.
    ///
    /// The new position has no prior override, so the override map is not
    /// touched.
    pub fn append(&mut self, template_id: impl Into<String>) -> SectionHandle {
        let handle = SectionHandle(self.next_handle);
        self.next_handle += 1;
        self.sections.push(PlacedSection {
            template_id: template_id.into(),
            handle,
        });
        self.metadata.touch();
        handle
    }

    /// Removes the section at `position`.
    ///
    /// The override keyed at `position` is dropped; every override keyed
    /// after it shifts down by one; overrides before it are untouched.
    pub fn remove_at(&mut self, position: usize) -> Result<PlacedSection> {
        self.check_position(position)?;

        let removed = self.sections.remove(position);

        let mut rekeyed = BTreeMap::new();
        for (key, record) in std::mem::take(&mut self.overrides) {
            match key.cmp(&position) {
                std::cmp::Ordering::Less => {
                    rekeyed.insert(key, record);
                }
                std::cmp::Ordering::Equal => {} // dropped with its section
                std::cmp::Ordering::Greater => {
                    rekeyed.insert(key - 1, record);
                }
            }
        }
        self.overrides = rekeyed;

        self.metadata.touch();
        Ok(removed)
    }

    /// Swaps the section at `position` with its neighbour in `direction`.
    ///
    /// A move that would leave the list is a no-op, not an error (the UI
    /// disables the buttons at the edges but keyboard paths may still fire).
    /// Any override at either position follows its section; a position that
    /// had no override ends up with none.
    pub fn move_section(&mut self, position: usize, direction: MoveDirection) -> Result<bool> {
        self.check_position(position)?;

        let target = match direction {
            MoveDirection::Up => {
                if position == 0 {
                    return Ok(false);
                }
                position - 1
            }
            MoveDirection::Down => {
                if position + 1 >= self.sections.len() {
                    return Ok(false);
                }
                position + 1
            }
        };

        self.sections.swap(position, target);

        let a = self.overrides.remove(&position);
        let b = self.overrides.remove(&target);
        if let Some(record) = a {
            self.overrides.insert(target, record);
        }
        if let Some(record) = b {
            self.overrides.insert(position, record);
        }

        self.metadata.touch();
        Ok(true)
    }

    /// Merges `patch` into the override record at `position`, creating the
    /// record if absent.
    pub fn set_override(&mut self, position: usize, patch: &OverridePatch) -> Result<()> {
        self.check_position(position)?;

        self.overrides
            .entry(position)
            .or_default()
            .apply(patch);

        self.metadata.touch();
        Ok(())
    }

    /// Merges `patch` into the override record of the section identified by
    /// `handle`.
    ///
    /// Returns `false`, without mutating anything, when the handle no longer
    /// resolves — the section was removed while the caller (typically a
    /// network completion) was in flight.
    pub fn set_override_for_handle(
        &mut self,
        handle: SectionHandle,
        patch: &OverridePatch,
    ) -> bool {
        match self.position_of(handle) {
            Some(position) => {
                // position came from the live list, so this cannot fail
                self.set_override(position, patch).is_ok()
            }
            None => false,
        }
    }

    /// Resolves a stable handle to its current position.
    #[must_use]
    pub fn position_of(&self, handle: SectionHandle) -> Option<usize> {
        self.sections.iter().position(|s| s.handle == handle)
    }

    /// Returns the handle of the section at `position`.
    #[must_use]
    pub fn handle_at(&self, position: usize) -> Option<SectionHandle> {
        self.sections.get(position).map(|s| s.handle)
    }

    /// Immutable view for projectors and code generators.
    #[must_use]
    pub fn snapshot(&self) -> CompositionSnapshot<'_> {
        CompositionSnapshot {
            sections: &self.sections,
            overrides: &self.overrides,
        }
    }

    /// Checks the index invariant. Used by tests and debug assertions.
    #[must_use]
    pub fn invariant_holds(&self) -> bool {
        self.overrides.keys().all(|&k| k < self.sections.len())
    }

    fn check_position(&self, position: usize) -> Result<()> {
        if position >= self.sections.len() {
            anyhow::bail!(
                "Section position {} out of range (have {} sections)",
                position,
                self.sections.len()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composition_with(templates: &[&str]) -> Composition {
        let mut comp = Composition::new("Test Page");
        for id in templates {
            comp.append(*id);
        }
        comp
    }

    #[test]
    fn test_append_assigns_increasing_handles() {
        let mut comp = Composition::new("Test");
        let a = comp.append("hero-video");
        let b = comp.append("pricing-simple");
        assert!(b > a);
        assert_eq!(comp.len(), 2);
        assert!(comp.invariant_holds());
    }

    #[test]
    fn test_remove_rekeys_following_overrides() {
        let mut comp = composition_with(&["a", "b", "c", "d"]);
        comp.set_override(1, &OverridePatch::classes("x")).unwrap();
        comp.set_override(2, &OverridePatch::classes("y")).unwrap();

        comp.remove_at(1).unwrap();

        assert_eq!(comp.len(), 3);
        // position 1's record is gone; position 2's moved to 1
        assert_eq!(comp.override_at(1).unwrap().style_classes, "y");
        assert!(comp.override_at(2).is_none());
        assert!(comp.invariant_holds());
    }

    #[test]
    fn test_remove_first_position() {
        let mut comp = composition_with(&["a", "b", "c"]);
        comp.set_override(0, &OverridePatch::classes("first")).unwrap();
        comp.set_override(2, &OverridePatch::classes("last")).unwrap();

        comp.remove_at(0).unwrap();

        assert_eq!(comp.sections()[0].template_id, "b");
        assert!(comp.override_at(0).is_none());
        assert_eq!(comp.override_at(1).unwrap().style_classes, "last");
        assert!(comp.invariant_holds());
    }

    #[test]
    fn test_remove_last_position() {
        let mut comp = composition_with(&["a", "b", "c"]);
        comp.set_override(1, &OverridePatch::classes("mid")).unwrap();
        comp.set_override(2, &OverridePatch::classes("tail")).unwrap();

        comp.remove_at(2).unwrap();

        assert_eq!(comp.len(), 2);
        assert_eq!(comp.override_at(1).unwrap().style_classes, "mid");
        assert!(comp.override_at(2).is_none());
        assert!(comp.invariant_holds());
    }

    #[test]
    fn test_remove_with_no_overrides() {
        let mut comp = composition_with(&["a", "b"]);
        comp.remove_at(0).unwrap();
        assert_eq!(comp.len(), 1);
        assert!(comp.invariant_holds());
    }

    #[test]
    fn test_remove_out_of_range_leaves_state_unchanged() {
        let mut comp = composition_with(&["a", "b"]);
        comp.set_override(1, &OverridePatch::classes("keep")).unwrap();
        let before = comp.clone();

        assert!(comp.remove_at(2).is_err());

        assert_eq!(comp.sections(), before.sections());
        assert_eq!(comp.override_at(1), before.override_at(1));
    }

    #[test]
    fn test_move_down_carries_override() {
        let mut comp = composition_with(&["a", "b", "c"]);
        comp.set_override(0, &OverridePatch::classes("x")).unwrap();

        assert!(comp.move_section(0, MoveDirection::Down).unwrap());

        assert_eq!(comp.sections()[0].template_id, "b");
        assert_eq!(comp.sections()[1].template_id, "a");
        // override followed its section; position 0 has none now
        assert!(comp.override_at(0).is_none());
        assert_eq!(comp.override_at(1).unwrap().style_classes, "x");
        assert!(comp.invariant_holds());
    }

    #[test]
    fn test_move_swaps_two_overrides() {
        let mut comp = composition_with(&["a", "b"]);
        comp.set_override(0, &OverridePatch::classes("zero")).unwrap();
        comp.set_override(1, &OverridePatch::classes("one")).unwrap();

        assert!(comp.move_section(1, MoveDirection::Up).unwrap());

        assert_eq!(comp.override_at(0).unwrap().style_classes, "one");
        assert_eq!(comp.override_at(1).unwrap().style_classes, "zero");
    }

    #[test]
    fn test_move_at_edges_is_noop() {
        let mut comp = composition_with(&["a", "b"]);
        comp.set_override(0, &OverridePatch::classes("x")).unwrap();

        assert!(!comp.move_section(0, MoveDirection::Up).unwrap());
        assert!(!comp.move_section(1, MoveDirection::Down).unwrap());

        assert_eq!(comp.sections()[0].template_id, "a");
        assert_eq!(comp.override_at(0).unwrap().style_classes, "x");
    }

    #[test]
    fn test_set_override_merge_semantics() {
        let mut comp = composition_with(&["a", "b", "c"]);
        comp.set_override(2, &OverridePatch::text("h1", "Hi")).unwrap();
        comp.set_override(2, &OverridePatch::text("p", "Yo")).unwrap();

        let record = comp.override_at(2).unwrap();
        assert_eq!(record.text_overrides.get("h1").unwrap(), "Hi");
        assert_eq!(record.text_overrides.get("p").unwrap(), "Yo");
    }

    #[test]
    fn test_set_override_out_of_range() {
        let mut comp = Composition::new("Test");
        assert!(comp.set_override(0, &OverridePatch::classes("x")).is_err());
        assert!(comp.is_empty());
    }

    #[test]
    fn test_handle_survives_remove_and_move() {
        let mut comp = composition_with(&["a", "b", "c"]);
        let handle = comp.handle_at(2).unwrap();

        comp.remove_at(0).unwrap();
        assert_eq!(comp.position_of(handle), Some(1));

        comp.move_section(1, MoveDirection::Up).unwrap();
        assert_eq!(comp.position_of(handle), Some(0));
    }

    #[test]
    fn test_stale_handle_patch_discarded() {
        let mut comp = composition_with(&["a", "b"]);
        let handle = comp.handle_at(1).unwrap();
        comp.remove_at(1).unwrap();

        let applied = comp.set_override_for_handle(handle, &OverridePatch::classes("late"));

        assert!(!applied);
        assert!(comp.override_at(0).is_none());
        assert!(comp.invariant_holds());
    }

    #[test]
    fn test_handle_patch_lands_on_moved_section() {
        let mut comp = composition_with(&["a", "b"]);
        let handle = comp.handle_at(0).unwrap();
        comp.move_section(0, MoveDirection::Down).unwrap();

        assert!(comp.set_override_for_handle(handle, &OverridePatch::classes("moved")));
        assert_eq!(comp.override_at(1).unwrap().style_classes, "moved");
        assert!(comp.override_at(0).is_none());
    }

    #[test]
    fn test_invariant_over_operation_sequence() {
        let mut comp = Composition::new("Fuzzish");
        for i in 0..8 {
            comp.append(format!("t{i}"));
        }
        for i in [0usize, 3, 5, 7] {
            comp.set_override(i, &OverridePatch::classes(format!("c{i}")))
                .unwrap();
        }
        comp.remove_at(3).unwrap();
        comp.move_section(0, MoveDirection::Down).unwrap();
        comp.remove_at(6).unwrap();
        comp.move_section(5, MoveDirection::Up).unwrap();
        comp.remove_at(0).unwrap();

        assert!(comp.invariant_holds());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut comp = composition_with(&["hero-video", "pricing-simple"]);
        comp.set_override(0, &OverridePatch::text("h1", "Welcome"))
            .unwrap();

        let json = serde_json::to_string(&comp).unwrap();
        let back: Composition = serde_json::from_str(&json).unwrap();

        assert_eq!(back, comp);
        assert!(back.invariant_holds());
    }
}
