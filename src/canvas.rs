//! The builder canvas: the top-level view that owns everything.
//!
//! The canvas ties the composition store, the rendered DOM, the inline-edit
//! overlay and the override projector together. All user interaction funnels
//! through here: palette picks append sections, pointer/keyboard events drive
//! the overlay, and every mutation ends with overrides re-projected onto the
//! affected subtree.

use crate::dom::{Dom, NodeId};
use crate::editor::{project_section, EditorEvent, InlineEditor, Key};
use crate::models::{
    Composition, MoveDirection, OverridePatch, OverrideRecord, SectionHandle,
};
use crate::registry::SectionRegistry;
use crate::themes::ThemeTable;
use anyhow::Result;

/// Rendered state of one placed section.
#[derive(Debug, Clone)]
struct SectionView {
    /// Wrapper div carrying hover controls plus the template subtree.
    wrapper: NodeId,
    /// Root of the instantiated template; overrides project onto this.
    root: NodeId,
    /// The template root's original classes, captured at render time.
    base_classes: Vec<String>,
}

/// Top-level builder view.
///
/// Owns the composition exclusively; every mutation is synchronous and the
/// parallel `views` list is kept in lock-step with the section list.
#[derive(Debug)]
pub struct Canvas {
    registry: SectionRegistry,
    composition: Composition,
    dom: Dom,
    views: Vec<SectionView>,
    editor: InlineEditor,
}

impl Canvas {
    /// Creates an empty canvas over the given template registry.
    #[must_use]
    pub fn new(registry: SectionRegistry, name: impl Into<String>) -> Self {
        Self {
            registry,
            composition: Composition::new(name),
            dom: Dom::new(),
            views: Vec::new(),
            editor: InlineEditor::new(),
        }
    }

    /// Restores a canvas from a previously saved composition.
    ///
    /// Sections whose template id is no longer in the registry are dropped
    /// (with their overrides re-keyed by the store) rather than failing the
    /// whole load.
    pub fn from_composition(registry: SectionRegistry, composition: Composition) -> Result<Self> {
        let mut canvas = Self {
            registry,
            composition,
            dom: Dom::new(),
            views: Vec::new(),
            editor: InlineEditor::new(),
        };

        let mut position = 0;
        while position < canvas.composition.len() {
            let template_id = canvas.composition.sections()[position].template_id.clone();
            if canvas.registry.get(&template_id).is_some() {
                position += 1;
            } else {
                canvas.composition.remove_at(position)?;
            }
        }

        for position in 0..canvas.composition.len() {
            let view = canvas.render_section(position);
            canvas.views.push(view);
        }
        canvas.project_all();
        Ok(canvas)
    }

    /// The composition being edited.
    #[must_use]
    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    /// The live document tree (read-only).
    #[must_use]
    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// Template registry backing the palette.
    #[must_use]
    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    /// Appends a section from the palette.
    ///
    /// An unknown template id is ignored and `None` returned; the canvas
    /// stays untouched.
    pub fn add_section(&mut self, template_id: &str) -> Option<SectionHandle> {
        self.registry.get(template_id)?;

        let handle = self.composition.append(template_id);
        let position = self.composition.len() - 1;
        let view = self.render_section(position);
        self.views.push(view);
        self.project(position);
        Some(handle)
    }

    /// Removes the section at `position`.
    pub fn remove_section(&mut self, position: usize) -> Result<()> {
        // An edit inside the doomed subtree cannot survive it
        if let Some(editing) = self.editor.editing_node() {
            if let Some(view) = self.views.get(position) {
                if self.dom.contains(view.wrapper, editing) {
                    self.editor
                        .handle(&mut self.dom, EditorEvent::KeyDown(Key::Escape));
                }
            }
        }

        self.composition.remove_at(position)?;
        self.views.remove(position);
        self.project_all();
        Ok(())
    }

    /// Moves the section at `position` one step in `direction`.
    ///
    /// Returns `Ok(false)` for an edge no-op, mirroring the store.
    pub fn move_section(&mut self, position: usize, direction: MoveDirection) -> Result<bool> {
        let moved = self.composition.move_section(position, direction)?;
        if moved {
            let target = match direction {
                MoveDirection::Up => position - 1,
                MoveDirection::Down => position + 1,
            };
            self.views.swap(position, target);
            self.project(position);
            self.project(target);
        }
        Ok(moved)
    }

    /// Merges a patch into the section at `position` and re-projects it.
    pub fn apply_patch(&mut self, position: usize, patch: &OverridePatch) -> Result<()> {
        self.composition.set_override(position, patch)?;
        self.project(position);
        Ok(())
    }

    /// Merges a patch addressed by stable handle.
    ///
    /// This is the entry point for network completions: a handle whose
    /// section is gone resolves to nothing and the patch is discarded,
    /// returning `false`.
    pub fn apply_patch_for_handle(&mut self, handle: SectionHandle, patch: &OverridePatch) -> bool {
        if !self.composition.set_override_for_handle(handle, patch) {
            return false;
        }
        if let Some(position) = self.composition.position_of(handle) {
            self.project(position);
        }
        true
    }

    /// Records the selected theme on the composition.
    ///
    /// An unknown theme id is ignored (returns `false`); themes never touch
    /// the section list or overrides.
    pub fn select_theme(&mut self, themes: &ThemeTable, theme_id: &str) -> bool {
        if themes.get(theme_id).is_none() {
            return false;
        }
        self.composition.metadata.theme_id = Some(theme_id.to_string());
        self.composition.metadata.touch();
        true
    }

    /// Forwards a pointer/keyboard event to the inline-edit overlay.
    ///
    /// Commits emitted by the overlay are merged into the composition
    /// (keyed by the committed element's section) and re-projected.
    pub fn dispatch(&mut self, event: EditorEvent) {
        // The section a commit belongs to is the one hosting the node that
        // was under edit when the event arrived.
        let editing_before = self.editor.editing_node();

        let commit = self.editor.handle(&mut self.dom, event);

        if let (Some(commit), Some(node)) = (commit, editing_before) {
            if let Some(position) = self.section_of(node) {
                let patch = OverridePatch::text(commit.tag, commit.text);
                // position came from the live views list
                let _ = self.composition.set_override(position, &patch);
                self.project(position);
            }
        }
    }

    /// Stable scroll anchor for the section at `position`.
    ///
    /// Anchors embed the section handle, not the index, so they survive
    /// removal and reordering of earlier sections.
    #[must_use]
    pub fn anchor_at(&self, position: usize) -> Option<String> {
        self.composition
            .handle_at(position)
            .map(|handle| format!("section-{}", handle.0))
    }

    /// Serializes the whole canvas to preview HTML.
    #[must_use]
    pub fn render_html(&self) -> String {
        let mut out = String::new();
        for view in &self.views {
            out.push_str(&self.dom.to_html(view.wrapper));
            out.push('\n');
        }
        out
    }

    /// Position of the section whose rendered subtree contains `node`.
    #[must_use]
    pub fn section_of(&self, node: NodeId) -> Option<usize> {
        self.views
            .iter()
            .position(|view| self.dom.contains(view.wrapper, node))
    }

    /// Root node of the template subtree at `position`.
    #[must_use]
    pub fn section_root(&self, position: usize) -> Option<NodeId> {
        self.views.get(position).map(|view| view.root)
    }

    fn render_section(&mut self, position: usize) -> SectionView {
        let template_id = &self.composition.sections()[position].template_id;
        let template = self
            .registry
            .get(template_id)
            .expect("placed section references a registered template")
            .template
            .clone();

        let wrapper = self.dom.create_element("div");
        self.dom.add_class(wrapper, "relative");
        self.dom.add_class(wrapper, "group");

        let controls = self.render_controls(wrapper);
        let root = template.instantiate(&mut self.dom);
        self.dom.append_child(wrapper, root);

        for control in controls {
            self.editor.register_control(control);
        }

        let base_classes = self.dom.classes(root).to_vec();
        SectionView {
            wrapper,
            root,
            base_classes,
        }
    }

    /// Hover controls (move up/down, remove) attached to every wrapper.
    /// Registered with the overlay so their buttons never become editable.
    fn render_controls(&mut self, wrapper: NodeId) -> Vec<NodeId> {
        let bar = self.dom.create_element("div");
        self.dom.add_class(bar, "absolute");
        self.dom.add_class(bar, "right-4");
        self.dom.add_class(bar, "top-4");

        let mut controls = vec![bar];
        for label in ["Move up", "Move down", "Remove"] {
            let button = self.dom.create_element("button");
            let text = self.dom.create_text(label);
            self.dom.append_child(button, text);
            self.dom.append_child(bar, button);
            controls.push(button);
        }
        self.dom.append_child(wrapper, bar);
        controls
    }

    fn project(&mut self, position: usize) {
        let Some(view) = self.views.get(position) else {
            return;
        };
        let root = view.root;
        let base = view.base_classes.clone();
        let record = self
            .composition
            .override_at(position)
            .cloned()
            .unwrap_or_else(OverrideRecord::default);
        project_section(
            &mut self.dom,
            root,
            &base,
            &record,
            self.editor.editing_node(),
        );
    }

    fn project_all(&mut self) {
        for position in 0..self.views.len() {
            self.project(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorEvent;

    fn canvas() -> Canvas {
        let registry = SectionRegistry::load().expect("catalog loads");
        Canvas::new(registry, "Test Page")
    }

    #[test]
    fn test_add_section_renders_template() {
        let mut canvas = canvas();
        let handle = canvas.add_section("hero-minimal").unwrap();

        assert_eq!(canvas.composition().len(), 1);
        assert_eq!(canvas.composition().position_of(handle), Some(0));
        let root = canvas.section_root(0).unwrap();
        let h1 = canvas.dom().first_by_tag(root, "h1").unwrap();
        assert_eq!(canvas.dom().direct_text(h1), "Less is more.");
    }

    #[test]
    fn test_add_unknown_template_ignored() {
        let mut canvas = canvas();
        assert!(canvas.add_section("no-such-section").is_none());
        assert!(canvas.composition().is_empty());
    }

    #[test]
    fn test_inline_edit_flows_into_store() {
        let mut canvas = canvas();
        canvas.add_section("hero-minimal");
        let root = canvas.section_root(0).unwrap();
        let h1 = canvas.dom().first_by_tag(root, "h1").unwrap();

        canvas.dispatch(EditorEvent::Click(h1));
        canvas.dispatch(EditorEvent::Input("More is more.".into()));
        canvas.dispatch(EditorEvent::Blur);

        let record = canvas.composition().override_at(0).unwrap();
        assert_eq!(record.text_overrides.get("h1").unwrap(), "More is more.");
        // DOM reflects the committed text after re-projection
        assert_eq!(canvas.dom().direct_text(h1), "More is more.");
    }

    #[test]
    fn test_cancelled_edit_leaves_store_untouched() {
        let mut canvas = canvas();
        canvas.add_section("pricing-simple");
        let root = canvas.section_root(0).unwrap();
        let span = canvas.dom().first_by_tag(root, "span").unwrap();
        let original = canvas.dom().direct_text(span);

        canvas.dispatch(EditorEvent::Click(span));
        canvas.dispatch(EditorEvent::Input("$999".into()));
        canvas.dispatch(EditorEvent::KeyDown(Key::Escape));

        assert!(canvas.composition().override_at(0).is_none());
        assert_eq!(canvas.dom().direct_text(span), original);
    }

    #[test]
    fn test_control_buttons_not_editable() {
        let mut canvas = canvas();
        canvas.add_section("hero-minimal");

        // The template button is editable; the overlay's own buttons are not
        let root = canvas.section_root(0).unwrap();
        let template_button = canvas.dom().first_by_tag(root, "button").unwrap();
        canvas.dispatch(EditorEvent::Click(template_button));
        canvas.dispatch(EditorEvent::Input("Changed".into()));
        canvas.dispatch(EditorEvent::Blur);

        let record = canvas.composition().override_at(0).unwrap();
        assert_eq!(record.text_overrides.get("button").unwrap(), "Changed");
    }

    #[test]
    fn test_remove_mid_edit_cancels_cleanly() {
        let mut canvas = canvas();
        canvas.add_section("hero-minimal");
        canvas.add_section("footer-minimal");
        let root = canvas.section_root(0).unwrap();
        let h1 = canvas.dom().first_by_tag(root, "h1").unwrap();

        canvas.dispatch(EditorEvent::Click(h1));
        canvas.dispatch(EditorEvent::Input("half-typed".into()));
        canvas.remove_section(0).unwrap();

        assert_eq!(canvas.composition().len(), 1);
        assert_eq!(canvas.composition().sections()[0].template_id, "footer-minimal");
        assert!(canvas.composition().override_at(0).is_none());
    }

    #[test]
    fn test_move_keeps_views_aligned_with_overrides() {
        let mut canvas = canvas();
        canvas.add_section("hero-minimal");
        canvas.add_section("pricing-simple");
        canvas
            .apply_patch(0, &OverridePatch::classes("bg-black text-white"))
            .unwrap();

        canvas.move_section(0, MoveDirection::Down).unwrap();

        // Override followed the hero to position 1, and the hero's DOM view
        // moved with it
        let record = canvas.composition().override_at(1).unwrap();
        assert_eq!(record.style_classes, "bg-black text-white");
        let root = canvas.section_root(1).unwrap();
        assert!(canvas.dom().classes(root).iter().any(|c| c == "bg-black"));
        let other = canvas.section_root(0).unwrap();
        assert!(!canvas.dom().classes(other).iter().any(|c| c == "bg-black"));
    }

    #[test]
    fn test_stale_handle_patch_discarded_by_canvas() {
        let mut canvas = canvas();
        let handle = canvas.add_section("hero-minimal").unwrap();
        canvas.add_section("footer-minimal");
        canvas.remove_section(0).unwrap();

        let applied =
            canvas.apply_patch_for_handle(handle, &OverridePatch::classes("too-late"));

        assert!(!applied);
        assert!(canvas.composition().override_at(0).is_none());
    }

    #[test]
    fn test_select_theme() {
        let mut canvas = canvas();
        let themes = ThemeTable::load().unwrap();

        assert!(canvas.select_theme(&themes, "clean-slate"));
        assert_eq!(
            canvas.composition().metadata.theme_id.as_deref(),
            Some("clean-slate")
        );

        assert!(!canvas.select_theme(&themes, "nonexistent"));
        assert_eq!(
            canvas.composition().metadata.theme_id.as_deref(),
            Some("clean-slate")
        );
    }

    #[test]
    fn test_anchor_is_handle_stable() {
        let mut canvas = canvas();
        canvas.add_section("hero-minimal");
        canvas.add_section("pricing-simple");
        let anchor = canvas.anchor_at(1).unwrap();

        canvas.remove_section(0).unwrap();

        // Same section, new position, same anchor
        assert_eq!(canvas.anchor_at(0).unwrap(), anchor);
    }

    #[test]
    fn test_round_trip_through_saved_composition() {
        let mut canvas = canvas();
        canvas.add_section("hero-minimal");
        canvas
            .apply_patch(0, &OverridePatch::text("h1", "Saved Title"))
            .unwrap();

        let saved = canvas.composition().clone();
        let registry = SectionRegistry::load().unwrap();
        let restored = Canvas::from_composition(registry, saved).unwrap();

        let root = restored.section_root(0).unwrap();
        let h1 = restored.dom().first_by_tag(root, "h1").unwrap();
        assert_eq!(restored.dom().direct_text(h1), "Saved Title");
    }

    #[test]
    fn test_render_html_contains_all_sections() {
        let mut canvas = canvas();
        canvas.add_section("header-simple");
        canvas.add_section("footer-minimal");

        let html = canvas.render_html();
        assert!(html.contains("<header"));
        assert!(html.contains("<footer"));
    }
}
