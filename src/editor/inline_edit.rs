//! Inline-edit overlay state machine.
//!
//! Lets the user click directly on rendered text and edit it in place. One
//! element at most is editable at a time; starting a new edit force-commits
//! the previous one. Commits are reported to the caller as tag-keyed patches;
//! the overlay itself never touches the composition store.

use crate::dom::{Dom, NodeId};
use std::collections::HashSet;

/// Tags the overlay will turn editable on click.
pub const EDITABLE_TAGS: [&str; 10] = [
    "h1", "h2", "h3", "h4", "p", "span", "button", "a", "li", "blockquote",
];

/// Tags where Enter (without Shift) commits instead of inserting a newline.
const SINGLE_LINE_TAGS: [&str; 5] = ["h1", "h2", "h3", "h4", "p"];

/// Dashed affordance shown while hovering an eligible element.
const HOVER_CLASSES: [&str; 2] = ["outline-dashed", "outline-1"];

/// Solid outline marking the element under active edit.
const EDIT_CLASSES: [&str; 2] = ["outline", "outline-2"];

/// Keyboard input relevant to the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Enter, with the Shift modifier state.
    Enter {
        /// Whether Shift was held (soft line break, no commit).
        shift: bool,
    },
    /// Escape cancels the edit.
    Escape,
}

/// Pointer and focus events the canvas forwards to the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// Pointer entered an element.
    PointerEnter(NodeId),
    /// Pointer left an element.
    PointerLeave(NodeId),
    /// Element was clicked.
    Click(NodeId),
    /// Text was typed into the element under edit.
    Input(String),
    /// A key was pressed while editing.
    KeyDown(Key),
    /// The element under edit lost focus.
    Blur,
}

/// A committed inline edit, keyed by the edited element's tag name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCommit {
    /// Tag name of the edited element (override map key).
    pub tag: String,
    /// New text content, trimmed.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum EditState {
    Idle,
    Editing { node: NodeId, original: String },
}

/// Per-canvas inline-edit state machine.
#[derive(Debug, Clone)]
pub struct InlineEditor {
    state: EditState,
    hovered: Option<NodeId>,
    /// Overlay control elements (move/remove buttons); never editable.
    controls: HashSet<NodeId>,
}

impl Default for InlineEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl InlineEditor {
    /// Creates an overlay in the idle state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: EditState::Idle,
            hovered: None,
            controls: HashSet::new(),
        }
    }

    /// Registers a node as part of the overlay's own controls.
    ///
    /// Clicks and hovers on control nodes never start an edit.
    pub fn register_control(&mut self, node: NodeId) {
        self.controls.insert(node);
    }

    /// The node currently under active edit, if any.
    ///
    /// The projector consults this to avoid clobbering live input.
    #[must_use]
    pub fn editing_node(&self) -> Option<NodeId> {
        match &self.state {
            EditState::Editing { node, .. } => Some(*node),
            EditState::Idle => None,
        }
    }

    /// True when `node` may be edited: an allow-listed text-bearing tag that
    /// is not one of the overlay's controls.
    #[must_use]
    pub fn is_eligible(&self, dom: &Dom, node: NodeId) -> bool {
        if self.controls.contains(&node) {
            return false;
        }
        dom.tag(node)
            .is_some_and(|tag| EDITABLE_TAGS.contains(&tag))
    }

    /// Feeds one event into the state machine.
    ///
    /// Returns a commit when the event ended an edit with changed text; the
    /// caller merges it into the composition store.
    pub fn handle(&mut self, dom: &mut Dom, event: EditorEvent) -> Option<EditCommit> {
        match event {
            EditorEvent::PointerEnter(node) => {
                self.pointer_enter(dom, node);
                None
            }
            EditorEvent::PointerLeave(node) => {
                self.pointer_leave(dom, node);
                None
            }
            EditorEvent::Click(node) => self.click(dom, node),
            EditorEvent::Input(text) => {
                self.input(dom, &text);
                None
            }
            EditorEvent::KeyDown(key) => self.key_down(dom, key),
            EditorEvent::Blur => self.commit(dom),
        }
    }

    fn pointer_enter(&mut self, dom: &mut Dom, node: NodeId) {
        if !self.is_eligible(dom, node) || self.editing_node() == Some(node) {
            return;
        }
        for class in HOVER_CLASSES {
            dom.add_class(node, class);
        }
        self.hovered = Some(node);
    }

    fn pointer_leave(&mut self, dom: &mut Dom, node: NodeId) {
        // Keep the outline on the element being edited
        if self.editing_node() == Some(node) {
            return;
        }
        for class in HOVER_CLASSES {
            dom.remove_class(node, class);
        }
        if self.hovered == Some(node) {
            self.hovered = None;
        }
    }

    fn click(&mut self, dom: &mut Dom, node: NodeId) -> Option<EditCommit> {
        if !self.is_eligible(dom, node) {
            return None;
        }
        if self.editing_node() == Some(node) {
            return None;
        }

        // Force-commit any edit in progress before starting the new one
        let committed = self.commit(dom);

        for class in HOVER_CLASSES {
            dom.remove_class(node, class);
        }
        for class in EDIT_CLASSES {
            dom.add_class(node, class);
        }
        self.state = EditState::Editing {
            node,
            original: dom.direct_text(node),
        };

        committed
    }

    fn input(&mut self, dom: &mut Dom, text: &str) {
        if let EditState::Editing { node, .. } = &self.state {
            dom.set_direct_text(*node, text);
        }
    }

    fn key_down(&mut self, dom: &mut Dom, key: Key) -> Option<EditCommit> {
        match key {
            Key::Escape => {
                self.cancel(dom);
                None
            }
            Key::Enter { shift: false } => {
                let single_line = self
                    .editing_node()
                    .and_then(|node| dom.tag(node).map(str::to_string))
                    .is_some_and(|tag| SINGLE_LINE_TAGS.contains(&tag.as_str()));
                if single_line {
                    self.commit(dom)
                } else {
                    None
                }
            }
            Key::Enter { shift: true } => None,
        }
    }

    /// Ends the current edit, emitting a commit when the trimmed text differs
    /// from the trimmed original snapshot.
    fn commit(&mut self, dom: &mut Dom) -> Option<EditCommit> {
        let EditState::Editing { node, original } = std::mem::replace(&mut self.state, EditState::Idle)
        else {
            return None;
        };

        self.cleanup(dom, node);

        let current = dom.direct_text(node);
        let trimmed = current.trim();
        if trimmed == original.trim() {
            return None;
        }

        let tag = dom.tag(node)?.to_string();
        Some(EditCommit {
            tag,
            text: trimmed.to_string(),
        })
    }

    /// Ends the current edit, restoring the original snapshot. Never emits.
    fn cancel(&mut self, dom: &mut Dom) {
        let EditState::Editing { node, original } = std::mem::replace(&mut self.state, EditState::Idle)
        else {
            return;
        };

        dom.set_direct_text(node, &original);
        self.cleanup(dom, node);
    }

    fn cleanup(&mut self, dom: &mut Dom, node: NodeId) {
        for class in EDIT_CLASSES.iter().chain(HOVER_CLASSES.iter()) {
            dom.remove_class(node, class);
        }
    }
}
