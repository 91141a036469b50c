//! Live editing of rendered sections.
//!
//! Two cooperating pieces: the inline-edit overlay (imperative, user-driven
//! text edits) and the override projector (declarative application of stored
//! overrides). They coordinate through explicit element ownership: whatever
//! node the overlay is editing, the projector leaves alone.

pub mod inline_edit;
pub mod projector;

pub use inline_edit::{EditCommit, EditorEvent, InlineEditor, Key};
pub use projector::project_section;
