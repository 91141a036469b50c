//! Core data structures for page composition.

pub mod composition;
pub mod overrides;
pub mod section;

pub use composition::{Composition, CompositionMetadata, CompositionSnapshot};
pub use overrides::{OverridePatch, OverrideRecord};
pub use section::{MoveDirection, PlacedSection, SectionCategory, SectionHandle};
