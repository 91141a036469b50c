//! Placed sections and their addressing.

use serde::{Deserialize, Serialize};

/// Category tag grouping section templates in the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionCategory {
    /// Navigation bars and page headers
    Header,
    /// Hero banners
    Hero,
    /// Feature grids and content blocks
    Feature,
    /// Pricing tables
    Pricing,
    /// Card collections and testimonials
    Card,
    /// Page footers
    Footer,
}

impl SectionCategory {
    /// All categories in palette order.
    pub const ALL: [SectionCategory; 6] = [
        SectionCategory::Header,
        SectionCategory::Hero,
        SectionCategory::Feature,
        SectionCategory::Pricing,
        SectionCategory::Card,
        SectionCategory::Footer,
    ];

    /// Parses a lowercase category id (e.g. "hero").
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "header" => Some(SectionCategory::Header),
            "hero" => Some(SectionCategory::Hero),
            "feature" => Some(SectionCategory::Feature),
            "pricing" => Some(SectionCategory::Pricing),
            "card" => Some(SectionCategory::Card),
            "footer" => Some(SectionCategory::Footer),
            _ => None,
        }
    }

    /// Human-readable label for menus.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            SectionCategory::Header => "Headers",
            SectionCategory::Hero => "Heroes",
            SectionCategory::Feature => "Features",
            SectionCategory::Pricing => "Pricing",
            SectionCategory::Card => "Cards",
            SectionCategory::Footer => "Footers",
        }
    }
}

/// Stable identity of a placed section.
///
/// Positions shift under removal and reordering, so anything that needs to
/// address a section across mutations (scroll anchors, in-flight AI requests)
/// holds a handle instead of an index. Handles are unique per composition and
/// never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionHandle(pub u64);

/// One instance of a template placed on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedSection {
    /// Registry id of the template this instance renders.
    pub template_id: String,
    /// Stable handle assigned by the composition at placement time.
    pub handle: SectionHandle,
}

/// Direction for adjacent-swap reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    /// Towards the start of the page
    Up,
    /// Towards the end of the page
    Down,
}
