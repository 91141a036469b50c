//! Section template catalog.
//!
//! The palette of pre-built sections is embedded in the binary as JSON and
//! loaded once at startup. Templates are immutable; placing one on the canvas
//! instantiates a fresh DOM subtree from its declarative node tree.

use crate::dom::{Dom, NodeId};
use crate::models::SectionCategory;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Declarative node in a section template.
///
/// This is the serialized form of the opaque "render" capability: a tag with
/// optional classes, optional leading text and nested children. Instantiation
/// turns it into live [`Dom`] nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateNode {
    /// Element tag name.
    pub tag: String,
    /// Space-separated utility classes.
    #[serde(default)]
    pub classes: String,
    /// Direct text content, placed before any children.
    #[serde(default)]
    pub text: Option<String>,
    /// Nested child nodes.
    #[serde(default)]
    pub children: Vec<TemplateNode>,
}

impl TemplateNode {
    /// Instantiates this node (and its subtree) into the given arena.
    pub fn instantiate(&self, dom: &mut Dom) -> NodeId {
        let id = dom.create_element(&self.tag);
        let classes: Vec<String> = self
            .classes
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if !classes.is_empty() {
            dom.set_classes(id, &classes);
        }
        if let Some(text) = &self.text {
            let text_node = dom.create_text(text);
            dom.append_child(id, text_node);
        }
        for child in &self.children {
            let child_id = child.instantiate(dom);
            dom.append_child(id, child_id);
        }
        id
    }
}

/// Immutable catalog entry for one placeable section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTemplate {
    /// Unique template id (e.g. "hero-video")
    pub id: String,
    /// Palette category
    pub category: SectionCategory,
    /// Display name for menus (e.g. "Video Hero")
    pub name: String,
    /// Declarative render tree
    pub template: TemplateNode,
}

/// Catalog schema from sections.json.
#[derive(Debug, Clone, Deserialize)]
struct SectionCatalog {
    #[allow(dead_code)]
    version: String,
    sections: Vec<SectionTemplate>,
}

/// Section template registry with id lookup and category listing.
///
/// Registration order is preserved so palette menus render stably.
#[derive(Debug, Clone)]
pub struct SectionRegistry {
    sections: Vec<SectionTemplate>,
    lookup: HashMap<String, usize>,
}

impl SectionRegistry {
    /// Loads the registry from the embedded JSON catalog.
    pub fn load() -> Result<Self> {
        let json_data = include_str!("sections.json");
        let catalog: SectionCatalog =
            serde_json::from_str(json_data).context("Failed to parse embedded sections.json")?;

        let mut lookup = HashMap::new();
        for (idx, section) in catalog.sections.iter().enumerate() {
            lookup.insert(section.id.clone(), idx);
        }

        Ok(Self {
            sections: catalog.sections,
            lookup,
        })
    }

    /// Gets a template by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SectionTemplate> {
        let idx = self.lookup.get(id)?;
        self.sections.get(*idx)
    }

    /// All templates in a category, in registration order.
    #[must_use]
    pub fn list_by_category(&self, category: SectionCategory) -> Vec<&SectionTemplate> {
        self.sections
            .iter()
            .filter(|s| s.category == category)
            .collect()
    }

    /// All templates in registration order.
    #[must_use]
    pub fn all(&self) -> &[SectionTemplate] {
        &self.sections
    }

    /// Case-insensitive substring search over id and display name.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&SectionTemplate> {
        if query.is_empty() {
            return self.sections.iter().collect();
        }
        let query = query.to_lowercase();
        self.sections
            .iter()
            .filter(|s| {
                s.id.to_lowercase().contains(&query) || s.name.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Number of templates in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// True when the catalog is empty (never for the embedded catalog).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
