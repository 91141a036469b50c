//! Override projector: applies stored overrides onto live DOM.
//!
//! Runs after every composition mutation and after structural re-renders.
//! Application is idempotent; projecting the same record onto the same
//! subtree twice leaves the DOM exactly as after the first pass.

use crate::dom::{Dom, NodeId};
use crate::models::OverrideRecord;

/// Applies `record` onto the rendered subtree at `root`.
///
/// - Wrapper classes become `base_classes` followed by the record's style
///   classes (duplicates removed, order preserved).
/// - A background image override sets cover/center/no-repeat inline styles
///   on the wrapper; its absence removes them.
/// - Each text override lands on the first element matching its tag within
///   the subtree, except the element currently under active inline edit
///   (`editing`), which is skipped so live input is never clobbered.
///
/// `base_classes` is the template's original wrapper class list, captured at
/// render time; threading it through is what makes re-projection idempotent
/// instead of accumulative.
pub fn project_section(
    dom: &mut Dom,
    root: NodeId,
    base_classes: &[String],
    record: &OverrideRecord,
    editing: Option<NodeId>,
) {
    apply_wrapper_classes(dom, root, base_classes, &record.style_classes);
    apply_background(dom, root, record.background_image_url.as_deref());

    for (tag, text) in &record.text_overrides {
        let Some(target) = dom.first_by_tag(root, tag) else {
            continue;
        };
        if editing == Some(target) {
            continue;
        }
        if dom.direct_text(target) != *text {
            dom.set_direct_text(target, text);
        }
    }
}

fn apply_wrapper_classes(dom: &mut Dom, root: NodeId, base: &[String], extra: &str) {
    let mut classes: Vec<String> = Vec::with_capacity(base.len());
    for class in base.iter().map(String::as_str).chain(extra.split_whitespace()) {
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }
    dom.set_classes(root, &classes);
}

fn apply_background(dom: &mut Dom, root: NodeId, url: Option<&str>) {
    match url {
        Some(url) => {
            dom.set_style(root, "background-image", &format!("url('{url}')"));
            dom.set_style(root, "background-size", "cover");
            dom.set_style(root, "background-position", "center");
            dom.set_style(root, "background-repeat", "no-repeat");
        }
        None => {
            dom.remove_style(root, "background-image");
            dom.remove_style(root, "background-size");
            dom.remove_style(root, "background-position");
            dom.remove_style(root, "background-repeat");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OverridePatch, OverrideRecord};

    fn rendered_section(dom: &mut Dom) -> (NodeId, Vec<String>) {
        let section = dom.create_element("section");
        let base = vec!["py-24".to_string(), "container".to_string()];
        dom.set_classes(section, &base);
        let h1 = dom.create_element("h1");
        let t = dom.create_text("Hello");
        dom.append_child(h1, t);
        dom.append_child(section, h1);
        (section, base)
    }

    fn record_with(patches: &[OverridePatch]) -> OverrideRecord {
        let mut record = OverrideRecord::default();
        for patch in patches {
            record.apply(patch);
        }
        record
    }

    #[test]
    fn test_projection_applies_classes_text_background() {
        let mut dom = Dom::new();
        let (root, base) = rendered_section(&mut dom);
        let record = record_with(&[
            OverridePatch::classes("bg-blue-500 text-white"),
            OverridePatch::text("h1", "Welcome"),
            OverridePatch::background("/uploads/bg.png"),
        ]);

        project_section(&mut dom, root, &base, &record, None);

        assert_eq!(
            dom.classes(root),
            ["py-24", "container", "bg-blue-500", "text-white"]
                .map(String::from)
        );
        assert_eq!(
            dom.style(root, "background-image"),
            Some("url('/uploads/bg.png')")
        );
        assert_eq!(dom.style(root, "background-size"), Some("cover"));
        let h1 = dom.first_by_tag(root, "h1").unwrap();
        assert_eq!(dom.direct_text(h1), "Welcome");
    }

    #[test]
    fn test_projection_is_idempotent() {
        let mut dom = Dom::new();
        let (root, base) = rendered_section(&mut dom);
        let record = record_with(&[
            OverridePatch::classes("bg-blue-500"),
            OverridePatch::text("h1", "Welcome"),
            OverridePatch::background("/uploads/bg.png"),
        ]);

        project_section(&mut dom, root, &base, &record, None);
        let first = dom.to_html(root);
        project_section(&mut dom, root, &base, &record, None);
        let second = dom.to_html(root);

        assert_eq!(first, second);
    }

    #[test]
    fn test_projection_replaces_stale_override_classes() {
        let mut dom = Dom::new();
        let (root, base) = rendered_section(&mut dom);

        project_section(
            &mut dom,
            root,
            &base,
            &record_with(&[OverridePatch::classes("bg-blue-500")]),
            None,
        );
        project_section(
            &mut dom,
            root,
            &base,
            &record_with(&[OverridePatch::classes("bg-red-500")]),
            None,
        );

        let classes = dom.classes(root);
        assert!(classes.iter().any(|c| c == "bg-red-500"));
        assert!(!classes.iter().any(|c| c == "bg-blue-500"));
    }

    #[test]
    fn test_projection_clears_removed_background() {
        let mut dom = Dom::new();
        let (root, base) = rendered_section(&mut dom);

        project_section(
            &mut dom,
            root,
            &base,
            &record_with(&[OverridePatch::background("/uploads/bg.png")]),
            None,
        );
        project_section(&mut dom, root, &base, &OverrideRecord::default(), None);

        assert_eq!(dom.style(root, "background-image"), None);
        assert_eq!(dom.style(root, "background-size"), None);
    }

    #[test]
    fn test_projection_skips_element_under_edit() {
        let mut dom = Dom::new();
        let (root, base) = rendered_section(&mut dom);
        let h1 = dom.first_by_tag(root, "h1").unwrap();
        dom.set_direct_text(h1, "user is typing her");

        let record = record_with(&[OverridePatch::text("h1", "Stored Override")]);
        project_section(&mut dom, root, &base, &record, Some(h1));

        // Live input preserved
        assert_eq!(dom.direct_text(h1), "user is typing her");

        // Once the edit ends, projection applies normally
        project_section(&mut dom, root, &base, &record, None);
        assert_eq!(dom.direct_text(h1), "Stored Override");
    }

    #[test]
    fn test_projection_ignores_unmatched_tags() {
        let mut dom = Dom::new();
        let (root, base) = rendered_section(&mut dom);
        let record = record_with(&[OverridePatch::text("h2", "No Such Element")]);

        // Must not panic or invent elements
        project_section(&mut dom, root, &base, &record, None);
        assert!(dom.first_by_tag(root, "h2").is_none());
    }

    #[test]
    fn test_projection_targets_first_match_only() {
        let mut dom = Dom::new();
        let root = dom.create_element("section");
        let base: Vec<String> = Vec::new();
        let p1 = dom.create_element("p");
        let t1 = dom.create_text("first");
        dom.append_child(p1, t1);
        let p2 = dom.create_element("p");
        let t2 = dom.create_text("second");
        dom.append_child(p2, t2);
        dom.append_child(root, p1);
        dom.append_child(root, p2);

        let record = record_with(&[OverridePatch::text("p", "patched")]);
        project_section(&mut dom, root, &base, &record, None);

        assert_eq!(dom.direct_text(p1), "patched");
        assert_eq!(dom.direct_text(p2), "second");
    }
}
