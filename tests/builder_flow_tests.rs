//! End-to-end flow: build a page on the canvas, edit it inline, and export
//! it through both generators.

use pageforge::canvas::Canvas;
use pageforge::codegen::{generate_nextjs, generate_react};
use pageforge::editor::{EditorEvent, Key};
use pageforge::models::{MoveDirection, OverridePatch};
use pageforge::registry::SectionRegistry;
use pageforge::themes::ThemeTable;

fn new_canvas() -> Canvas {
    let registry = SectionRegistry::load().expect("catalog loads");
    Canvas::new(registry, "Launch Page")
}

#[test]
fn test_full_builder_session_to_react() {
    let mut canvas = new_canvas();
    canvas.add_section("header-simple");
    let hero = canvas.add_section("hero-video").unwrap();
    canvas.add_section("footer-minimal");

    // Inline edit: retitle the hero
    let root = canvas.section_root(1).unwrap();
    let h1 = canvas.dom().first_by_tag(root, "h1").unwrap();
    canvas.dispatch(EditorEvent::Click(h1));
    canvas.dispatch(EditorEvent::Input("Ship it today".into()));
    canvas.dispatch(EditorEvent::KeyDown(Key::Enter { shift: false }));

    // Simulated AI completion addressed by handle
    assert!(canvas.apply_patch_for_handle(hero, &OverridePatch::classes("bg-slate-950 text-white")));

    // Reorder: hero above the header
    assert!(canvas.move_section(1, MoveDirection::Up).unwrap());

    let file = generate_react(canvas.composition().snapshot(), canvas.registry());
    let hero_pos = file.contents.find("<VideoHero />").unwrap();
    let header_pos = file.contents.find("<SimpleHeader />").unwrap();
    assert!(hero_pos < header_pos);
    assert!(file.contents.contains("bg-slate-950"));
    assert!(file.contents.contains("{/* h1: \"Ship it today\" */}"));
}

#[test]
fn test_full_builder_session_to_nextjs_with_theme() {
    let mut canvas = new_canvas();
    canvas.add_section("hero-minimal");
    canvas.add_section("pricing-simple");

    let themes = ThemeTable::load().unwrap();
    assert!(canvas.select_theme(&themes, "elegant-luxury"));

    let theme_id = canvas.composition().metadata.theme_id.clone().unwrap();
    let theme = themes.get(&theme_id);
    let files = generate_nextjs(canvas.composition().snapshot(), canvas.registry(), theme);

    assert_eq!(files.len(), 2);
    assert!(files[0].contents.contains("Poppins"));
    assert!(files[1].contents.contains("<SimplePricing />"));
}

#[test]
fn test_preview_html_tracks_overrides_and_edits() {
    let mut canvas = new_canvas();
    canvas.add_section("card-cta");
    canvas
        .apply_patch(0, &OverridePatch::background("/uploads/banner.png"))
        .unwrap();

    let html = canvas.render_html();
    assert!(html.contains("background-image: url('/uploads/banner.png')"));
    assert!(html.contains("background-size: cover"));

    // Clearing the background removes the inline styles on re-projection
    canvas
        .apply_patch(0, &OverridePatch::clear_background())
        .unwrap();
    let html = canvas.render_html();
    assert!(!html.contains("background-image"));
}

#[test]
fn test_empty_composition_exports_cleanly() {
    let canvas = new_canvas();

    let react = generate_react(canvas.composition().snapshot(), canvas.registry());
    assert!(react.contents.contains("export default function GeneratedPage()"));

    let files = generate_nextjs(canvas.composition().snapshot(), canvas.registry(), None);
    assert!(files[1].contents.contains("export default function Page()"));
}
