//! Integration tests: pointer, wheel and keyboard input through the editor.
//!
//! The board fixture is a 1000×800 canvas shown in a 1160×960 container.
//! Less the 80 px fit padding that leaves 1080×880, so the canvas fits at
//! 1:1 and is centered with an (80, 80) pan: screen = canvas + 80.

use kurbo::{Size, Vec2};
use ld_core::id::EntityId;
use ld_core::model::*;
use ld_editor::input::{InputEvent, Modifiers};
use ld_editor::{Editor, viewport};
use ld_render::RetainedScene;
use pretty_assertions::assert_eq;

const CONTAINER: Size = Size::new(1160.0, 960.0);

// title (100,100 300×60), logo (600,400 200×100) and empty background
const TITLE: (f64, f64) = (330.0, 210.0);
const LOGO: (f64, f64) = (780.0, 530.0);
const BACKGROUND: (f64, f64) = (130.0, 780.0);
const CARD: (f64, f64) = (780.0, 230.0);

fn editor() -> Editor<RetainedScene> {
    let mut editor = Editor::new(RetainedScene::new(), CONTAINER);
    editor
        .import_document(include_str!("fixtures/board.json"))
        .expect("board should import");
    editor
}

fn id(s: &str) -> EntityId {
    EntityId::intern(s)
}

fn click(editor: &mut Editor<RetainedScene>, (x, y): (f64, f64), modifiers: Modifiers) {
    editor.handle_input(&InputEvent::PointerDown { x, y, modifiers });
    editor.handle_input(&InputEvent::PointerUp { x, y, modifiers });
}

fn drag(editor: &mut Editor<RetainedScene>, from: (f64, f64), to: (f64, f64)) {
    editor.handle_input(&InputEvent::down(from.0, from.1));
    editor.handle_input(&InputEvent::moved(to.0, to.1));
    editor.handle_input(&InputEvent::up(to.0, to.1));
}

fn selected(editor: &Editor<RetainedScene>) -> Vec<&str> {
    editor.selection().iter().map(|s| s.id.as_str()).collect()
}

fn entity<'a>(editor: &'a Editor<RetainedScene>, name: &str) -> &'a Entity {
    editor.entity(id(name)).expect("entity should exist")
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// ─── Selection ──────────────────────────────────────────────────────────

#[test]
fn click_selects_and_shows_handles() {
    let mut editor = editor();
    click(&mut editor, TITLE, Modifiers::NONE);

    assert_eq!(selected(&editor), vec!["title"]);
    assert_eq!(editor.surface().handles(), &[id("title")]);
    assert!(editor.surface().handles_visible());
}

#[test]
fn plain_click_replaces_selection() {
    let mut editor = editor();
    click(&mut editor, TITLE, Modifiers::NONE);
    click(&mut editor, LOGO, Modifiers::NONE);
    assert_eq!(selected(&editor), vec!["logo"]);
}

#[test]
fn additive_click_toggles_membership() {
    let mut editor = editor();
    click(&mut editor, TITLE, Modifiers::NONE);
    click(&mut editor, LOGO, Modifiers::SHIFT);
    assert_eq!(selected(&editor), vec!["title", "logo"]);

    let ctrl = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };
    click(&mut editor, TITLE, ctrl);
    assert_eq!(selected(&editor), vec!["logo"]);
}

#[test]
fn selection_click_laws() {
    let mut editor = editor();
    click(&mut editor, TITLE, Modifiers::NONE);

    // re-clicking the sole selection keeps it
    let down = editor.handle_input(&InputEvent::down(TITLE.0, TITLE.1));
    let up = editor.handle_input(&InputEvent::up(TITLE.0, TITLE.1));
    assert!(!down && !up);
    assert_eq!(selected(&editor), vec!["title"]);

    // additive click on the sole selection empties it
    click(&mut editor, TITLE, Modifiers::SHIFT);
    assert!(editor.selection().is_empty());

    // a plain click on one member collapses a multi-selection
    click(&mut editor, TITLE, Modifiers::SHIFT);
    click(&mut editor, LOGO, Modifiers::SHIFT);
    assert_eq!(selected(&editor), vec!["title", "logo"]);
    click(&mut editor, LOGO, Modifiers::NONE);
    assert_eq!(selected(&editor), vec!["logo"]);
}

#[test]
fn locked_entities_and_background_clear_selection() {
    let mut editor = editor();
    click(&mut editor, TITLE, Modifiers::NONE);
    click(&mut editor, CARD, Modifiers::NONE);
    assert!(editor.selection().is_empty());

    click(&mut editor, LOGO, Modifiers::NONE);
    click(&mut editor, BACKGROUND, Modifiers::SHIFT);
    assert!(editor.selection().is_empty());
    assert!(!editor.surface().handles_visible());
}

#[test]
fn small_jitter_is_still_a_click() {
    let mut editor = editor();
    editor.handle_input(&InputEvent::down(TITLE.0, TITLE.1));
    editor.handle_input(&InputEvent::moved(TITLE.0 + 2.0, TITLE.1 + 1.0));
    editor.handle_input(&InputEvent::up(TITLE.0 + 2.0, TITLE.1 + 1.0));

    assert_eq!(selected(&editor), vec!["title"]);
    assert_eq!(entity(&editor, "title").x, 100.0);
}

// ─── Drag ───────────────────────────────────────────────────────────────

#[test]
fn drag_previews_then_commits_on_release() {
    let mut editor = editor();
    editor.handle_input(&InputEvent::down(TITLE.0, TITLE.1));
    editor.handle_input(&InputEvent::moved(TITLE.0 + 50.0, TITLE.1 + 20.0));

    // the scene is untouched while the gesture is in flight
    assert_eq!(entity(&editor, "title").x, 100.0);
    let node = editor.surface().node(id("title")).unwrap();
    assert_eq!((node.props.geometry.x, node.props.geometry.y), (150.0, 120.0));

    editor.handle_input(&InputEvent::up(TITLE.0 + 50.0, TITLE.1 + 20.0));
    let title = entity(&editor, "title");
    assert_eq!((title.x, title.y), (150.0, 120.0));
}

#[test]
fn drag_moves_whole_selection() {
    let mut editor = editor();
    click(&mut editor, TITLE, Modifiers::NONE);
    click(&mut editor, LOGO, Modifiers::SHIFT);

    drag(&mut editor, LOGO, (LOGO.0 - 100.0, LOGO.1 + 10.0));
    let title = entity(&editor, "title");
    let logo = entity(&editor, "logo");
    assert_eq!((title.x, title.y), (0.0, 110.0));
    assert_eq!((logo.x, logo.y), (500.0, 410.0));
}

#[test]
fn dragging_unselected_entity_moves_only_it() {
    let mut editor = editor();
    click(&mut editor, LOGO, Modifiers::NONE);

    drag(&mut editor, TITLE, (TITLE.0 + 10.0, TITLE.1 + 10.0));
    assert_eq!(entity(&editor, "title").x, 110.0);
    assert_eq!(entity(&editor, "logo").x, 600.0);
    assert_eq!(selected(&editor), vec!["logo"]);
}

#[test]
fn drag_distance_is_divided_by_zoom() {
    let mut editor = editor();
    editor.set_zoom(2.0);
    let screen = editor.viewport().to_screen(kurbo::Point::new(250.0, 130.0));

    drag(&mut editor, (screen.x, screen.y), (screen.x + 40.0, screen.y));
    assert_eq!(entity(&editor, "title").x, 120.0);
}

// ─── Pan and zoom ───────────────────────────────────────────────────────

#[test]
fn background_drag_pans_the_stage() {
    let mut editor = editor();
    click(&mut editor, TITLE, Modifiers::NONE);

    editor.handle_input(&InputEvent::down(BACKGROUND.0, BACKGROUND.1));
    editor.handle_input(&InputEvent::moved(BACKGROUND.0 + 20.0, BACKGROUND.1 + 10.0));
    editor.handle_input(&InputEvent::up(BACKGROUND.0 + 30.0, BACKGROUND.1 + 20.0));

    assert_eq!(editor.pan(), Vec2::new(110.0, 100.0));
    assert_eq!(editor.surface().pan(), Vec2::new(110.0, 100.0));
    // panning is not a click
    assert_eq!(selected(&editor), vec!["title"]);
}

#[test]
fn locked_entity_drag_pans_instead_of_moving() {
    let mut editor = editor();
    drag(&mut editor, CARD, (CARD.0 + 25.0, CARD.1));
    assert_eq!(entity(&editor, "card").x, 600.0);
    assert_eq!(editor.pan(), Vec2::new(105.0, 80.0));
}

#[test]
fn wheel_zooms_about_the_pointer() {
    let mut editor = editor();
    let pointer = kurbo::Point::new(TITLE.0, TITLE.1);
    let before = editor.viewport().to_canvas(pointer);

    assert!(editor.handle_input(&InputEvent::Wheel {
        x: pointer.x,
        y: pointer.y,
        delta_y: -100.0,
    }));
    assert!(close(editor.zoom(), viewport::WHEEL_STEP));
    assert!(close(editor.surface().scale(), viewport::WHEEL_STEP));

    let after = editor.viewport().to_canvas(pointer);
    assert!(close(before.x, after.x) && close(before.y, after.y));
}

#[test]
fn zoom_requests_are_clamped() {
    let mut editor = editor();
    editor.set_zoom(5.0);
    assert_eq!(editor.zoom(), viewport::MAX_ZOOM);
    assert_eq!(editor.surface().scale(), viewport::MAX_ZOOM);

    editor.set_zoom(-1.0);
    assert_eq!(editor.zoom(), viewport::MIN_ZOOM);
    assert!(!editor.zoom_out());

    assert!(!editor.set_zoom(f64::NAN));
    assert_eq!(editor.zoom(), viewport::MIN_ZOOM);
    assert_eq!(editor.surface().scale(), viewport::MIN_ZOOM);
}

// ─── Transform handles ──────────────────────────────────────────────────

#[test]
fn resize_is_floored_at_minimum_box() {
    let mut editor = editor();
    click(&mut editor, LOGO, Modifiers::NONE);

    // bottom-right anchor of the logo sits at canvas (800, 500)
    drag(&mut editor, (880.0, 580.0), (0.0, 0.0));
    let logo = entity(&editor, "logo");
    assert_eq!((logo.x, logo.y), (600.0, 400.0));
    assert_eq!((logo.width, logo.height), (30.0, 20.0));
}

#[test]
fn resize_from_middle_right_scales_width() {
    let mut editor = editor();
    click(&mut editor, LOGO, Modifiers::NONE);

    // middle-right anchor at canvas (800, 450)
    editor.handle_input(&InputEvent::down(880.0, 530.0));
    editor.handle_input(&InputEvent::moved(980.0, 560.0));
    assert!(editor.surface().handles_visible());
    assert_eq!(entity(&editor, "logo").width, 200.0);

    editor.handle_input(&InputEvent::up(980.0, 560.0));
    let logo = entity(&editor, "logo");
    assert_eq!((logo.width, logo.height), (300.0, 100.0));
    assert_eq!(selected(&editor), vec!["logo"]);
}

#[test]
fn rotate_anchor_turns_about_center_and_snaps() {
    let mut editor = editor();
    click(&mut editor, LOGO, Modifiers::NONE);

    // rotate anchor 50px above the top-center (700, 400); sweep to the
    // right of the center (700, 450) for a quarter turn, a little short
    drag(&mut editor, (780.0, 430.0), (880.0, 522.0));

    let logo = entity(&editor, "logo");
    assert_eq!(logo.style.rotation, 90.0);
    assert!(close(logo.x, 750.0) && close(logo.y, 350.0));
    assert_eq!((logo.width, logo.height), (200.0, 100.0));
}

// ─── Keyboard ───────────────────────────────────────────────────────────

#[test]
fn delete_key_removes_selection() {
    let mut editor = editor();
    click(&mut editor, LOGO, Modifiers::NONE);
    assert!(editor.handle_input(&InputEvent::key("Delete", Modifiers::NONE)));

    assert!(editor.entity(id("logo")).is_none());
    assert!(editor.surface().node(id("logo")).is_none());
    assert!(editor.selection().is_empty());
    assert!(!editor.handle_input(&InputEvent::key("Backspace", Modifiers::NONE)));
}

#[test]
fn select_all_skips_locked_entities() {
    let mut editor = editor();
    let cmd = Modifiers {
        meta: true,
        ..Modifiers::NONE
    };
    editor.handle_input(&InputEvent::key("a", cmd));
    assert_eq!(selected(&editor), vec!["title", "logo"]);

    editor.handle_input(&InputEvent::key("Escape", Modifiers::NONE));
    assert!(editor.selection().is_empty());
}

#[test]
fn duplicate_shortcut_copies_on_top() {
    let mut editor = editor();
    click(&mut editor, TITLE, Modifiers::NONE);
    let ctrl = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };
    assert!(editor.handle_input(&InputEvent::key("d", ctrl)));

    assert_eq!(editor.entities().len(), 5);
    let copy = editor.entities().last().unwrap();
    assert!(copy.id.as_str().starts_with("title_copy_"));
    assert_eq!((copy.x, copy.y), (120.0, 120.0));
    assert_eq!(copy.z_order, 6);
    assert_eq!(copy.text(), Some("Title"));
    assert_eq!(selected(&editor), vec![copy.id.as_str()]);
}

#[test]
fn zoom_shortcuts() {
    let mut editor = editor();
    let cmd = Modifiers {
        meta: true,
        ..Modifiers::NONE
    };
    editor.handle_input(&InputEvent::key("=", cmd));
    assert!(close(editor.zoom(), 1.1));
    editor.handle_input(&InputEvent::key("0", cmd));
    assert_eq!(editor.zoom(), 1.0);
}
