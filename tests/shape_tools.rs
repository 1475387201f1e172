mod common;

use common::{approx_eq, click, create_test_editor, drag_with_modifiers, draw_shape, move_to, press, release};
use egui::{Color32, Modifiers, pos2, vec2};
use sketch_studio::compositor::Preview;
use sketch_studio::editor::PASTE_OFFSET;
use sketch_studio::perspective::{PerspectiveMode, SetupType};
use sketch_studio::shape::{FlipAxis, ShapeKind, TextContent};
use sketch_studio::state::Gesture;
use sketch_studio::style::{FontStyle, ShapeStyle, TextAlign};
use sketch_studio::text::FontBook;
use sketch_studio::{LayerId, Shape, ShapeId, ToolKind};

#[test]
fn test_rectangle_drag_threshold() {
    let mut editor = create_test_editor();
    draw_shape(&mut editor, ToolKind::Rectangle, pos2(100.0, 100.0), pos2(104.0, 100.0));
    assert!(editor.doc.shapes().is_empty());
    assert_eq!(editor.tool(), ToolKind::Rectangle);

    draw_shape(&mut editor, ToolKind::Rectangle, pos2(100.0, 100.0), pos2(106.0, 100.0));
    assert_eq!(editor.doc.shapes().len(), 1);
    let shape = &editor.doc.shapes()[0];
    assert_eq!(shape.kind, ShapeKind::Rectangle);
    assert_eq!(editor.selection(), Some(shape.id));
    assert_eq!(editor.tool(), ToolKind::Select);
}

#[test]
fn test_rectangle_corners_follow_the_drag() {
    let mut editor = create_test_editor();
    draw_shape(&mut editor, ToolKind::Rectangle, pos2(150.0, 120.0), pos2(50.0, 40.0));
    let points = &editor.doc.shapes()[0].points;
    let expected = [pos2(50.0, 40.0), pos2(150.0, 40.0), pos2(150.0, 120.0), pos2(50.0, 120.0)];
    for (point, expected) in points.iter().zip(expected) {
        assert!(approx_eq(*point, expected), "{point:?} != {expected:?}");
    }
}

#[test]
fn test_circle_hit_testing() {
    let mut editor = create_test_editor();
    draw_shape(&mut editor, ToolKind::Circle, pos2(100.0, 100.0), pos2(200.0, 200.0));
    let shape = &editor.doc.shapes()[0];
    assert!(shape.contains_point(pos2(150.0, 150.0), 1.0, editor.fonts()));
    assert!(!shape.contains_point(pos2(250.0, 250.0), 1.0, editor.fonts()));
    // Inside the bounding box but outside the ellipse
    assert!(!shape.contains_point(pos2(103.0, 103.0), 1.0, editor.fonts()));
}

#[test]
fn test_flip_twice_is_identity() {
    let mut editor = create_test_editor();
    draw_shape(&mut editor, ToolKind::Curve, pos2(30.0, 40.0), pos2(170.0, 90.0));
    let before = editor.doc.shapes()[0].points.clone();

    assert!(editor.flip_selected(FlipAxis::Horizontal));
    assert_ne!(editor.doc.shapes()[0].points, before);
    assert!(editor.flip_selected(FlipAxis::Horizontal));
    for (after, before) in editor.doc.shapes()[0].points.iter().zip(&before) {
        assert!(approx_eq(*after, *before));
    }

    assert!(editor.flip_selected(FlipAxis::Vertical));
    assert!(editor.flip_selected(FlipAxis::Vertical));
    for (after, before) in editor.doc.shapes()[0].points.iter().zip(&before) {
        assert!(approx_eq(*after, *before));
    }
}

#[test]
fn test_paste_offsets_copy_under_new_id() {
    let mut editor = create_test_editor();
    draw_shape(&mut editor, ToolKind::Rectangle, pos2(20.0, 20.0), pos2(80.0, 60.0));
    let original = editor.doc.shapes()[0].clone();

    assert!(editor.copy());
    let pasted_id = editor.paste().expect("clipboard holds a shape");
    assert_ne!(pasted_id, original.id);
    assert_eq!(editor.selection(), Some(pasted_id));

    let pasted = editor.doc.shape(pasted_id).expect("pasted shape exists");
    for (copy, source) in pasted.points.iter().zip(&original.points) {
        assert!(approx_eq(*copy, pos2(source.x + PASTE_OFFSET, source.y + PASTE_OFFSET)));
    }
}

#[test]
fn test_dragging_selected_shape_moves_it_once() {
    let mut editor = create_test_editor();
    draw_shape(&mut editor, ToolKind::Rectangle, pos2(20.0, 20.0), pos2(120.0, 80.0));
    let history = editor.history().len();

    press(&mut editor, pos2(70.0, 50.0));
    move_to(&mut editor, pos2(80.0, 60.0));
    move_to(&mut editor, pos2(90.0, 70.0));
    release(&mut editor, pos2(90.0, 70.0));

    let shape = &editor.doc.shapes()[0];
    assert!(approx_eq(shape.points[0], pos2(40.0, 40.0)));
    assert_eq!(editor.history().len(), history + 1);

    // A click without movement leaves history alone
    press(&mut editor, pos2(70.0, 50.0));
    release(&mut editor, pos2(70.0, 50.0));
    assert_eq!(editor.history().len(), history + 1);
}

#[test]
fn test_grid_snap_rounds_to_nearest_node() {
    let mut editor = create_test_editor();
    editor.snap.to_grid = true;
    assert!(approx_eq(editor.snapped(pos2(101.0, 199.0)), pos2(100.0, 200.0)));
    // Too far from any node to snap
    assert!(approx_eq(editor.snapped(pos2(110.0, 190.0)), pos2(110.0, 190.0)));
}

#[test]
fn test_object_snap_prefers_handles_over_grid() {
    let mut editor = create_test_editor();
    draw_shape(&mut editor, ToolKind::Rectangle, pos2(33.0, 33.0), pos2(87.0, 77.0));
    editor.select_tool(ToolKind::Rectangle);
    editor.snap.to_grid = true;
    editor.snap.to_objects = true;
    assert!(approx_eq(editor.snapped(pos2(35.0, 36.0)), pos2(33.0, 33.0)));
}

#[test]
fn test_line_snaps_onto_perspective_ray() {
    let mut editor = create_test_editor();
    editor.perspective.start_setup(SetupType::OnePoint);
    editor.perspective.handle_setup_click(pos2(0.0, 100.0));
    editor.perspective.handle_setup_click(pos2(300.0, 100.0));
    assert!(editor.perspective.is_configured());

    editor.select_tool(ToolKind::Line);
    press(&mut editor, pos2(100.0, 200.0));
    move_to(&mut editor, pos2(205.0, 148.0));
    let Some(Preview::Line { start, end, .. }) = editor.preview() else {
        panic!("expected a line preview");
    };
    assert!(approx_eq(start, pos2(100.0, 200.0)));
    assert!((end.x - 204.8).abs() < 0.01);
    assert!((end.y - 147.6).abs() < 0.01);
    release(&mut editor, pos2(205.0, 148.0));
    assert!(editor.preview().is_none());
}

#[test]
fn test_text_tool_creates_and_edits_text() {
    let mut editor = create_test_editor();
    editor.select_tool(ToolKind::Text);
    press(&mut editor, pos2(50.0, 50.0));
    release(&mut editor, pos2(50.0, 50.0));

    let id = editor.selection().expect("text shape selected");
    assert_eq!(editor.tool(), ToolKind::Select);
    assert_eq!(editor.text_edit().map(|edit| edit.shape), Some(id));

    if let Some(buffer) = editor.text_edit_buffer_mut() {
        *buffer = "First line\nSecond line".to_string();
    }
    assert!(editor.commit_text_edit());
    let text = editor.doc.shape(id).and_then(|shape| shape.text_content()).map(|c| c.text.clone());
    assert_eq!(text.as_deref(), Some("First line\nSecond line"));
}

#[test]
fn test_tool_shortcuts_ignored_while_editing_text() {
    let mut editor = create_test_editor();
    editor.select_tool(ToolKind::Text);
    press(&mut editor, pos2(50.0, 50.0));
    release(&mut editor, pos2(50.0, 50.0));

    editor.key_down(egui::Key::R, egui::Modifiers::NONE);
    assert_eq!(editor.tool(), ToolKind::Select);

    editor.cancel_text_edit();
    editor.key_down(egui::Key::R, egui::Modifiers::NONE);
    assert_eq!(editor.tool(), ToolKind::Rectangle);
}

#[test]
fn test_freehand_stroke_follows_snapped_points() {
    let mut editor = create_test_editor();
    editor.snap.to_grid = true;
    editor.select_tool(ToolKind::Sketch);

    press(&mut editor, pos2(41.0, 59.0));
    let Gesture::Freehand { last, .. } = *editor.gesture() else {
        panic!("expected a freehand stroke");
    };
    assert!(approx_eq(last, pos2(40.0, 60.0)));

    move_to(&mut editor, pos2(119.0, 81.0));
    let Gesture::Freehand { last, last_mid, .. } = *editor.gesture() else {
        panic!("expected a freehand stroke");
    };
    assert!(approx_eq(last, pos2(120.0, 80.0)));
    assert!(approx_eq(last_mid, pos2(80.0, 70.0)));
    release(&mut editor, pos2(119.0, 81.0));
}

fn one_point_perspective(editor: &mut sketch_studio::Editor, horizon: f32, vp_x: f32) {
    editor.perspective.start_setup(SetupType::OnePoint);
    editor.perspective.handle_setup_click(pos2(0.0, horizon));
    editor.perspective.handle_setup_click(pos2(vp_x, horizon));
}

#[test]
fn test_vanishing_point_drag_stays_on_horizon_within_view() {
    let mut editor = create_test_editor();
    one_point_perspective(&mut editor, 100.0, 300.0);
    editor.select_tool(ToolKind::Select);
    let history = editor.history().len();

    press(&mut editor, pos2(300.0, 100.0));
    move_to(&mut editor, pos2(350.0, 100.0));
    assert!(approx_eq(editor.perspective.vanishing_points()[0], pos2(350.0, 100.0)));
    move_to(&mut editor, pos2(500.0, 180.0));
    release(&mut editor, pos2(500.0, 180.0));

    // Clamped to the right edge of the 400px viewport, pinned to the horizon
    assert!(approx_eq(editor.perspective.vanishing_points()[0], pos2(400.0, 100.0)));
    assert_eq!(editor.history().len(), history + 1);

    // Grabbing without moving is not an edit
    press(&mut editor, pos2(400.0, 100.0));
    release(&mut editor, pos2(400.0, 100.0));
    assert_eq!(editor.history().len(), history + 1);
}

#[test]
fn test_two_point_setup_by_clicking() {
    let mut editor = create_test_editor();
    editor.perspective.start_setup(SetupType::TwoPoint);

    click(&mut editor, pos2(0.0, 120.0));
    assert_eq!(editor.perspective.horizon_y(), Some(120.0));
    click(&mut editor, pos2(50.0, 130.0));
    assert!(editor.perspective.is_setup_active());
    click(&mut editor, pos2(350.0, 90.0));

    assert!(!editor.perspective.is_setup_active());
    assert_eq!(editor.perspective.mode(), PerspectiveMode::TwoPoint);
    assert_eq!(editor.perspective.vanishing_points(), &[pos2(50.0, 120.0), pos2(350.0, 120.0)]);
    // Setup clicks never create shapes
    assert!(editor.doc.shapes().is_empty());
}

#[test]
fn test_corner_handle_skews_a_single_point() {
    let mut editor = create_test_editor();
    draw_shape(&mut editor, ToolKind::Rectangle, pos2(100.0, 100.0), pos2(200.0, 200.0));
    let before = editor.doc.shapes()[0].points.clone();
    let history = editor.history().len();

    press(&mut editor, pos2(200.0, 200.0));
    move_to(&mut editor, pos2(230.0, 210.0));
    release(&mut editor, pos2(230.0, 210.0));

    let points = &editor.doc.shapes()[0].points;
    assert!(approx_eq(points[2], pos2(230.0, 210.0)));
    for index in [0, 1, 3] {
        assert!(approx_eq(points[index], before[index]));
    }
    assert_eq!(editor.history().len(), history + 1);
}

#[test]
fn test_shift_drag_draws_a_square() {
    let mut editor = create_test_editor();
    editor.select_tool(ToolKind::Rectangle);
    drag_with_modifiers(&mut editor, pos2(100.0, 100.0), pos2(160.0, 130.0), Modifiers::SHIFT);

    let points = &editor.doc.shapes()[0].points;
    assert!(approx_eq(points[0], pos2(100.0, 100.0)));
    assert!(approx_eq(points[2], pos2(160.0, 160.0)));
}

#[test]
fn test_unfilled_curve_hit_tolerance_shrinks_with_zoom() {
    let fonts = FontBook::new();
    let curve = Shape::curve(
        ShapeId(1),
        LayerId(0),
        pos2(100.0, 100.0),
        pos2(300.0, 100.0),
        ShapeStyle::default(),
    );

    assert!(curve.contains_point(pos2(200.0, 108.0), 1.0, &fonts));
    assert!(!curve.contains_point(pos2(200.0, 112.0), 1.0, &fonts));

    assert!(!curve.contains_point(pos2(200.0, 108.0), 2.0, &fonts));
    assert!(curve.contains_point(pos2(200.0, 104.0), 2.0, &fonts));
}

fn text_shape(align: TextAlign) -> Shape {
    let content = TextContent {
        text: "Front door\nand porch".to_string(),
        font: FontStyle {
            text_align: align,
            ..FontStyle::default()
        },
    };
    Shape::text(ShapeId(1), LayerId(0), pos2(200.0, 50.0), content, ShapeStyle::default())
}

#[test]
fn test_text_bounds_follow_alignment() {
    let fonts = FontBook::new();

    let centered = text_shape(TextAlign::Center);
    let content = centered.text_content().expect("text shape");
    let size = fonts.block_size(&content.text, &content.font);
    let bounds = centered.bounds(&fonts);
    assert!((bounds.center().x - 200.0).abs() < 0.001);
    assert!((bounds.min.y - 50.0).abs() < 0.001);
    assert!((bounds.width() - size.x).abs() < 0.001);
    assert!((bounds.height() - 2.0 * content.font.line_height()).abs() < 0.001);

    let right = text_shape(TextAlign::Right).bounds(&fonts);
    assert!((right.max.x - 200.0).abs() < 0.001);
    assert!((right.min.x - (200.0 - size.x)).abs() < 0.001);
}

fn open_text_editor(editor: &mut sketch_studio::Editor, at: egui::Pos2, align: TextAlign) -> ShapeId {
    editor.settings.font.text_align = align;
    editor.select_tool(ToolKind::Text);
    click(editor, at);
    editor.selection().expect("text shape selected")
}

#[test]
fn test_text_overlay_matches_shape_alignment_and_color() {
    let mut editor = create_test_editor();
    editor.settings.brush_color = Color32::from_rgb(200, 30, 30);
    let id = open_text_editor(&mut editor, pos2(200.0, 80.0), TextAlign::Center);
    editor.settings.brush_color = Color32::BLUE;

    let overlay = editor.text_edit_overlay().expect("editor open");
    assert_eq!(overlay.shape, id);
    assert_eq!(overlay.color, Color32::from_rgb(200, 30, 30));
    assert_eq!(overlay.font.text_align, TextAlign::Center);
    assert!((overlay.rect.center().x - 200.0).abs() < 0.001);
    assert!((overlay.rect.min.y - 80.0).abs() < 0.001);

    let shape = editor.doc.shape(id).expect("text shape");
    let content = shape.text_content().expect("text content");
    let size = editor.fonts().block_size(&content.text, &content.font);
    assert!((overlay.rect.width() - size.x).abs() < 0.001);
    assert!((overlay.rect.height() - size.y).abs() < 0.001);
}

#[test]
fn test_text_overlay_grows_with_the_buffer_and_follows_zoom() {
    let mut editor = create_test_editor();
    open_text_editor(&mut editor, pos2(300.0, 40.0), TextAlign::Right);
    let single = editor.text_edit_overlay().expect("editor open");
    assert!((single.rect.max.x - 300.0).abs() < 0.001);

    if let Some(buffer) = editor.text_edit_buffer_mut() {
        *buffer = "Roof\nWalls\nGarden path".to_string();
    }
    let multi = editor.text_edit_overlay().expect("editor open");
    assert!((multi.rect.max.x - 300.0).abs() < 0.001);
    assert!(multi.rect.height() > single.rect.height() * 2.5);

    editor.view.scale = 2.0;
    editor.view.offset = vec2(-100.0, 0.0);
    let zoomed = editor.text_edit_overlay().expect("editor open");
    assert_eq!(zoomed.scale, 2.0);
    assert!((zoomed.rect.max.x - 500.0).abs() < 0.001);
    assert!((zoomed.rect.width() - 2.0 * multi.rect.width()).abs() < 0.01);
}
