mod common;

use common::{create_test_editor, draw_shape};
use egui::{Color32, pos2};
use image::RgbaImage;
use sketch_studio::perspective::SetupType;
use sketch_studio::raster::Surface;
use sketch_studio::{LayerStore, ToolKind};

#[test]
fn test_new_layer_goes_on_top_and_becomes_active() {
    let mut editor = create_test_editor();
    let first = editor.doc.layers.active_id().expect("default layer");
    let second = editor.add_layer();

    assert_eq!(editor.doc.layers.ids(), vec![second, first]);
    assert_eq!(editor.doc.layers.active_id(), Some(second));
    assert_eq!(editor.doc.layers.get(second).map(|layer| layer.name.as_str()), Some("Layer 2"));
}

#[test]
fn test_deleting_the_only_layer_is_a_noop() {
    let mut editor = create_test_editor();
    let history = editor.history().len();
    assert!(!editor.delete_active_layer());
    assert_eq!(editor.doc.layers.len(), 1);
    assert_eq!(editor.history().len(), history);
}

#[test]
fn test_deleting_a_layer_removes_its_shapes() {
    let mut editor = create_test_editor();
    let first = editor.doc.layers.active_id().expect("default layer");
    draw_shape(&mut editor, ToolKind::Rectangle, pos2(10.0, 10.0), pos2(60.0, 60.0));
    editor.add_layer();
    draw_shape(&mut editor, ToolKind::Circle, pos2(100.0, 100.0), pos2(160.0, 160.0));
    assert_eq!(editor.doc.shapes().len(), 2);

    assert!(editor.delete_active_layer());
    assert_eq!(editor.doc.layers.ids(), vec![first]);
    assert_eq!(editor.doc.shapes().len(), 1);
    assert_eq!(editor.doc.shapes()[0].layer_id, first);
    assert_eq!(editor.selection(), None);
}

#[test]
fn test_move_layer_and_undo() {
    let mut editor = create_test_editor();
    let first = editor.doc.layers.active_id().expect("default layer");
    let second = editor.add_layer();
    let third = editor.add_layer();
    assert_eq!(editor.doc.layers.ids(), vec![third, second, first]);

    assert!(editor.move_layer(0, 2));
    assert_eq!(editor.doc.layers.ids(), vec![second, first, third]);
    assert!(!editor.move_layer(1, 1));

    editor.undo();
    assert_eq!(editor.doc.layers.ids(), vec![third, second, first]);
}

#[test]
fn test_selecting_a_layer_is_not_an_edit() {
    let mut editor = create_test_editor();
    let first = editor.doc.layers.active_id().expect("default layer");
    editor.add_layer();
    let history = editor.history().len();

    assert!(editor.select_layer(first));
    assert!(!editor.select_layer(first));
    assert_eq!(editor.doc.layers.active_id(), Some(first));
    assert_eq!(editor.history().len(), history);
}

#[test]
fn test_hidden_layer_is_left_out_of_the_composite() {
    let mut editor = create_test_editor();
    editor.select_tool(ToolKind::Sketch);
    common::drag(&mut editor, pos2(10.0, 10.0), pos2(200.0, 10.0));
    let id = editor.doc.layers.active_id().expect("default layer");
    let drawn = editor.compose();
    assert!(!drawn.is_blank());

    assert!(editor.set_layer_visibility(id, false));
    assert!(editor.compose().is_blank());

    editor.undo();
    assert!(editor.doc.layers.is_visible(id));
}

#[test]
fn test_shapes_are_only_picked_on_the_active_layer() {
    let mut editor = create_test_editor();
    draw_shape(&mut editor, ToolKind::Rectangle, pos2(10.0, 10.0), pos2(100.0, 100.0));
    editor.add_layer();
    editor.select_tool(ToolKind::Select);

    common::press(&mut editor, pos2(50.0, 50.0));
    common::release(&mut editor, pos2(50.0, 50.0));
    assert_eq!(editor.selection(), None);
}

#[test]
fn test_new_layer_names_stay_unique_after_deletes() {
    let mut editor = create_test_editor();
    let second = editor.add_layer();
    editor.add_layer();

    // Removing a middle layer leaves "Layer 3" with only two layers around
    assert!(editor.select_layer(second));
    assert!(editor.delete_active_layer());
    let added = editor.add_layer();
    assert_eq!(editor.doc.layers.get(added).map(|layer| layer.name.as_str()), Some("Layer 4"));

    let mut names: Vec<&str> = editor.doc.layers.iter().map(|layer| layer.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, ["Layer 1", "Layer 3", "Layer 4"]);
}

#[test]
fn test_clear_sketch_only_touches_the_active_layer() {
    let mut editor = create_test_editor();
    let first = editor.doc.layers.active_id().expect("default layer");
    draw_shape(&mut editor, ToolKind::Rectangle, pos2(10.0, 10.0), pos2(60.0, 60.0));
    editor.select_tool(ToolKind::Sketch);
    common::drag(&mut editor, pos2(10.0, 200.0), pos2(200.0, 210.0));

    let second = editor.add_layer();
    draw_shape(&mut editor, ToolKind::Circle, pos2(100.0, 100.0), pos2(160.0, 160.0));
    editor.select_tool(ToolKind::Sketch);
    common::drag(&mut editor, pos2(10.0, 250.0), pos2(200.0, 260.0));
    let history = editor.history().len();

    assert!(editor.clear_sketch());
    assert_eq!(editor.history().len(), history + 1);
    assert_eq!(editor.selection(), None);

    let cleared = editor.doc.layers.get(second).expect("layer kept");
    assert!(cleared.surface.is_blank());
    assert_eq!(editor.doc.shapes_on_layer(second).count(), 0);

    let kept = editor.doc.layers.get(first).expect("layer kept");
    assert!(!kept.surface.is_blank());
    assert_eq!(editor.doc.shapes_on_layer(first).count(), 1);
}

#[test]
fn test_clear_all_starts_over_but_keeps_patterns() {
    let mut editor = create_test_editor();
    let pattern = editor.upload_pattern(RgbaImage::new(4, 4));
    editor.add_layer();
    draw_shape(&mut editor, ToolKind::Rectangle, pos2(10.0, 10.0), pos2(60.0, 60.0));
    editor.perspective.start_setup(SetupType::OnePoint);
    editor.perspective.handle_setup_click(pos2(0.0, 100.0));
    editor.perspective.handle_setup_click(pos2(200.0, 100.0));

    editor.clear_all();

    let names: Vec<&str> = editor.doc.layers.iter().map(|layer| layer.name.as_str()).collect();
    assert_eq!(names, ["Layer 1"]);
    assert!(editor.doc.shapes().is_empty());
    assert_eq!(editor.selection(), None);
    assert!(!editor.can_undo());
    assert!(!editor.perspective.is_configured());
    assert!(editor.doc.patterns().contains_key(&pattern));
}

#[test]
fn test_layer_store_resize_keeps_pixels_in_place() {
    let mut layers = LayerStore::new(4, 4);
    let id = layers.add_layer("Layer 1");
    if let Some(layer) = layers.get_mut(id) {
        layer.surface = Surface::filled(4, 4, Color32::RED);
    }

    layers.resize(8, 6);
    let surface = &layers.get(id).expect("layer kept").surface;
    assert_eq!((surface.width(), surface.height()), (8, 6));
    assert_eq!(surface.pixel(1, 1), Some([255, 0, 0, 255]));
    assert_eq!(surface.pixel(6, 5), Some([0, 0, 0, 0]));
    assert_eq!((layers.width(), layers.height()), (8, 6));
}
