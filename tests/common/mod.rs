#![allow(dead_code)]

use egui::{Modifiers, PointerButton, Pos2};
use sketch_studio::{Editor, InputEvent, InputLocation, ToolKind};

/// Editor with snapping off so pointer positions land exactly
pub fn create_test_editor() -> Editor {
    let mut editor = Editor::new(400, 300);
    editor.snap.to_grid = false;
    editor.snap.to_objects = false;
    editor
}

fn location(position: Pos2) -> InputLocation {
    InputLocation {
        position,
        is_in_canvas: true,
    }
}

pub fn press(editor: &mut Editor, position: Pos2) {
    press_with(editor, position, Modifiers::NONE);
}

pub fn move_to(editor: &mut Editor, position: Pos2) {
    move_with(editor, position, Modifiers::NONE);
}

pub fn release(editor: &mut Editor, position: Pos2) {
    release_with(editor, position, Modifiers::NONE);
}

pub fn press_with(editor: &mut Editor, position: Pos2, modifiers: Modifiers) {
    editor.handle_event(&InputEvent::PointerDown {
        location: location(position),
        button: PointerButton::Primary,
        modifiers,
    });
}

pub fn move_with(editor: &mut Editor, position: Pos2, modifiers: Modifiers) {
    editor.handle_event(&InputEvent::PointerMove {
        location: location(position),
        modifiers,
    });
}

pub fn release_with(editor: &mut Editor, position: Pos2, modifiers: Modifiers) {
    editor.handle_event(&InputEvent::PointerUp {
        location: location(position),
        button: PointerButton::Primary,
        modifiers,
    });
}

pub fn drag(editor: &mut Editor, from: Pos2, to: Pos2) {
    drag_with_modifiers(editor, from, to, Modifiers::NONE);
}

/// Press, move and release with the same modifiers held throughout
pub fn drag_with_modifiers(editor: &mut Editor, from: Pos2, to: Pos2, modifiers: Modifiers) {
    press_with(editor, from, modifiers);
    move_with(editor, to, modifiers);
    release_with(editor, to, modifiers);
}

/// A press and release at the same spot
pub fn click(editor: &mut Editor, position: Pos2) {
    press(editor, position);
    release(editor, position);
}

/// Drags out a shape with `tool` and returns the editor to that tool
pub fn draw_shape(editor: &mut Editor, tool: ToolKind, from: Pos2, to: Pos2) {
    editor.select_tool(tool);
    drag(editor, from, to);
}

pub fn approx_eq(a: Pos2, b: Pos2) -> bool {
    (a.x - b.x).abs() < 0.001 && (a.y - b.y).abs() < 0.001
}
