use egui::{Context, Key, Modifiers, PointerButton, Pos2, Rect, Vec2};

/// Where an input event occurred
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputLocation {
    /// Position relative to the top-left of the canvas viewport
    pub position: Pos2,
    /// Whether this position is within the canvas viewport
    pub is_in_canvas: bool,
}

/// Input events in canvas terms, independent of the windowing backend
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Mouse button was pressed
    PointerDown {
        location: InputLocation,
        button: PointerButton,
        modifiers: Modifiers,
    },
    /// Mouse button was released
    PointerUp {
        location: InputLocation,
        button: PointerButton,
        modifiers: Modifiers,
    },
    /// Mouse moved (with or without buttons pressed)
    PointerMove {
        location: InputLocation,
        modifiers: Modifiers,
    },
    DoubleClick {
        location: InputLocation,
    },
    /// Wheel scroll over the canvas; positive `delta` scrolls up
    Scroll {
        location: InputLocation,
        delta: f32,
    },
    /// Mouse left the canvas
    PointerLeave {
        last_known_location: InputLocation,
    },
    KeyDown {
        key: Key,
        modifiers: Modifiers,
    },
    KeyUp {
        key: Key,
        modifiers: Modifiers,
    },
}

impl InputEvent {
    /// Helper to check if an input event occurred within the canvas
    pub fn is_in_canvas(&self) -> bool {
        match self {
            InputEvent::PointerDown { location, .. }
            | InputEvent::PointerUp { location, .. }
            | InputEvent::PointerMove { location, .. }
            | InputEvent::DoubleClick { location }
            | InputEvent::Scroll { location, .. } => location.is_in_canvas,
            InputEvent::PointerLeave { .. } => false,
            InputEvent::KeyDown { .. } | InputEvent::KeyUp { .. } => true,
        }
    }
}

/// Converts raw egui input into [`InputEvent`]s relative to the canvas
#[derive(Debug, Default)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    canvas_rect: Option<Rect>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the canvas viewport rectangle (screen space)
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = Some(rect);
    }

    fn make_location(&self, pos: Pos2) -> InputLocation {
        match self.canvas_rect {
            Some(rect) => InputLocation {
                position: (pos - rect.min.to_vec2()),
                is_in_canvas: rect.contains(pos),
            },
            None => InputLocation {
                position: pos,
                is_in_canvas: false,
            },
        }
    }

    /// Process raw egui input and generate canvas events.
    ///
    /// `keyboard` is false while a text field has focus so typing never
    /// triggers canvas shortcuts.
    pub fn process_input(&mut self, ctx: &Context, keyboard: bool) -> Vec<InputEvent> {
        let mut events = Vec::new();

        ctx.input(|input| {
            let modifiers = input.modifiers;

            if let Some(pos) = input.pointer.hover_pos() {
                if Some(pos) != self.last_pointer_pos {
                    events.push(InputEvent::PointerMove {
                        location: self.make_location(pos),
                        modifiers,
                    });
                }
                self.last_pointer_pos = Some(pos);
            } else if let Some(last) = self.last_pointer_pos.take() {
                events.push(InputEvent::PointerLeave {
                    last_known_location: self.make_location(last),
                });
            }

            for button in [PointerButton::Primary, PointerButton::Secondary, PointerButton::Middle] {
                let Some(pos) = input.pointer.interact_pos() else {
                    continue;
                };
                if input.pointer.button_pressed(button) {
                    events.push(InputEvent::PointerDown {
                        location: self.make_location(pos),
                        button,
                        modifiers,
                    });
                }
                if input.pointer.button_released(button) {
                    events.push(InputEvent::PointerUp {
                        location: self.make_location(pos),
                        button,
                        modifiers,
                    });
                }
            }

            if input.pointer.button_double_clicked(PointerButton::Primary) {
                if let Some(pos) = input.pointer.interact_pos() {
                    events.push(InputEvent::DoubleClick {
                        location: self.make_location(pos),
                    });
                }
            }

            let scroll: Vec2 = input.raw_scroll_delta;
            if scroll.y != 0.0 {
                if let Some(pos) = input.pointer.hover_pos() {
                    events.push(InputEvent::Scroll {
                        location: self.make_location(pos),
                        delta: scroll.y,
                    });
                }
            }

            if keyboard {
                for event in &input.events {
                    if let egui::Event::Key {
                        key,
                        pressed,
                        repeat: false,
                        modifiers,
                        ..
                    } = event
                    {
                        events.push(if *pressed {
                            InputEvent::KeyDown {
                                key: *key,
                                modifiers: *modifiers,
                            }
                        } else {
                            InputEvent::KeyUp {
                                key: *key,
                                modifiers: *modifiers,
                            }
                        });
                    }
                }
            }
        });

        events
    }
}
