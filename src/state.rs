//! Pointer gesture state machine for the canvas.
//!
//! ```text
//!            ┌──────────────┐
//!      ┌────►   Panning    ├────┐
//!      │     └──────────────┘    │
//!      │     ┌──────────────┐    │
//!      ├────► DraggingVp   ├────┤
//!      │     └──────────────┘    │
//! ┌────┴─┐   ┌──────────────┐    │   ┌──────┐
//! │ Idle ├───► DraggingShape├────┼───► Idle │
//! └────┬─┘   │ DraggingHandle    │   └──────┘
//!      │     └──────────────┘    │
//!      │     ┌──────────────┐    │
//!      └────► Freehand/Line├────┘
//!            │ Shape        │
//!            └──────────────┘
//! ```
//!
//! Every gesture starts on pointer-down and ends on pointer-up; edits are
//! only recorded in history when a gesture ends.

use egui::Pos2;

use crate::shape::{Handle, Shape, ShapeId};
use crate::tool::ToolKind;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    /// View drag; `last` is the previous screen position
    Panning { last: Pos2 },
    /// Vanishing point drag along the horizon
    DraggingVp { index: usize, moved: bool },
    /// One handle of the selected shape follows the cursor
    DraggingHandle {
        shape: ShapeId,
        handle: Handle,
        original: Shape,
    },
    /// Whole-shape translation measured from `start` against `original`
    DraggingShape {
        shape: ShapeId,
        start: Pos2,
        original: Shape,
    },
    /// Midpoint-smoothed stroke into the active layer
    Freehand {
        last: Pos2,
        last_mid: Pos2,
        erase: bool,
    },
    /// Straight segment, painted on release
    Line { start: Pos2, current: Pos2 },
    /// Rectangle, circle or curve drag, turned into a shape on release
    Shape {
        tool: ToolKind,
        start: Pos2,
        current: Pos2,
    },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    pub fn is_panning(&self) -> bool {
        matches!(self, Gesture::Panning { .. })
    }

    pub fn is_drawing_shape(&self) -> bool {
        matches!(self, Gesture::Shape { .. })
    }

    /// Short name used in logs and the status bar
    pub fn label(&self) -> &'static str {
        match self {
            Gesture::Idle => "Idle",
            Gesture::Panning { .. } => "Panning",
            Gesture::DraggingVp { .. } => "Moving vanishing point",
            Gesture::DraggingHandle { .. } => "Reshaping",
            Gesture::DraggingShape { .. } => "Moving shape",
            Gesture::Freehand { erase: false, .. } => "Sketching",
            Gesture::Freehand { erase: true, .. } => "Erasing",
            Gesture::Line { .. } => "Drawing line",
            Gesture::Shape { .. } => "Drawing shape",
        }
    }
}
