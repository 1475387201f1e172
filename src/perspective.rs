//! Horizon and vanishing point guides, configured through a click-by-click setup.

use egui::{Pos2, Rect, pos2};
use serde::{Deserialize, Serialize};

/// Screen-pixel radius for grabbing a vanishing point
pub const VANISHING_POINT_GRAB_RADIUS: f32 = 15.0;

pub const DEFAULT_LINE_COUNT: usize = 8;
pub const DEFAULT_SPREAD: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PerspectiveMode {
    #[default]
    None,
    OnePoint,
    TwoPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SetupType {
    #[default]
    OnePoint,
    TwoPoint,
}

impl SetupType {
    fn completed_mode(&self) -> PerspectiveMode {
        match self {
            SetupType::OnePoint => PerspectiveMode::OnePoint,
            SetupType::TwoPoint => PerspectiveMode::TwoPoint,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetupStep {
    #[default]
    SetHorizon,
    SetVp1,
    SetVp2,
}

/// Transient wizard state; never part of undo history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetupState {
    pub active: bool,
    pub kind: SetupType,
    pub step: SetupStep,
}

/// Line segments and markers to draw for the current guides, in world space
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuideGeometry {
    pub horizon: Option<[Pos2; 2]>,
    pub rays: Vec<[Pos2; 2]>,
    pub markers: Vec<Pos2>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Perspective {
    mode: PerspectiveMode,
    horizon_y: Option<f32>,
    vanishing_points: Vec<Pos2>,
    setup: SetupState,
    pub show_guides: bool,
    pub line_count: usize,
    pub spread: f32,
}

impl Default for Perspective {
    fn default() -> Self {
        Self {
            mode: PerspectiveMode::None,
            horizon_y: None,
            vanishing_points: Vec::new(),
            setup: SetupState::default(),
            show_guides: true,
            line_count: DEFAULT_LINE_COUNT,
            spread: DEFAULT_SPREAD,
        }
    }
}

impl Perspective {
    pub fn mode(&self) -> PerspectiveMode {
        self.mode
    }

    pub fn horizon_y(&self) -> Option<f32> {
        self.horizon_y
    }

    pub fn vanishing_points(&self) -> &[Pos2] {
        &self.vanishing_points
    }

    pub fn setup(&self) -> SetupState {
        self.setup
    }

    pub fn is_configured(&self) -> bool {
        self.mode != PerspectiveMode::None
    }

    pub fn is_setup_active(&self) -> bool {
        self.setup.active
    }

    /// Drops all guides and leaves setup
    pub fn clear(&mut self) {
        self.mode = PerspectiveMode::None;
        self.horizon_y = None;
        self.vanishing_points.clear();
        self.setup.active = false;
    }

    /// Starts a fresh setup at the horizon step
    pub fn start_setup(&mut self, kind: SetupType) {
        self.clear();
        self.setup = SetupState {
            active: true,
            kind,
            step: SetupStep::SetHorizon,
        };
        log::info!("Perspective setup started ({kind:?})");
    }

    /// Leaves setup, keeping whatever was already placed
    pub fn cancel_setup(&mut self) -> bool {
        std::mem::replace(&mut self.setup.active, false)
    }

    /// Advances the setup by exactly one step. Returns false when inactive.
    pub fn handle_setup_click(&mut self, pos: Pos2) -> bool {
        if !self.setup.active {
            return false;
        }

        match self.setup.step {
            SetupStep::SetHorizon => {
                self.horizon_y = Some(pos.y);
                self.setup.step = SetupStep::SetVp1;
            }
            SetupStep::SetVp1 => {
                let Some(horizon) = self.horizon_y else {
                    return false;
                };
                self.vanishing_points.push(pos2(pos.x, horizon));
                match self.setup.kind {
                    SetupType::OnePoint => self.complete_setup(),
                    SetupType::TwoPoint => self.setup.step = SetupStep::SetVp2,
                }
            }
            SetupStep::SetVp2 => {
                let Some(horizon) = self.horizon_y else {
                    return false;
                };
                self.vanishing_points.push(pos2(pos.x, horizon));
                self.complete_setup();
            }
        }
        true
    }

    fn complete_setup(&mut self) {
        self.mode = self.setup.kind.completed_mode();
        self.setup.active = false;
        log::info!("Perspective set to {:?} with {} vanishing point(s)", self.mode, self.vanishing_points.len());
    }

    /// Instruction for the current setup step
    pub fn setup_message(&self) -> Option<&'static str> {
        if !self.setup.active {
            return None;
        }
        Some(match (self.setup.step, self.setup.kind) {
            (SetupStep::SetHorizon, _) => "Click to set the horizon line.",
            (SetupStep::SetVp1, SetupType::OnePoint) => "Click on the horizon to set the vanishing point.",
            (SetupStep::SetVp1, SetupType::TwoPoint) => "Click on the horizon to set the first vanishing point.",
            (SetupStep::SetVp2, _) => "Click on the horizon to set the second vanishing point.",
        })
    }

    /// Index of a draggable vanishing point near `pos`; none during setup
    pub fn vanishing_point_at(&self, pos: Pos2, scale: f32) -> Option<usize> {
        if !self.is_configured() || self.setup.active {
            return None;
        }
        let radius = VANISHING_POINT_GRAB_RADIUS / scale;
        self.vanishing_points
            .iter()
            .position(|vp| vp.distance(pos) < radius)
    }

    /// Moves a vanishing point along the horizon, clamped to `[min_x, max_x]`
    pub fn drag_vanishing_point(&mut self, index: usize, x: f32, min_x: f32, max_x: f32) -> bool {
        let Some(horizon) = self.horizon_y else {
            return false;
        };
        let Some(vp) = self.vanishing_points.get_mut(index) else {
            return false;
        };
        *vp = pos2(x.max(min_x).min(max_x), horizon);
        true
    }

    /// Guide lines for the visible world rectangle `view`
    pub fn guide_geometry(&self, view: Rect) -> GuideGeometry {
        if !self.show_guides || (!self.is_configured() && !self.setup.active) {
            return GuideGeometry::default();
        }

        let horizon = self
            .horizon_y
            .map(|y| [pos2(view.min.x, y), pos2(view.max.x, y)]);

        let line_count = self.line_count.max(2);
        let spread_width = view.width() * self.spread;
        let start_x = view.center().x - spread_width / 2.0;

        let mut rays = Vec::with_capacity(self.vanishing_points.len() * (line_count + 1) * 2);
        for vp in &self.vanishing_points {
            for i in 0..=line_count {
                let x = start_x + (i as f32 / line_count as f32) * spread_width;
                rays.push([*vp, pos2(x, view.min.y)]);
                rays.push([*vp, pos2(x, view.max.y)]);
            }
        }

        GuideGeometry {
            horizon,
            rays,
            markers: self.vanishing_points.clone(),
        }
    }
}
