use std::collections::BTreeMap;
use std::sync::Arc;

use egui::Pos2;
use image::RgbaImage;

use crate::history::{HistoryState, LayerSnapshot};
use crate::id_generator::IdGenerator;
use crate::layer::{LayerId, LayerStore};
use crate::shape::{Shape, ShapeId};
use crate::text::FontBook;

pub const DEFAULT_LAYER_NAME: &str = "Layer 1";

/// Named repeating fill images
pub type PatternLibrary = BTreeMap<String, Arc<RgbaImage>>;

/// Everything that makes up the drawing: layers, live shapes, background
/// image and uploaded fill patterns.
#[derive(Debug, Clone)]
pub struct Document {
    pub layers: LayerStore,
    shapes: Vec<Shape>,
    shape_ids: IdGenerator,
    background: Option<Arc<RgbaImage>>,
    patterns: PatternLibrary,
}

impl Document {
    /// A document with a single empty layer
    pub fn new(width: u32, height: u32) -> Self {
        let mut layers = LayerStore::new(width, height);
        layers.add_layer(DEFAULT_LAYER_NAME);
        Self {
            layers,
            shapes: Vec::new(),
            shape_ids: IdGenerator::new(),
            background: None,
            patterns: PatternLibrary::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.layers.width()
    }

    pub fn height(&self) -> u32 {
        self.layers.height()
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|shape| shape.id == id)
    }

    pub fn shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|shape| shape.id == id)
    }

    /// Reserves a fresh shape id
    pub fn next_shape_id(&mut self) -> ShapeId {
        ShapeId(self.shape_ids.generate())
    }

    /// Appends a shape on top of the paint order. Shapes pointing at a
    /// missing layer are rejected.
    pub fn add_shape(&mut self, shape: Shape) -> bool {
        if self.layers.get(shape.layer_id).is_none() {
            log::warn!("Refusing {} on missing {}", shape.id, shape.layer_id);
            return false;
        }
        self.shape_ids.reserve_past(shape.id.0);
        self.shapes.push(shape);
        true
    }

    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.shapes.iter().position(|shape| shape.id == id)?;
        Some(self.shapes.remove(index))
    }

    pub fn shapes_on_layer(&self, layer: LayerId) -> impl Iterator<Item = &Shape> {
        self.shapes.iter().filter(move |shape| shape.layer_id == layer)
    }

    /// Topmost shape on `layer` under `point`, searching in reverse paint order.
    /// Hidden layers never yield a hit.
    pub fn topmost_shape_at(&self, point: Pos2, layer: LayerId, scale: f32, fonts: &FontBook) -> Option<ShapeId> {
        if !self.layers.is_visible(layer) {
            return None;
        }
        self.shapes
            .iter()
            .rev()
            .find(|shape| shape.layer_id == layer && shape.contains_point(point, scale, fonts))
            .map(|shape| shape.id)
    }

    /// Deletes the active layer and every shape on it; no-op on the last layer
    pub fn delete_active_layer(&mut self) -> Option<LayerId> {
        let removed = self.layers.delete_active_layer()?;
        self.shapes.retain(|shape| shape.layer_id != removed);
        Some(removed)
    }

    /// Clears a layer's pixels and removes its shapes
    pub fn clear_layer(&mut self, id: LayerId) -> bool {
        let Some(layer) = self.layers.get_mut(id) else {
            return false;
        };
        layer.surface.clear();
        self.shapes.retain(|shape| shape.layer_id != id);
        true
    }

    /// Rasterizes every shape into its owning layer and empties the shape list.
    /// Returns how many shapes were committed.
    pub fn commit_all_shapes(&mut self, fonts: &FontBook) -> usize {
        let shapes = std::mem::take(&mut self.shapes);
        let mut committed = 0;
        for shape in &shapes {
            let Some(layer) = self.layers.get_mut(shape.layer_id) else {
                continue;
            };
            crate::compositor::draw_shape(&mut layer.surface, shape, &self.patterns, fonts);
            committed += 1;
        }
        if committed > 0 {
            log::info!("Committed {committed} shape(s) to raster");
        }
        committed
    }

    pub fn background(&self) -> Option<&Arc<RgbaImage>> {
        self.background.as_ref()
    }

    pub fn set_background(&mut self, image: Option<RgbaImage>) {
        self.background = image.map(Arc::new);
    }

    pub fn patterns(&self) -> &PatternLibrary {
        &self.patterns
    }

    pub fn add_pattern(&mut self, name: &str, image: RgbaImage) {
        self.patterns.insert(name.to_string(), Arc::new(image));
    }

    pub fn replace_patterns(&mut self, patterns: PatternLibrary) {
        self.patterns = patterns;
    }

    /// Resizes every layer, keeping pixels where they are
    pub fn resize(&mut self, width: u32, height: u32) {
        self.layers.resize(width, height);
    }

    /// Back to one empty "Layer 1" with no shapes or background. Patterns stay.
    pub fn reset(&mut self) {
        self.layers.reset(DEFAULT_LAYER_NAME);
        self.shapes.clear();
        self.background = None;
    }

    /// Installs a fully validated set of layers and shapes in one step
    pub(crate) fn install(&mut self, layers: LayerStore, shapes: Vec<Shape>) {
        for shape in &shapes {
            self.shape_ids.reserve_past(shape.id.0);
        }
        self.layers = layers;
        self.shapes = shapes;
    }

    /// Captures layers, shapes and the active layer
    pub fn snapshot(&self) -> HistoryState {
        HistoryState {
            layers: self
                .layers
                .iter()
                .map(|layer| LayerSnapshot {
                    id: layer.id,
                    name: layer.name.clone(),
                    visible: layer.visible,
                    surface: layer.surface.clone(),
                })
                .collect(),
            shapes: self.shapes.clone(),
            active_layer: self.layers.active_id(),
        }
    }

    /// Makes the live document match `state`: layers missing from it are
    /// dropped, missing ones recreated, survivors overwritten and the stack
    /// re-sorted to the snapshot order. Shapes and active layer are replaced.
    /// Rasters taken before a canvas resize are fitted to the current size.
    pub fn restore(&mut self, state: &HistoryState) {
        let (width, height) = (self.width(), self.height());
        let wanted: Vec<LayerId> = state.layers.iter().map(|layer| layer.id).collect();
        self.layers.retain(|layer| wanted.contains(&layer.id));

        for saved in &state.layers {
            match self.layers.get_mut(saved.id) {
                Some(layer) => {
                    layer.name.clone_from(&saved.name);
                    layer.visible = saved.visible;
                    layer.surface = saved.surface.clone();
                    layer.surface.resize(width, height);
                }
                None => {
                    let mut layer = self.layers.create_layer(&saved.name, Some(saved.id));
                    layer.visible = saved.visible;
                    layer.surface = saved.surface.clone();
                    layer.surface.resize(width, height);
                    self.layers.push_back(layer);
                }
            }
        }

        self.layers.sort_by_order(&wanted);
        self.shapes = state.shapes.clone();
        self.layers.set_active_unchecked(state.active_layer);
    }
}
