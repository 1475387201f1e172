use serde::{Deserialize, Serialize};
use std::fmt;

use crate::id_generator::IdGenerator;
use crate::raster::Surface;

/// A unique identifier for a layer, never reused within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub u32);

impl LayerId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Layer#{}", self.0)
    }
}

/// Represents a single raster layer in the document
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    pub surface: Surface,
}

/// Ordered stack of layers. Index 0 is the front (topmost) layer.
#[derive(Debug, Clone)]
pub struct LayerStore {
    layers: Vec<Layer>,
    active: Option<LayerId>,
    ids: IdGenerator,
    width: u32,
    height: u32,
}

impl LayerStore {
    /// An empty store for a document of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            layers: Vec::new(),
            active: None,
            ids: IdGenerator::new(),
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Allocates a transparent layer sized to the document without inserting it.
    /// An explicit id is honoured and reserved so it is never generated later.
    pub fn create_layer(&mut self, name: &str, id: Option<LayerId>) -> Layer {
        let id = match id {
            Some(id) => {
                self.ids.reserve_past(id.0);
                id
            }
            None => LayerId(self.ids.generate()),
        };
        Layer {
            id,
            name: name.to_string(),
            visible: true,
            surface: Surface::new(self.width, self.height),
        }
    }

    /// Creates a layer at the front of the stack and makes it active
    pub fn add_layer(&mut self, name: &str) -> LayerId {
        let layer = self.create_layer(name, None);
        let id = layer.id;
        self.layers.insert(0, layer);
        self.active = Some(id);
        log::info!("Added {id} '{name}'");
        id
    }

    /// Appends an already created layer at the back of the stack
    pub fn push_back(&mut self, layer: Layer) {
        self.ids.reserve_past(layer.id.0);
        self.layers.push(layer);
    }

    /// Removes the active layer unless it is the last one.
    ///
    /// The layer now at the same stack position (or the last layer) becomes
    /// active. Returns the removed layer's id.
    pub fn delete_active_layer(&mut self) -> Option<LayerId> {
        if self.layers.len() <= 1 {
            return None;
        }
        let index = self.index_of(self.active?)?;
        let removed = self.layers.remove(index);
        let next = self.layers.get(index).or_else(|| self.layers.last());
        self.active = next.map(|layer| layer.id);
        log::info!("Deleted {} '{}'", removed.id, removed.name);
        Some(removed.id)
    }

    /// Makes `id` the active layer; unknown ids are ignored
    pub fn select(&mut self, id: LayerId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.active = Some(id);
        true
    }

    pub fn active_id(&self) -> Option<LayerId> {
        self.active
    }

    pub fn active(&self) -> Option<&Layer> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn active_mut(&mut self) -> Option<&mut Layer> {
        let id = self.active?;
        self.get_mut(id)
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|layer| layer.id == id)
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id == id)
    }

    /// Layers front to back
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut Layer> {
        self.layers.iter_mut()
    }

    pub fn ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(|layer| layer.id).collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn is_visible(&self, id: LayerId) -> bool {
        self.get(id).is_some_and(|layer| layer.visible)
    }

    pub fn set_visibility(&mut self, id: LayerId, visible: bool) -> bool {
        match self.get_mut(id) {
            Some(layer) if layer.visible != visible => {
                layer.visible = visible;
                true
            }
            _ => false,
        }
    }

    /// Renames a layer; a blank name becomes "Untitled"
    pub fn rename(&mut self, id: LayerId, name: &str) -> bool {
        let name = match name.trim() {
            "" => "Untitled",
            trimmed => trimmed,
        };
        match self.get_mut(id) {
            Some(layer) if layer.name != name => {
                layer.name = name.to_string();
                true
            }
            _ => false,
        }
    }

    /// Replaces the stack order; `order` must name exactly the current layers
    pub fn reorder(&mut self, order: &[LayerId]) -> bool {
        let mut current = self.ids();
        let mut requested = order.to_vec();
        current.sort();
        requested.sort();
        if current != requested || order == self.ids().as_slice() {
            return false;
        }

        let mut remaining = std::mem::take(&mut self.layers);
        for id in order {
            if let Some(pos) = remaining.iter().position(|layer| layer.id == *id) {
                self.layers.push(remaining.swap_remove(pos));
            }
        }
        true
    }

    /// Moves the layer at `from` so it ends up at index `to`
    pub fn move_layer(&mut self, from: usize, to: usize) -> bool {
        if from >= self.layers.len() || to >= self.layers.len() || from == to {
            return false;
        }
        let mut order = self.ids();
        let id = order.remove(from);
        order.insert(to, id);
        self.reorder(&order)
    }

    /// Changes the document size, keeping every layer's pixels in place
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        for layer in &mut self.layers {
            layer.surface.resize(width, height);
        }
    }

    /// Drops every layer and starts over with a single fresh one
    pub fn reset(&mut self, name: &str) -> LayerId {
        self.layers.clear();
        self.active = None;
        self.add_layer(name)
    }

    /// Removes a layer by id regardless of activity; used when restoring snapshots
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&Layer) -> bool) {
        self.layers.retain(|layer| keep(layer));
        if self.active.is_some_and(|id| self.get(id).is_none()) {
            self.active = self.layers.first().map(|layer| layer.id);
        }
    }

    /// Sorts layers by their position in `order`; unknown layers go last
    pub(crate) fn sort_by_order(&mut self, order: &[LayerId]) {
        self.layers
            .sort_by_key(|layer| order.iter().position(|id| *id == layer.id).unwrap_or(usize::MAX));
    }

    /// Sets the active layer without validation (snapshot restore may name none)
    pub(crate) fn set_active_unchecked(&mut self, id: Option<LayerId>) {
        self.active = id.filter(|id| self.get(*id).is_some());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_layer_goes_to_front_and_activates() {
        let mut store = LayerStore::new(10, 10);
        let first = store.add_layer("Layer 1");
        let second = store.add_layer("Layer 2");

        assert_eq!(store.ids(), vec![second, first]);
        assert_eq!(store.active_id(), Some(second));
    }

    #[test]
    fn test_delete_selects_same_position_or_last() {
        let mut store = LayerStore::new(10, 10);
        let a = store.add_layer("a");
        let b = store.add_layer("b");
        let c = store.add_layer("c");
        // order: c, b, a
        store.select(b);
        assert_eq!(store.delete_active_layer(), Some(b));
        assert_eq!(store.active_id(), Some(a));

        store.select(a);
        assert_eq!(store.delete_active_layer(), Some(a));
        assert_eq!(store.active_id(), Some(c));

        assert_eq!(store.delete_active_layer(), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_ids_not_reused() {
        let mut store = LayerStore::new(10, 10);
        store.add_layer("a");
        let b = store.add_layer("b");
        store.select(b);
        store.delete_active_layer();
        let c = store.add_layer("c");
        assert!(c.0 > b.0);
    }

    #[test]
    fn test_reorder_requires_same_membership() {
        let mut store = LayerStore::new(10, 10);
        let a = store.add_layer("a");
        let b = store.add_layer("b");
        assert!(!store.reorder(&[a]));
        assert!(!store.reorder(&[a, LayerId(99)]));
        assert!(store.reorder(&[a, b]));
        assert_eq!(store.ids(), vec![a, b]);
    }

    #[test]
    fn test_rename_blank_becomes_untitled() {
        let mut store = LayerStore::new(10, 10);
        let a = store.add_layer("a");
        assert!(store.rename(a, "   "));
        assert_eq!(store.get(a).map(|l| l.name.as_str()), Some("Untitled"));
    }
}
