use super::Editor;
use crate::layer::LayerId;

impl Editor {
    /// Adds "Layer N" at the top of the stack and makes it active. N starts
    /// at the layer count plus one and skips names already taken.
    pub fn add_layer(&mut self) -> LayerId {
        let mut number = self.doc.layers.len() + 1;
        let mut name = format!("Layer {number}");
        while self.doc.layers.iter().any(|layer| layer.name == name) {
            number += 1;
            name = format!("Layer {number}");
        }
        let id = self.doc.layers.add_layer(&name);
        self.record();
        id
    }

    /// Deletes the active layer with its shapes; no-op on the last layer
    pub fn delete_active_layer(&mut self) -> bool {
        if self.doc.delete_active_layer().is_none() {
            log::debug!("Refusing to delete the only layer");
            return false;
        }
        self.prune_selection();
        self.record();
        true
    }

    /// Makes `id` the active layer. Not an edit, so no snapshot.
    pub fn select_layer(&mut self, id: LayerId) -> bool {
        if self.doc.layers.active_id() == Some(id) {
            return false;
        }
        self.commit_text_edit();
        let selected = self.doc.layers.select(id);
        if selected {
            self.mark_changed();
        }
        selected
    }

    pub fn set_layer_visibility(&mut self, id: LayerId, visible: bool) -> bool {
        if !self.doc.layers.set_visibility(id, visible) {
            return false;
        }
        self.record();
        true
    }

    pub fn toggle_layer_visibility(&mut self, id: LayerId) -> bool {
        let visible = self.doc.layers.is_visible(id);
        self.set_layer_visibility(id, !visible)
    }

    pub fn rename_layer(&mut self, id: LayerId, name: &str) -> bool {
        if !self.doc.layers.rename(id, name) {
            return false;
        }
        self.record();
        true
    }

    /// Completes a drag-reorder with the final order; one snapshot per drop
    pub fn reorder_layers(&mut self, order: &[LayerId]) -> bool {
        if !self.doc.layers.reorder(order) {
            return false;
        }
        self.record();
        true
    }

    /// Moves one layer from stack index `from` to `to`, as a dropped drag
    pub fn move_layer(&mut self, from: usize, to: usize) -> bool {
        if !self.doc.layers.move_layer(from, to) {
            return false;
        }
        self.record();
        true
    }
}
