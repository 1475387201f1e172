//! Session files: the whole document as one JSON object with every raster
//! embedded as a PNG `data:` URL.
//!
//! Loading is staged. The file is parsed and every image decoded into a
//! [`LoadedSession`] before anything touches the live editor, so a bad file
//! leaves the document as it was.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::document::{DEFAULT_LAYER_NAME, PatternLibrary};
use crate::editor::Editor;
use crate::error::{SessionError, SessionResult};
use crate::layer::{LayerId, LayerStore};
use crate::raster::{Surface, decode_data_url, encode_png, png_data_url};
use crate::shape::Shape;
use crate::util::time::timestamp_millis;

/// One layer as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLayer {
    pub id: LayerId,
    pub name: String,
    pub is_visible: bool,
    #[serde(rename = "dataURL")]
    pub data_url: String,
}

/// On-disk session format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFile {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub layers: Vec<SessionLayer>,
    #[serde(default)]
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub user_patterns: BTreeMap<String, String>,
    #[serde(default)]
    pub active_layer_id: Option<LayerId>,
    #[serde(default)]
    pub prompt: String,
}

/// A fully decoded session, ready to be installed in one step
#[derive(Debug, Clone)]
pub struct LoadedSession {
    pub layers: LayerStore,
    pub shapes: Vec<Shape>,
    pub background: Option<RgbaImage>,
    pub patterns: PatternLibrary,
    pub prompt: String,
}

/// Default download name, `ai-visualiser-session-<millis>.json`
pub fn session_file_name() -> String {
    format!("ai-visualiser-session-{}.json", timestamp_millis())
}

fn image_data_url(image: &RgbaImage) -> SessionResult<String> {
    Ok(png_data_url(&encode_png(image)?))
}

impl SessionFile {
    /// Captures the editor as it is. Live shapes are stored as vectors, not
    /// rasterized, so they stay editable after a reload.
    pub fn capture(editor: &Editor, prompt: &str) -> SessionResult<Self> {
        let doc = &editor.doc;
        let layers = doc
            .layers
            .iter()
            .map(|layer| {
                Ok(SessionLayer {
                    id: layer.id,
                    name: layer.name.clone(),
                    is_visible: layer.visible,
                    data_url: layer.surface.to_data_url()?,
                })
            })
            .collect::<SessionResult<Vec<_>>>()?;

        let user_patterns = doc
            .patterns()
            .iter()
            .map(|(name, image)| Ok((name.clone(), image_data_url(image)?)))
            .collect::<SessionResult<BTreeMap<_, _>>>()?;

        Ok(Self {
            width: Some(doc.width()),
            height: Some(doc.height()),
            background: doc.background().map(|image| image_data_url(image)).transpose()?,
            layers,
            shapes: doc.shapes().to_vec(),
            user_patterns,
            active_layer_id: doc.layers.active_id(),
            prompt: prompt.to_string(),
        })
    }

    pub fn to_json(&self) -> SessionResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> SessionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decodes every embedded image and validates references
    pub fn decode(self) -> SessionResult<LoadedSession> {
        let (width, height) = match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => return Err(SessionError::MissingDimensions),
        };

        let background = self
            .background
            .as_deref()
            .map(decode_data_url)
            .transpose()
            .map_err(SessionError::Background)?;

        let mut layers = LayerStore::new(width, height);
        for saved in &self.layers {
            if layers.get(saved.id).is_some() {
                return Err(SessionError::DuplicateLayer(saved.id));
            }
            let image = decode_data_url(&saved.data_url).map_err(|source| SessionError::LayerImage {
                name: saved.name.clone(),
                source,
            })?;
            let mut surface = Surface::from_image(image);
            surface.resize(width, height);

            let mut layer = layers.create_layer(&saved.name, Some(saved.id));
            layer.visible = saved.is_visible;
            layer.surface = surface;
            layers.push_back(layer);
        }
        if layers.is_empty() {
            layers.add_layer(DEFAULT_LAYER_NAME);
        }
        let active = self
            .active_layer_id
            .filter(|id| layers.get(*id).is_some())
            .or_else(|| layers.iter().next().map(|layer| layer.id));
        layers.set_active_unchecked(active);

        if let Some(shape) = self.shapes.iter().find(|shape| layers.get(shape.layer_id).is_none()) {
            return Err(SessionError::DanglingShape {
                shape: shape.id,
                layer: shape.layer_id,
            });
        }

        let mut patterns = PatternLibrary::new();
        for (name, url) in &self.user_patterns {
            let image = decode_data_url(url).map_err(|source| SessionError::Pattern {
                name: name.clone(),
                source,
            })?;
            patterns.insert(name.clone(), Arc::new(image));
        }

        Ok(LoadedSession {
            layers,
            shapes: self.shapes,
            background,
            patterns,
            prompt: self.prompt,
        })
    }
}

/// Serializes the editor into session JSON
pub fn save_session(editor: &Editor, prompt: &str) -> SessionResult<String> {
    SessionFile::capture(editor, prompt)?.to_json()
}

/// Parses and installs a session. On error the editor is untouched.
/// Returns the prompt stored with the session.
pub fn load_session(editor: &mut Editor, json: &str) -> SessionResult<String> {
    let loaded = SessionFile::from_json(json)?.decode()?;
    Ok(editor.install_session(loaded))
}

pub fn save_session_to_path(editor: &Editor, prompt: &str, path: &Path) -> SessionResult<()> {
    let json = save_session(editor, prompt)?;
    std::fs::write(path, json)?;
    log::info!("Saved session to {}", path.display());
    Ok(())
}

pub fn load_session_from_path(editor: &mut Editor, path: &Path) -> SessionResult<String> {
    let json = std::fs::read_to_string(path)?;
    let prompt = load_session(editor, &json)?;
    log::info!("Loaded session from {}", path.display());
    Ok(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dimensions_is_rejected() {
        let file = SessionFile::from_json(r#"{"height": 10, "layers": []}"#).unwrap();
        assert!(matches!(file.decode(), Err(SessionError::MissingDimensions)));
    }

    #[test]
    fn test_no_layers_keeps_a_default_layer() {
        let loaded = SessionFile::from_json(r#"{"width": 4, "height": 3}"#)
            .unwrap()
            .decode()
            .unwrap();
        assert_eq!(loaded.layers.len(), 1);
        assert_eq!(loaded.layers.active().map(|l| l.name.as_str()), Some(DEFAULT_LAYER_NAME));
    }

    #[test]
    fn test_layer_field_names_match_file_format() {
        let layer = SessionLayer {
            id: LayerId(3),
            name: "Ink".into(),
            is_visible: false,
            data_url: "data:image/png;base64,".into(),
        };
        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["isVisible"], false);
        assert!(json.get("dataURL").is_some());
    }
}
