//! Downloadable artifacts: the sketch sent for generation, generated images
//! and the zipped history of recent results.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::RgbaImage;
use zip::write::SimpleFileOptions;

use crate::error::{ExportError, ExportResult};
use crate::raster::encode_png;
use crate::util::time::timestamp_millis;

/// Most generated images kept before the user must export them
pub const MAX_HISTORY_IMAGES: usize = 5;
pub const HISTORY_ZIP_NAME: &str = "ai_visualiser_history.zip";

/// One generated result
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub original: RgbaImage,
    pub captioned: RgbaImage,
    pub prompt: String,
}

/// Recent generated images, newest first
#[derive(Debug, Clone, Default)]
pub struct ImageHistory {
    entries: Vec<HistoryEntry>,
}

impl ImageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_HISTORY_IMAGES
    }

    /// Adds at the front. Refused when full; the caller should prompt the
    /// user to export first.
    pub fn add(&mut self, entry: HistoryEntry) -> bool {
        if self.is_full() {
            log::warn!("Image history is full, refusing new entry");
            return false;
        }
        self.entries.insert(0, entry);
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Zips every entry as `generated_N.png` plus `generated_N_prompt.txt`.
/// Images are stored without the caption.
pub fn history_zip(history: &ImageHistory) -> ExportResult<Vec<u8>> {
    if history.is_empty() {
        return Err(ExportError::Empty("No images in history to download."));
    }
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (index, entry) in history.entries().iter().enumerate() {
        let n = index + 1;
        writer.start_file(format!("generated_{n}.png"), options)?;
        writer.write_all(&encode_png(&entry.original)?)?;
        writer.start_file(format!("generated_{n}_prompt.txt"), options)?;
        writer.write_all(entry.prompt.as_bytes())?;
    }
    Ok(writer.finish()?.into_inner())
}

/// Writes the history archive into `dir` and empties the history
pub fn export_history(history: &mut ImageHistory, dir: &Path) -> ExportResult<PathBuf> {
    let bytes = history_zip(history)?;
    let path = dir.join(HISTORY_ZIP_NAME);
    std::fs::write(&path, bytes)?;
    log::info!("Exported {} generated image(s) to {}", history.len(), path.display());
    history.clear();
    Ok(path)
}

/// The latest generation: the sketch that was sent and what came back
#[derive(Debug, Clone, Default)]
pub struct GenerationOutputs {
    sketch: Option<RgbaImage>,
    generated: Option<HistoryEntry>,
    /// Whether the caption is shown on (and downloaded with) the result
    pub show_prompt: bool,
}

impl GenerationOutputs {
    pub fn set_sketch(&mut self, sketch: RgbaImage) {
        self.sketch = Some(sketch);
    }

    pub fn set_generated(&mut self, entry: HistoryEntry) {
        self.generated = Some(entry);
        self.show_prompt = true;
    }

    pub fn sketch(&self) -> Option<&RgbaImage> {
        self.sketch.as_ref()
    }

    pub fn generated(&self) -> Option<&HistoryEntry> {
        self.generated.as_ref()
    }

    /// The image to display, respecting the caption toggle
    pub fn displayed(&self) -> Option<&RgbaImage> {
        self.generated.as_ref().map(|entry| {
            if self.show_prompt {
                &entry.captioned
            } else {
                &entry.original
            }
        })
    }

    pub fn clear_generated(&mut self) {
        self.generated = None;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// `(file name, png bytes)` of the last sketch
    pub fn sketch_download(&self) -> ExportResult<(String, Vec<u8>)> {
        let sketch = self
            .sketch
            .as_ref()
            .ok_or(ExportError::Empty("No sketch image available to download."))?;
        Ok((format!("sketch-{}.png", timestamp_millis()), encode_png(sketch)?))
    }

    /// `(file name, png bytes)` of the displayed result
    pub fn generated_download(&self) -> ExportResult<(String, Vec<u8>)> {
        let image = self
            .displayed()
            .ok_or(ExportError::Empty("No image available to download."))?;
        let name = if self.show_prompt {
            format!("with-prompt-{}.png", timestamp_millis())
        } else {
            format!("generated-image-{}.png", timestamp_millis())
        };
        Ok((name, encode_png(image)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(prompt: &str) -> HistoryEntry {
        HistoryEntry {
            original: RgbaImage::new(2, 2),
            captioned: RgbaImage::new(2, 2),
            prompt: prompt.to_string(),
        }
    }

    #[test]
    fn test_history_refuses_sixth_entry() {
        let mut history = ImageHistory::new();
        for i in 0..MAX_HISTORY_IMAGES {
            assert!(history.add(entry(&format!("p{i}"))));
        }
        assert!(!history.add(entry("overflow")));
        assert_eq!(history.len(), MAX_HISTORY_IMAGES);
        assert_eq!(history.entries()[0].prompt, "p4");
    }

    #[test]
    fn test_zip_names_entries_newest_first() {
        let mut history = ImageHistory::new();
        history.add(entry("older"));
        history.add(entry("newer"));

        let bytes = history_zip(&history).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 4);

        let mut prompt = String::new();
        std::io::Read::read_to_string(&mut archive.by_name("generated_1_prompt.txt").unwrap(), &mut prompt)
            .unwrap();
        assert_eq!(prompt, "newer");
        assert!(archive.by_name("generated_2.png").is_ok());
    }

    #[test]
    fn test_empty_history_has_nothing_to_export() {
        assert!(matches!(history_zip(&ImageHistory::new()), Err(ExportError::Empty(_))));
    }

    #[test]
    fn test_missing_sketch_message() {
        let err = GenerationOutputs::default().sketch_download().unwrap_err();
        assert_eq!(err.to_string(), "No sketch image available to download.");
    }
}
