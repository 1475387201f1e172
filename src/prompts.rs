use std::path::{Path, PathBuf};

use crate::config::data_dir;
use crate::error::ConfigResult;

/// Storage key, also the stem of the file the prompts live in
pub const SAVED_PROMPTS_KEY: &str = "ai-design-vis-saved-prompts";
pub const SAVED_PROMPTS_DOWNLOAD: &str = "saved-prompts.txt";

/// User-saved prompts, newest first, persisted as a JSON string array
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavedPrompts {
    prompts: Vec<String>,
    path: Option<PathBuf>,
}

impl SavedPrompts {
    /// An in-memory list that is never written anywhere
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn default_path() -> Option<PathBuf> {
        data_dir().map(|dir| dir.join(format!("{SAVED_PROMPTS_KEY}.json")))
    }

    /// Loads from `path`; a missing or unreadable file starts empty
    pub fn load(path: &Path) -> Self {
        let prompts = match std::fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|err| {
                log::warn!("Ignoring unreadable saved prompts at {}: {err}", path.display());
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };
        Self {
            prompts,
            path: Some(path.to_path_buf()),
        }
    }

    pub fn load_default() -> Self {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Self::in_memory(),
        }
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// Adds a trimmed prompt at the top. Blank and duplicate prompts are ignored.
    pub fn add(&mut self, prompt: &str) -> bool {
        let prompt = prompt.trim();
        if prompt.is_empty() || self.prompts.iter().any(|p| p == prompt) {
            return false;
        }
        self.prompts.insert(0, prompt.to_string());
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.prompts.len()).then(|| self.prompts.remove(index))
    }

    pub fn persist(&self) -> ConfigResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string(&self.prompts)?)?;
        Ok(())
    }

    /// Plain-text export, `None` when there is nothing saved
    pub fn to_text(&self) -> Option<String> {
        if self.prompts.is_empty() {
            return None;
        }
        Some(self.prompts.join("\n\n---\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_trims_and_rejects_duplicates() {
        let mut saved = SavedPrompts::in_memory();
        assert!(saved.add("  modern loft  "));
        assert!(!saved.add("modern loft"));
        assert!(!saved.add("   "));
        assert!(saved.add("brick facade"));
        assert_eq!(saved.prompts(), ["brick facade", "modern loft"]);
    }

    #[test]
    fn test_text_export_separates_prompts() {
        let mut saved = SavedPrompts::in_memory();
        assert_eq!(saved.to_text(), None);
        saved.add("one");
        saved.add("two");
        assert_eq!(saved.to_text().as_deref(), Some("two\n\n---\n\none"));
    }

    #[test]
    fn test_remove_out_of_range_is_none() {
        let mut saved = SavedPrompts::in_memory();
        saved.add("only");
        assert_eq!(saved.remove(3), None);
        assert_eq!(saved.remove(0).as_deref(), Some("only"));
    }
}
