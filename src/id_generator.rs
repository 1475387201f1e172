use serde::{Deserialize, Serialize};

/// Monotonic id source; ids handed out are never reissued by the same generator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdGenerator {
    next: u32,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Ensures ids already in use (e.g. loaded from a file) are never produced
    pub fn reserve_past(&mut self, used: u32) {
        self.next = self.next.max(used.saturating_add(1));
    }
}
