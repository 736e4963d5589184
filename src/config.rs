use serde::{Deserialize, Serialize};

/// Configuration surface consumed by the core. Constructed
/// once and frozen for the lifetime of a `Parser` — see `src/lib.rs`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Reserved; no behavior today. Accepted so callers can set it
    /// without the crate needing a breaking change later.
    pub strict: bool,
    pub enable_enhanced_parsing: bool,
    pub max_total_bytes: u64,
    pub max_entries: u32,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            strict: false,
            enable_enhanced_parsing: true,
            max_total_bytes: 200_000_000,
            max_entries: 10_000,
        }
    }
}

impl ParserConfig {
    pub fn archive_limits(&self) -> crate::archive::ArchiveLimits {
        crate::archive::ArchiveLimits {
            max_total_bytes: self.max_total_bytes,
            max_entries: self.max_entries,
        }
    }
}
