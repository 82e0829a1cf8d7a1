use std::time::Duration;

// Pagination
pub const DEFAULT_PAGE_GAP: f64 = 40.0;
pub const TERMINAL_PAGE_GAP: f64 = 0.0;

// Layout stability
pub const STABLE_FRAME_COUNT: u32 = 5;
pub const MAX_STABILITY_ATTEMPTS: u32 = 60;
pub const IMAGE_LOAD_TIMEOUT: Duration = Duration::from_millis(2000);

// Node classification
pub const GAIJI_CLASS_MARKER: &str = "gaiji";
pub const ANNOTATION_TAG: &str = "rt";

// Terminal rendering
pub const GAIJI_PLACEHOLDER: char = '〓';
pub const HEADER_HEIGHT: u16 = 3;
pub const FOOTER_HEIGHT: u16 = 3;
pub const DEFAULT_LINE_LENGTH: usize = 40;
pub const DEFAULT_PAGE_LINES: usize = 20;

// Validation and limits
pub const MAX_CHAPTER_SIZE: u64 = 5 * 1024 * 1024; // 5MB

// Caching
pub const CHAPTER_CACHE_SIZE: usize = 5;
