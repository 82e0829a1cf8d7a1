use crate::{
    constants::{DEFAULT_PAGE_GAP, IMAGE_LOAD_TIMEOUT},
    count::CounterConfig,
    geometry::Flow,
    grid::GridConfig,
    navigator::NavigatorConfig,
    progress::ProgressMode,
    stability::StabilityConfig,
};
use std::time::Duration;

/// Settings for one reading view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReaderConfig {
    pub flow: Flow,
    pub page_gap: f64,
    pub progress_mode: ProgressMode,
    /// Count ASCII Latin letters as well as Japanese text and digits.
    pub count_ascii_letters: bool,
    pub stability: StabilityConfig,
    pub image_timeout: Duration,
    pub grid: GridConfig,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            flow: Flow::default(),
            page_gap: DEFAULT_PAGE_GAP,
            progress_mode: ProgressMode::default(),
            count_ascii_letters: false,
            stability: StabilityConfig::default(),
            image_timeout: IMAGE_LOAD_TIMEOUT,
            grid: GridConfig::default(),
        }
    }
}

impl ReaderConfig {
    pub fn navigator_config(&self) -> NavigatorConfig {
        NavigatorConfig {
            flow: self.flow,
            page_gap: self.page_gap,
        }
    }

    pub fn counter_config(&self) -> CounterConfig {
        CounterConfig {
            count_ascii_letters: self.count_ascii_letters,
        }
    }
}
