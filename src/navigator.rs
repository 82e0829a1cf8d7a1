//! Page-by-page navigation driven purely by viewport geometry.
//!
//! The navigator never looks at characters. It moves a virtual position in
//! steps of one viewport plus the inter-page gap, asks the section
//! collaborator to swap chapters at the edges, and reports every resulting
//! position through the page-change sink.

use crate::{
    constants::DEFAULT_PAGE_GAP,
    geometry::{Flow, FlowTransform, Layout},
};
use std::fmt;
use tracing::{debug, info};

/// Chapter-boundary collaborator. Returning `false` declines the crossing.
pub trait SectionNavigator {
    fn prev_section(&mut self) -> bool;
    fn next_section(&mut self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    Forward,
    Backward,
}

impl FlipDirection {
    fn multiplier(self) -> f64 {
        match self {
            FlipDirection::Forward => 1.0,
            FlipDirection::Backward => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionChange {
    Previous,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    Moved,
    SectionChanged(SectionChange),
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageChange {
    pub position: f64,
    pub is_user: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavigatorConfig {
    pub flow: Flow,
    pub page_gap: f64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            flow: Flow::default(),
            page_gap: DEFAULT_PAGE_GAP,
        }
    }
}

type PageChangeSink = Box<dyn FnMut(PageChange)>;

pub struct PageNavigator {
    transform: FlowTransform,
    page_gap: f64,
    position: f64,
    translated: bool,
    sections: Option<Box<dyn SectionNavigator>>,
    page_change_sink: Option<PageChangeSink>,
}

impl fmt::Debug for PageNavigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageNavigator")
            .field("flow", &self.transform.flow())
            .field("page_gap", &self.page_gap)
            .field("position", &self.position)
            .field("translated", &self.translated)
            .field("has_sections", &self.sections.is_some())
            .finish()
    }
}

impl PageNavigator {
    pub fn new(config: NavigatorConfig) -> Self {
        Self {
            transform: config.flow.transform(),
            page_gap: config.page_gap,
            position: 0.0,
            translated: false,
            sections: None,
            page_change_sink: None,
        }
    }

    pub fn set_sections<S>(&mut self, sections: S)
    where
        S: SectionNavigator + 'static,
    {
        self.sections = Some(Box::new(sections));
    }

    pub fn clear_sections(&mut self) {
        self.sections = None;
    }

    pub fn set_page_change_sink<F>(&mut self, sink: F)
    where
        F: FnMut(PageChange) + 'static,
    {
        self.page_change_sink = Some(Box::new(sink));
    }

    pub fn flow(&self) -> Flow {
        self.transform.flow()
    }

    pub fn page_gap(&self) -> f64 {
        self.page_gap
    }

    /// Current virtual position of the view's leading edge.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Whether the trailing partial page is shown through a content offset
    /// instead of a scroll.
    pub fn is_transformed(&self) -> bool {
        self.translated
    }

    pub fn page_step<L: Layout + ?Sized>(&self, layout: &L) -> f64 {
        layout.viewport_extent(self.transform.axis()) + self.page_gap
    }

    pub fn next_page<L: Layout + ?Sized>(&mut self, layout: &mut L) -> FlipOutcome {
        self.flip(layout, FlipDirection::Forward)
    }

    pub fn prev_page<L: Layout + ?Sized>(&mut self, layout: &mut L) -> FlipOutcome {
        self.flip(layout, FlipDirection::Backward)
    }

    pub fn flip<L: Layout + ?Sized>(&mut self, layout: &mut L, direction: FlipDirection) -> FlipOutcome {
        let step = self.page_step(layout);

        if self.translated {
            return match direction {
                FlipDirection::Backward => {
                    let previous = self.position;
                    self.clear_transform(layout);
                    self.scroll_or_translate(layout, (previous - step).max(0.0), true);
                    FlipOutcome::Moved
                }
                FlipDirection::Forward => {
                    if self.request_section(SectionChange::Next) {
                        self.clear_transform(layout);
                        FlipOutcome::SectionChanged(SectionChange::Next)
                    } else {
                        FlipOutcome::Unchanged
                    }
                }
            };
        }

        let total = layout.scroll_extent(self.transform.axis());
        let current = self.position;
        let candidate = current + step * direction.multiplier();
        let candidate_ceil = candidate.ceil();

        if candidate_ceil < 0.0 {
            if current != 0.0 {
                // finish the partial first page before leaving the section
                self.scroll_or_translate(layout, 0.0, true);
                return FlipOutcome::Moved;
            }
            return self.cross(SectionChange::Previous);
        }

        if candidate_ceil >= total {
            return self.cross(SectionChange::Next);
        }

        self.scroll_or_translate(layout, candidate, true);
        FlipOutcome::Moved
    }

    /// Absolute positioning. Clears any active content offset first.
    pub fn scroll_to<L: Layout + ?Sized>(&mut self, layout: &mut L, pos: f64, is_user: bool) {
        self.clear_transform(layout);
        self.scroll_or_translate(layout, pos.max(0.0), is_user);
    }

    /// Jumps to the start of the last page.
    pub fn scroll_to_end<L: Layout + ?Sized>(&mut self, layout: &mut L, is_user: bool) {
        let step = self.page_step(layout);
        let total = layout.scroll_extent(self.transform.axis());
        let last_page = if step > 0.0 && total > 0.0 {
            ((total / step).ceil() - 1.0).max(0.0) * step
        } else {
            0.0
        };
        self.scroll_to(layout, last_page, is_user);
    }

    /// Returns to the start after the viewport changed size. Does not report
    /// a page change.
    pub fn reset<L: Layout + ?Sized>(&mut self, layout: &mut L) {
        self.clear_transform(layout);
        self.position = 0.0;
        layout.set_scroll_offset(self.transform.axis(), 0.0);
    }

    /// Adopts a scroll the user made directly on the surface.
    pub fn sync_from_layout<L: Layout + ?Sized>(&mut self, layout: &L) {
        if self.translated {
            return;
        }
        let physical = layout.scroll_offset(self.transform.axis());
        let pos = self.transform.to_virtual(physical).max(0.0);
        if pos != self.position {
            self.position = pos;
            self.emit(PageChange {
                position: pos,
                is_user: true,
            });
        }
    }

    fn cross(&mut self, change: SectionChange) -> FlipOutcome {
        if self.request_section(change) {
            FlipOutcome::SectionChanged(change)
        } else {
            FlipOutcome::Unchanged
        }
    }

    fn request_section(&mut self, change: SectionChange) -> bool {
        let Some(sections) = self.sections.as_mut() else {
            debug!("No section navigator registered, staying at {}", self.position);
            return false;
        };
        let accepted = match change {
            SectionChange::Previous => sections.prev_section(),
            SectionChange::Next => sections.next_section(),
        };
        if accepted {
            info!("Crossing to {:?} section", change);
        } else {
            debug!("Section navigator declined {:?} crossing", change);
        }
        accepted
    }

    fn scroll_or_translate<L: Layout + ?Sized>(&mut self, layout: &mut L, pos: f64, is_user: bool) {
        let axis = self.transform.axis();
        let total = layout.scroll_extent(axis);
        let viewport = layout.viewport_extent(axis);

        if pos <= 0.0 || pos + viewport <= total {
            layout.set_scroll_offset(axis, self.transform.to_physical(pos));
        } else {
            // scroll as far as the surface allows and offset the content for the rest
            let max_scroll = (total - viewport).max(0.0);
            layout.set_scroll_offset(axis, self.transform.to_physical(max_scroll));
            layout.set_content_transform(self.transform.content_offset(pos - max_scroll));
            self.translated = true;
            debug!("Trailing partial page at {} shown through content offset", pos);
        }

        self.position = pos;
        self.emit(PageChange {
            position: pos,
            is_user,
        });
    }

    fn clear_transform<L: Layout + ?Sized>(&mut self, layout: &mut L) {
        if self.translated {
            layout.clear_content_transform();
            self.translated = false;
            debug!("Content offset cleared");
        }
    }

    fn emit(&mut self, change: PageChange) {
        if let Some(sink) = self.page_change_sink.as_mut() {
            sink(change);
        }
    }
}
