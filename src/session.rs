use crate::{
    book::{Book, Chapter},
    config::ReaderConfig,
    error::DocumentError,
    geometry::{Flow, Layout},
    grid::{GridConfig, GridLayout},
    navigator::{FlipOutcome, PageChange, PageNavigator, SectionChange, SectionNavigator},
    nodes::{CountableNode, collect_countable_nodes},
    position::PositionIndex,
    progress::{
        ProgressMode, ProgressReport, ProgressStore, ProgressTracker, ReadingProgress,
        book_progress, position_at_scroll_percent, scroll_percent,
    },
    stability::{ImageGate, PendingRelayout, RelayoutGuard, RelayoutPoll},
};
use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
    sync::Arc,
    time::Instant,
};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RestoreTarget {
    Start,
    CharCount(usize),
    ScrollPercent(f64),
    End,
}

// the session swaps chapters once the flip returns
struct ChapterBounds {
    request: Rc<Cell<Option<SectionChange>>>,
    chapter_index: usize,
    chapter_count: usize,
}

impl SectionNavigator for ChapterBounds {
    fn prev_section(&mut self) -> bool {
        if self.chapter_index == 0 {
            return false;
        }
        self.request.set(Some(SectionChange::Previous));
        true
    }

    fn next_section(&mut self) -> bool {
        if self.chapter_index + 1 >= self.chapter_count {
            return false;
        }
        self.request.set(Some(SectionChange::Next));
        true
    }
}

#[derive(Debug)]
pub struct ReadingSession {
    book: Book,
    config: ReaderConfig,
    chapter: Arc<Chapter>,
    nodes: Vec<CountableNode>,
    layout: GridLayout,
    index: PositionIndex,
    navigator: PageNavigator,
    guard: RelayoutGuard,
    pending: Option<PendingRelayout>,
    restore: RestoreTarget,
    remeasure: bool,
    tracker: ProgressTracker,
    last_saved: Option<ReadingProgress>,
    section_request: Rc<Cell<Option<SectionChange>>>,
    page_changes: Rc<RefCell<VecDeque<PageChange>>>,
}

impl ReadingSession {
    /// Opens `book` at the position saved in `store`, or at the start of the
    /// first chapter. The first layout is scheduled, not yet settled.
    pub fn open<S>(book: Book, config: ReaderConfig, store: S) -> Result<Self, DocumentError>
    where
        S: ProgressStore + 'static,
    {
        let tracker = ProgressTracker::new(book.id(), book.chapter_char_counts(), store);
        let saved = tracker.saved();

        let (chapter_index, restore) = match saved {
            Some(ref record) if record.chapter_index < book.chapter_count() => {
                info!(
                    "Resuming {} at chapter {}, {} characters in",
                    book.id(),
                    record.chapter_index,
                    record.explored_char_count
                );
                let restore = match (config.progress_mode, record.scroll_percent) {
                    (ProgressMode::ScrollPercent, Some(percent)) => {
                        RestoreTarget::ScrollPercent(percent)
                    }
                    _ => RestoreTarget::CharCount(record.explored_char_count),
                };
                (record.chapter_index, restore)
            }
            _ => (0, RestoreTarget::Start),
        };

        let chapter = book.get_chapter(chapter_index)?;
        let layout = GridLayout::new(&chapter.document, config.flow, config.grid);
        let mut session = Self {
            nodes: Vec::new(),
            index: PositionIndex::empty(config.flow),
            navigator: PageNavigator::new(config.navigator_config()),
            guard: RelayoutGuard::new(),
            pending: None,
            restore,
            remeasure: false,
            tracker,
            last_saved: saved,
            section_request: Rc::new(Cell::new(None)),
            page_changes: Rc::new(RefCell::new(VecDeque::new())),
            book,
            config,
            chapter,
            layout,
        };
        let chapter = Arc::clone(&session.chapter);
        session.install_chapter(chapter, restore);
        Ok(session)
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn chapter(&self) -> &Chapter {
        &self.chapter
    }

    pub fn chapter_index(&self) -> usize {
        self.chapter.index
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn index(&self) -> &PositionIndex {
        &self.index
    }

    pub fn navigator(&self) -> &PageNavigator {
        &self.navigator
    }

    pub fn flow(&self) -> Flow {
        self.config.flow
    }

    pub fn is_settling(&self) -> bool {
        self.pending.is_some()
    }

    pub fn last_saved(&self) -> Option<&ReadingProgress> {
        self.last_saved.as_ref()
    }

    /// Characters read in the current chapter. While a relayout is pending
    /// this is the count that will be restored.
    pub fn explored_char_count(&self) -> usize {
        if self.pending.is_some() {
            if let RestoreTarget::CharCount(count) = self.restore {
                return count;
            }
        }
        self.index.char_count_at_position(self.navigator.position())
    }

    pub fn progress(&self) -> f64 {
        book_progress(
            &self.book.chapter_char_counts(),
            self.chapter.index,
            self.explored_char_count(),
        )
    }

    /// Advances any pending relayout by one frame and installs the index
    /// once the layout is stable.
    pub fn poll_layout(&mut self, now: Instant) -> RelayoutPoll {
        let Some(pending) = self.pending.as_mut() else {
            return RelayoutPoll::Ready;
        };
        let extent = self.layout.scroll_extent(self.config.flow.axis);
        match pending.poll(&self.guard, extent, now) {
            RelayoutPoll::Waiting => RelayoutPoll::Waiting,
            RelayoutPoll::Cancelled => {
                self.pending = None;
                RelayoutPoll::Cancelled
            }
            RelayoutPoll::Ready => {
                self.pending = None;
                self.install_index();
                RelayoutPoll::Ready
            }
        }
    }

    pub fn settle(&mut self) -> RelayoutPoll {
        loop {
            match self.poll_layout(Instant::now()) {
                RelayoutPoll::Waiting => continue,
                done => return done,
            }
        }
    }

    pub fn next_page(&mut self) -> Result<FlipOutcome, DocumentError> {
        if self.pending.is_some() {
            return Ok(FlipOutcome::Unchanged);
        }
        let outcome = self.navigator.next_page(&mut self.layout);
        self.after_navigation()?;
        Ok(outcome)
    }

    pub fn prev_page(&mut self) -> Result<FlipOutcome, DocumentError> {
        if self.pending.is_some() {
            return Ok(FlipOutcome::Unchanged);
        }
        let outcome = self.navigator.prev_page(&mut self.layout);
        self.after_navigation()?;
        Ok(outcome)
    }

    /// Scrolls the surface directly; counts as a user page change.
    pub fn scroll_lines(&mut self, lines: f64) {
        if self.pending.is_some() || self.navigator.is_transformed() {
            return;
        }
        let axis = self.config.flow.axis;
        let transform = self.config.flow.transform();
        let current = transform.to_virtual(self.layout.scroll_offset(axis));
        self.layout
            .set_scroll_offset(axis, transform.to_physical(current + lines));
        self.navigator.sync_from_layout(&self.layout);
        self.record_page_changes();
    }

    pub fn go_to_chapter(&mut self, index: usize) -> Result<(), DocumentError> {
        let chapter = self.book.get_chapter(index)?;
        self.record_page_changes();
        self.install_chapter(chapter, RestoreTarget::Start);
        Ok(())
    }

    /// Relays the chapter out for a new surface size, keeping the reader's
    /// character position.
    pub fn resize(&mut self, grid: GridConfig) {
        if grid == self.config.grid {
            return;
        }
        debug!(
            "Resize to {}x{} lines, resetting pagination",
            grid.line_length, grid.page_lines
        );
        let restore = self.capture_restore_target();
        self.config.grid = grid;
        self.layout = GridLayout::new(&self.chapter.document, self.config.flow, grid);
        self.navigator.reset(&mut self.layout);
        self.remeasure = !self.index.is_empty();
        self.schedule_relayout(restore);
    }

    pub fn toggle_flow(&mut self) {
        let restore = self.capture_restore_target();
        self.config.flow = if self.config.flow == Flow::vertical_rl() {
            Flow::horizontal_tb()
        } else {
            Flow::vertical_rl()
        };
        info!("Switching flow to {:?}", self.config.flow);
        self.navigator = PageNavigator::new(self.config.navigator_config());
        self.attach_navigator();
        self.layout = GridLayout::new(&self.chapter.document, self.config.flow, self.config.grid);
        self.index = PositionIndex::empty(self.config.flow);
        self.remeasure = false;
        self.schedule_relayout(restore);
    }

    fn capture_restore_target(&self) -> RestoreTarget {
        if self.pending.is_some() {
            return self.restore;
        }
        match self.config.progress_mode {
            ProgressMode::CharCount => RestoreTarget::CharCount(self.explored_char_count()),
            ProgressMode::ScrollPercent => {
                let axis = self.config.flow.axis;
                RestoreTarget::ScrollPercent(scroll_percent(
                    self.navigator.position(),
                    self.layout.scroll_extent(axis),
                    self.layout.viewport_extent(axis),
                ))
            }
        }
    }

    fn attach_navigator(&mut self) {
        let queue = Rc::clone(&self.page_changes);
        self.navigator
            .set_page_change_sink(move |change| queue.borrow_mut().push_back(change));
        self.navigator.set_sections(ChapterBounds {
            request: Rc::clone(&self.section_request),
            chapter_index: self.chapter.index,
            chapter_count: self.book.chapter_count(),
        });
    }

    fn install_chapter(&mut self, chapter: Arc<Chapter>, restore: RestoreTarget) {
        info!("Showing chapter {}: {}", chapter.index, chapter.title);
        self.nodes = collect_countable_nodes(&chapter.document, self.book.counter());
        self.layout = GridLayout::new(&chapter.document, self.config.flow, self.config.grid);
        self.index = PositionIndex::empty(self.config.flow);
        self.remeasure = false;
        self.chapter = chapter;
        self.navigator.reset(&mut self.layout);
        self.attach_navigator();
        self.schedule_relayout(restore);
    }

    fn schedule_relayout(&mut self, restore: RestoreTarget) {
        let ticket = self.guard.invalidate();
        // the cell grid draws gaiji as placeholder cells while it builds, so
        // no image loads are outstanding
        let images = ImageGate::new(0, self.config.image_timeout, Instant::now());
        self.pending = Some(PendingRelayout::new(ticket, images, self.config.stability));
        self.restore = restore;
        // changes queued against the old layout are meaningless now
        self.page_changes.borrow_mut().clear();
    }

    fn install_index(&mut self) {
        let scroll_position = self.navigator.position();
        if self.remeasure && self.index.len() == self.nodes.len() {
            self.index.update_positions(&self.layout, scroll_position);
        } else {
            self.index =
                PositionIndex::build(&self.nodes, &self.layout, self.config.flow, scroll_position);
        }
        self.remeasure = false;

        match self.restore {
            RestoreTarget::Start => self.navigator.scroll_to(&mut self.layout, 0.0, false),
            RestoreTarget::CharCount(count) => {
                let pos = self.index.position_at_char_count(count);
                debug!("Restoring {} characters at position {}", count, pos);
                self.navigator.scroll_to(&mut self.layout, pos, false);
            }
            RestoreTarget::ScrollPercent(percent) => {
                let axis = self.config.flow.axis;
                let pos = position_at_scroll_percent(
                    percent,
                    self.layout.scroll_extent(axis),
                    self.layout.viewport_extent(axis),
                );
                self.navigator.scroll_to(&mut self.layout, pos, false);
            }
            RestoreTarget::End => self.navigator.scroll_to_end(&mut self.layout, false),
        }
        self.restore = RestoreTarget::Start;
        self.record_page_changes();
    }

    fn after_navigation(&mut self) -> Result<(), DocumentError> {
        self.record_page_changes();
        let Some(change) = self.section_request.take() else {
            return Ok(());
        };
        let (index, restore) = match change {
            SectionChange::Next => (self.chapter.index + 1, RestoreTarget::Start),
            SectionChange::Previous => (self.chapter.index.saturating_sub(1), RestoreTarget::End),
        };
        let chapter = self.book.get_chapter(index)?;
        self.install_chapter(chapter, restore);
        Ok(())
    }

    fn record_page_changes(&mut self) {
        let changes: Vec<PageChange> = self.page_changes.borrow_mut().drain(..).collect();
        let Some(last) = changes.last() else {
            return;
        };
        let report = match self.config.progress_mode {
            ProgressMode::CharCount => ProgressReport::Characters {
                chapter_index: self.chapter.index,
                explored_char_count: self.index.char_count_at_position(last.position),
                chapter_char_count: self.chapter.char_count,
            },
            ProgressMode::ScrollPercent => {
                let axis = self.config.flow.axis;
                ProgressReport::ScrollPercent {
                    chapter_index: self.chapter.index,
                    percent: scroll_percent(
                        last.position,
                        self.layout.scroll_extent(axis),
                        self.layout.viewport_extent(axis),
                    ),
                }
            }
        };
        self.last_saved = Some(self.tracker.record(report));
    }
}
