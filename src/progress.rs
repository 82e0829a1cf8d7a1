//! Reading-progress records and the persistence collaborator.
//!
//! The engine only computes per-chapter explored counts (or a scroll
//! percentage); storage belongs to whatever implements [`ProgressStore`].

use std::{cell::RefCell, collections::HashMap, rc::Rc, time::SystemTime};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct ReadingProgress {
    pub book_id: String,
    pub chapter_index: usize,
    /// Characters read within the current chapter.
    pub explored_char_count: usize,
    pub chapter_char_count: usize,
    /// Whole-book ratio in `[0, 1]`.
    pub progress: f64,
    /// Scroll ratio within the chapter, when saved in scroll-percent mode.
    pub scroll_percent: Option<f64>,
    pub last_read: SystemTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressMode {
    #[default]
    CharCount,
    ScrollPercent,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressReport {
    Characters {
        chapter_index: usize,
        explored_char_count: usize,
        chapter_char_count: usize,
    },
    ScrollPercent {
        chapter_index: usize,
        percent: f64,
    },
}

impl ProgressReport {
    pub fn chapter_index(&self) -> usize {
        match *self {
            ProgressReport::Characters { chapter_index, .. } => chapter_index,
            ProgressReport::ScrollPercent { chapter_index, .. } => chapter_index,
        }
    }
}

pub trait ProgressStore {
    /// Inserts or replaces the record for `progress.book_id`.
    fn save(&mut self, progress: ReadingProgress);
    fn load(&self, book_id: &str) -> Option<ReadingProgress>;
    fn remove(&mut self, book_id: &str) -> Option<ReadingProgress>;
}

#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    records: HashMap<String, ReadingProgress>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn save(&mut self, progress: ReadingProgress) {
        self.records.insert(progress.book_id.clone(), progress);
    }

    fn load(&self, book_id: &str) -> Option<ReadingProgress> {
        self.records.get(book_id).cloned()
    }

    fn remove(&mut self, book_id: &str) -> Option<ReadingProgress> {
        self.records.remove(book_id)
    }
}

impl<S: ProgressStore> ProgressStore for Rc<RefCell<S>> {
    fn save(&mut self, progress: ReadingProgress) {
        self.borrow_mut().save(progress);
    }

    fn load(&self, book_id: &str) -> Option<ReadingProgress> {
        self.borrow().load(book_id)
    }

    fn remove(&mut self, book_id: &str) -> Option<ReadingProgress> {
        self.borrow_mut().remove(book_id)
    }
}

/// Whole-book ratio: earlier chapters plus what was read in this one.
pub fn book_progress(chapter_char_counts: &[usize], chapter_index: usize, explored: usize) -> f64 {
    let total: usize = chapter_char_counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let before: usize = chapter_char_counts.iter().take(chapter_index).sum();
    ((before + explored) as f64 / total as f64).clamp(0.0, 1.0)
}

pub fn scroll_percent(position: f64, scroll_extent: f64, viewport_extent: f64) -> f64 {
    let max_scroll = scroll_extent - viewport_extent;
    if max_scroll > 0.0 {
        (position / max_scroll).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub fn position_at_scroll_percent(percent: f64, scroll_extent: f64, viewport_extent: f64) -> f64 {
    let max_scroll = scroll_extent - viewport_extent;
    if max_scroll > 0.0 {
        percent.clamp(0.0, 1.0) * max_scroll
    } else {
        0.0
    }
}

/// Proportional estimate used when no position index is available yet.
pub fn approximate_position_at_char_count(
    char_count: usize,
    total_char_count: usize,
    scroll_extent: f64,
    viewport_extent: f64,
) -> f64 {
    if total_char_count == 0 {
        return 0.0;
    }
    let ratio = (char_count as f64 / total_char_count as f64).min(1.0);
    let max_scroll = (scroll_extent - viewport_extent).max(1.0);
    (ratio * max_scroll).round()
}

/// Turns engine reports into stored records for one book.
pub struct ProgressTracker {
    book_id: String,
    chapter_char_counts: Vec<usize>,
    store: Box<dyn ProgressStore>,
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("book_id", &self.book_id)
            .field("chapters", &self.chapter_char_counts.len())
            .finish()
    }
}

impl ProgressTracker {
    pub fn new<S>(book_id: impl Into<String>, chapter_char_counts: Vec<usize>, store: S) -> Self
    where
        S: ProgressStore + 'static,
    {
        Self {
            book_id: book_id.into(),
            chapter_char_counts,
            store: Box::new(store),
        }
    }

    pub fn book_id(&self) -> &str {
        &self.book_id
    }

    pub fn saved(&self) -> Option<ReadingProgress> {
        self.store.load(&self.book_id)
    }

    pub fn record(&mut self, report: ProgressReport) -> ReadingProgress {
        let chapter_index = report.chapter_index();
        let known_total = self
            .chapter_char_counts
            .get(chapter_index)
            .copied()
            .unwrap_or(0);

        let (explored_char_count, chapter_char_count, scroll_percent) = match report {
            ProgressReport::Characters {
                explored_char_count,
                chapter_char_count,
                ..
            } => (explored_char_count, chapter_char_count, None),
            ProgressReport::ScrollPercent { percent, .. } => {
                let percent = percent.clamp(0.0, 1.0);
                let explored = (known_total as f64 * percent).round() as usize;
                (explored, known_total, Some(percent))
            }
        };

        let record = ReadingProgress {
            book_id: self.book_id.clone(),
            chapter_index,
            explored_char_count,
            chapter_char_count,
            progress: book_progress(&self.chapter_char_counts, chapter_index, explored_char_count),
            scroll_percent,
            last_read: SystemTime::now(),
        };
        debug!(
            "Progress for {}: chapter {} at {}/{} ({:.1}%)",
            record.book_id,
            chapter_index,
            explored_char_count,
            chapter_char_count,
            record.progress * 100.0
        );
        self.store.save(record.clone());
        record
    }

    pub fn forget(&mut self) -> Option<ReadingProgress> {
        self.store.remove(&self.book_id)
    }
}
