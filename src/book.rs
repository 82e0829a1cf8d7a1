use crate::{
    constants::CHAPTER_CACHE_SIZE,
    count::CharacterCounter,
    document::Document,
    error::DocumentError,
    nodes::collect_countable_nodes,
};
use lru::LruCache;
use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct Chapter {
    pub index: usize,
    pub title: String,
    pub document: Document,
    pub char_count: usize,
}

#[derive(Debug, Clone)]
enum ChapterSource {
    File(PathBuf),
    Inline(String),
}

#[derive(Debug, Clone)]
struct ChapterInfo {
    title: String,
    char_count: usize,
}

/// An ordered list of chapter documents, the unit of section navigation.
#[derive(Debug)]
pub struct Book {
    id: String,
    pub title: String,
    sources: Vec<ChapterSource>,
    chapter_info: Vec<ChapterInfo>,
    chapter_cache: Mutex<LruCache<usize, Arc<Chapter>>>,
    counter: CharacterCounter,
}

impl Book {
    pub fn open(paths: &[PathBuf], counter: CharacterCounter) -> Result<Self, DocumentError> {
        info!("Opening {} chapter files", paths.len());
        let id = Self::derive_id(paths);
        let sources = paths.iter().cloned().map(ChapterSource::File).collect();
        Self::from_sources(id, sources, counter)
    }

    pub fn from_xhtml(
        id: impl Into<String>,
        chapters: Vec<String>,
        counter: CharacterCounter,
    ) -> Result<Self, DocumentError> {
        let sources = chapters.into_iter().map(ChapterSource::Inline).collect();
        Self::from_sources(id.into(), sources, counter)
    }

    fn from_sources(
        id: String,
        sources: Vec<ChapterSource>,
        counter: CharacterCounter,
    ) -> Result<Self, DocumentError> {
        if sources.is_empty() {
            return Err(DocumentError::NoChapters);
        }

        let mut chapter_info = Vec::with_capacity(sources.len());
        let mut book_title = None;
        for (index, source) in sources.iter().enumerate() {
            let document = Self::load_source(source)?;
            let char_count: usize = collect_countable_nodes(&document, &counter)
                .iter()
                .map(|n| n.char_count)
                .sum();
            let title = document
                .title()
                .unwrap_or_else(|| format!("Chapter {}", index + 1));
            if char_count == 0 {
                warn!("Chapter {} ({}) has no countable characters", index, title);
            }
            book_title.get_or_insert_with(|| title.clone());
            chapter_info.push(ChapterInfo { title, char_count });
        }

        info!(
            "Loaded book {} with {} chapters, {} characters",
            id,
            chapter_info.len(),
            chapter_info.iter().map(|c| c.char_count).sum::<usize>()
        );

        let cache_size = NonZeroUsize::new(CHAPTER_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN);
        Ok(Book {
            title: book_title.unwrap_or_else(|| id.clone()),
            id,
            sources,
            chapter_info,
            chapter_cache: Mutex::new(LruCache::new(cache_size)),
            counter,
        })
    }

    fn derive_id(paths: &[PathBuf]) -> String {
        let stem = |p: &Path| p.file_stem().map(|s| s.to_string_lossy().into_owned());
        match paths {
            [single] => stem(single.as_path()),
            [first, ..] => first
                .parent()
                .and_then(|dir| dir.file_name())
                .map(|s| s.to_string_lossy().into_owned())
                .or_else(|| stem(first.as_path())),
            [] => None,
        }
        .unwrap_or_else(|| "book".to_string())
    }

    fn load_source(source: &ChapterSource) -> Result<Document, DocumentError> {
        match source {
            ChapterSource::File(path) => Document::open(path),
            ChapterSource::Inline(xhtml) => Document::parse(xhtml),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn counter(&self) -> &CharacterCounter {
        &self.counter
    }

    pub fn chapter_count(&self) -> usize {
        self.chapter_info.len()
    }

    pub fn chapter_title(&self, index: usize) -> Option<&str> {
        self.chapter_info.get(index).map(|c| c.title.as_str())
    }

    pub fn chapter_char_counts(&self) -> Vec<usize> {
        self.chapter_info.iter().map(|c| c.char_count).collect()
    }

    pub fn book_char_count(&self) -> usize {
        self.chapter_info.iter().map(|c| c.char_count).sum()
    }

    pub fn get_chapter(&self, index: usize) -> Result<Arc<Chapter>, DocumentError> {
        if index >= self.chapter_info.len() {
            return Err(DocumentError::InvalidChapterIndex(index));
        }

        {
            let mut cache = self
                .chapter_cache
                .lock()
                .map_err(|_| DocumentError::CacheLockError)?;

            if let Some(chapter) = cache.get(&index) {
                debug!("Chapter {} loaded from cache", index);
                return Ok(Arc::clone(chapter));
            }
        }

        debug!("Loading chapter {} from source", index);
        let info = &self.chapter_info[index];
        let chapter = Arc::new(Chapter {
            index,
            title: info.title.clone(),
            document: Self::load_source(&self.sources[index])?,
            char_count: info.char_count,
        });

        {
            let mut cache = self
                .chapter_cache
                .lock()
                .map_err(|_| DocumentError::CacheLockError)?;
            cache.put(index, Arc::clone(&chapter));
        }

        Ok(chapter)
    }
}
