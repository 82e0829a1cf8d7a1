use std::fmt;

#[derive(Debug)]
pub enum DocumentError {
    Io(std::io::Error),
    Xml(quick_xml::Error),
    Utf8(std::str::Utf8Error),
    ChapterTooLarge { size: u64, max: u64 },
    InvalidChapterIndex(usize),
    NoChapters,
    CacheLockError,
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Io(err) => write!(f, "IO error: {}", err),
            DocumentError::Xml(err) => write!(f, "XHTML parsing error: {}", err),
            DocumentError::Utf8(err) => write!(f, "UTF-8 encoding error: {}", err),
            DocumentError::ChapterTooLarge { size, max } => {
                write!(f, "Chapter too large: {} bytes (max: {} bytes)", size, max)
            }
            DocumentError::InvalidChapterIndex(idx) => {
                write!(f, "Invalid chapter index: {}", idx)
            }
            DocumentError::NoChapters => write!(f, "Book has no chapters"),
            DocumentError::CacheLockError => write!(f, "Failed to acquire chapter cache lock"),
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DocumentError::Io(err) => Some(err),
            DocumentError::Xml(err) => Some(err),
            DocumentError::Utf8(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DocumentError {
    fn from(err: std::io::Error) -> Self {
        DocumentError::Io(err)
    }
}

impl From<quick_xml::Error> for DocumentError {
    fn from(err: quick_xml::Error) -> Self {
        DocumentError::Xml(err)
    }
}

impl From<std::str::Utf8Error> for DocumentError {
    fn from(err: std::str::Utf8Error) -> Self {
        DocumentError::Utf8(err)
    }
}

impl From<std::string::FromUtf8Error> for DocumentError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        DocumentError::Utf8(err.utf8_error())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DocumentError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        DocumentError::Xml(quick_xml::Error::InvalidAttr(err))
    }
}

#[derive(Debug)]
pub enum UiError {
    Terminal(Box<dyn std::error::Error + Send + Sync>),
    Document(DocumentError),
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiError::Terminal(err) => write!(f, "Terminal error: {}", err),
            UiError::Document(err) => write!(f, "Document error: {}", err),
        }
    }
}

impl std::error::Error for UiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UiError::Terminal(err) => Some(err.as_ref()),
            UiError::Document(err) => Some(err),
        }
    }
}

impl From<DocumentError> for UiError {
    fn from(err: DocumentError) -> Self {
        UiError::Document(err)
    }
}

impl From<std::io::Error> for UiError {
    fn from(err: std::io::Error) -> Self {
        UiError::Terminal(Box::new(err))
    }
}
