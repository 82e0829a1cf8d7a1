pub mod book;
pub mod config;
pub mod constants;
pub mod count;
pub mod document;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod navigator;
pub mod nodes;
pub mod position;
pub mod progress;
pub mod search;
pub mod session;
pub mod stability;
pub mod ui;

pub use book::{Book, Chapter};
pub use config::ReaderConfig;
pub use count::{CharacterCounter, CounterConfig};
pub use document::{Document, NodeId};
pub use error::{DocumentError, UiError};
pub use geometry::{Axis, Flow, FlowDirection, Layout, NodeBox};
pub use navigator::{FlipOutcome, PageNavigator, SectionNavigator};
pub use position::PositionIndex;
pub use progress::{MemoryProgressStore, ProgressStore, ReadingProgress};
pub use session::ReadingSession;
pub use ui::App;
