use clap::Parser;
use std::{fs::File, path::PathBuf, sync::Mutex};
use tracing::Level;
use yomu::{
    App, Book, CharacterCounter, Flow, MemoryProgressStore, ReaderConfig, ReadingSession,
    constants::TERMINAL_PAGE_GAP, progress::ProgressMode,
};

#[derive(Parser)]
#[command(name = "yomu")]
#[command(about = "A terminal reader for Japanese XHTML chapters")]
struct Cli {
    /// Chapter files in reading order
    #[arg(required = true)]
    chapters: Vec<PathBuf>,

    /// Vertical right-to-left text
    #[arg(long)]
    vertical: bool,

    /// Gap between pages, in lines
    #[arg(long, default_value_t = TERMINAL_PAGE_GAP)]
    gap: f64,

    /// Track progress as a scroll percentage instead of characters
    #[arg(long)]
    scroll_percent: bool,

    /// Count ASCII letters toward progress
    #[arg(long)]
    count_ascii: bool,

    /// Print per-chapter character counts and exit
    #[arg(long)]
    stats: bool,

    /// Write logs to this file
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short)]
    verbose: bool,
}

fn init_logging(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = cli.log.as_ref() else {
        return Ok(());
    };
    let file = File::create(path)?;
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_max_level(level)
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = ReaderConfig {
        flow: if cli.vertical {
            Flow::vertical_rl()
        } else {
            Flow::horizontal_tb()
        },
        page_gap: cli.gap.max(0.0),
        progress_mode: if cli.scroll_percent {
            ProgressMode::ScrollPercent
        } else {
            ProgressMode::CharCount
        },
        count_ascii_letters: cli.count_ascii,
        ..ReaderConfig::default()
    };

    let counter = CharacterCounter::with_config(config.counter_config());
    let book = Book::open(&cli.chapters, counter)
        .map_err(|e| format!("Failed to open chapters: {}", e))?;

    if cli.stats {
        println!("{}", book.title);
        for (i, count) in book.chapter_char_counts().iter().enumerate() {
            println!(
                "{:>3}  {:>8}  {}",
                i + 1,
                count,
                book.chapter_title(i).unwrap_or_default()
            );
        }
        println!("     {:>8}  total", book.book_char_count());
        return Ok(());
    }

    let session = ReadingSession::open(book, config, MemoryProgressStore::new())?;
    let mut app = App::new(session);

    app.run()
        .map_err(|e| -> Box<dyn std::error::Error> { Box::new(e) })?;

    Ok(())
}
