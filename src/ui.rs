use crate::constants::{FOOTER_HEIGHT, HEADER_HEIGHT};
use crate::error::UiError;
use crate::geometry::{Axis, Flow, FlowDirection};
use crate::grid::GridConfig;
use crate::session::ReadingSession;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph},
};
use std::{
    io,
    time::{Duration, Instant},
};
use tracing::debug;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
// borders plus horizontal padding around the page
const CONTENT_CHROME_WIDTH: u16 = 5;
const CONTENT_CHROME_HEIGHT: u16 = 2;

#[derive(Debug)]
enum FloatingPane {
    None,
    Contents { selected_index: usize },
}

/// Which page a key asks for, once the writing direction is accounted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKey {
    Next,
    Previous,
}

/// Maps arrow keys onto page turns. In right-to-left text the left arrow
/// reads forward.
pub fn page_key(flow: Flow, code: KeyCode) -> Option<PageKey> {
    let rtl = flow.direction == FlowDirection::RightToLeft;
    match code {
        KeyCode::PageDown | KeyCode::Char(' ') => Some(PageKey::Next),
        KeyCode::PageUp | KeyCode::Char('b') => Some(PageKey::Previous),
        KeyCode::Left if rtl => Some(PageKey::Next),
        KeyCode::Right if rtl => Some(PageKey::Previous),
        KeyCode::Right | KeyCode::Down => Some(PageKey::Next),
        KeyCode::Left | KeyCode::Up => Some(PageKey::Previous),
        _ => None,
    }
}

/// Grid dimensions for a terminal of `width` x `height` cells.
pub fn grid_config_for(flow: Flow, width: u16, height: u16) -> GridConfig {
    let content_width = width.saturating_sub(CONTENT_CHROME_WIDTH) as usize;
    let content_height = height
        .saturating_sub(HEADER_HEIGHT + FOOTER_HEIGHT + CONTENT_CHROME_HEIGHT)
        as usize;
    match flow.axis {
        Axis::Vertical => GridConfig {
            line_length: content_width.max(2),
            page_lines: content_height.max(1),
        },
        // columns are two cells wide
        Axis::Horizontal => GridConfig {
            line_length: content_height.max(1),
            page_lines: (content_width / 2).max(1),
        },
    }
}

pub struct App {
    session: ReadingSession,
    floating_pane: FloatingPane,
    terminal_size: (u16, u16),
    terminal: Option<Terminal<CrosstermBackend<std::io::Stdout>>>,
}

impl App {
    pub fn new(session: ReadingSession) -> Self {
        Self {
            session,
            floating_pane: FloatingPane::None,
            terminal_size: (0, 0),
            terminal: None,
        }
    }

    pub fn session(&self) -> &ReadingSession {
        &self.session
    }

    pub fn is_contents_open(&self) -> bool {
        matches!(self.floating_pane, FloatingPane::Contents { .. })
    }

    pub fn run(&mut self) -> Result<(), UiError> {
        self.setup_terminal()?;
        let result = self.event_loop();
        self.cleanup_terminal()?;
        result
    }

    fn event_loop(&mut self) -> Result<(), UiError> {
        let size = match self.terminal.as_ref() {
            Some(terminal) => Some(terminal.size()?),
            None => None,
        };
        if let Some(size) = size {
            self.resize(size.width, size.height);
        }

        loop {
            self.session.poll_layout(Instant::now());

            if let Some(terminal) = self.terminal.as_mut() {
                let session = &self.session;
                let floating_pane = &self.floating_pane;
                terminal.draw(|f| Self::draw_ui(f, session, floating_pane))?;
            }

            if !event::poll(FRAME_INTERVAL)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) => {
                    if !self.handle_key(key)? {
                        break;
                    }
                }
                Event::Resize(width, height) => self.resize(width, height),
                _ => {}
            }
        }
        Ok(())
    }

    /// Applies one key press. Returns `false` when the reader should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool, UiError> {
        if self.handle_floating_pane_input(key)? {
            return Ok(true);
        }

        if let Some(page) = page_key(self.session.flow(), key.code) {
            match page {
                PageKey::Next => self.session.next_page()?,
                PageKey::Previous => self.session.prev_page()?,
            };
            return Ok(true);
        }

        match key.code {
            KeyCode::Char('q') => return Ok(false),
            KeyCode::Char('j') => self.session.scroll_lines(1.0),
            KeyCode::Char('k') => self.session.scroll_lines(-1.0),
            KeyCode::Home | KeyCode::Char('g') => {
                let index = self.session.chapter_index();
                self.session.go_to_chapter(index)?;
            }
            KeyCode::Char('v') => {
                self.session.toggle_flow();
                let (width, height) = self.terminal_size;
                self.resize(width, height);
            }
            KeyCode::Char('-') => self.open_contents_pane(),
            _ => {}
        }
        Ok(true)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
        if width == 0 || height == 0 {
            return;
        }
        debug!("Terminal resized to {}x{}", width, height);
        let grid = grid_config_for(self.session.flow(), width, height);
        self.session.resize(grid);
    }

    fn setup_terminal(&mut self) -> Result<(), UiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        self.terminal = Some(terminal);
        Ok(())
    }

    fn cleanup_terminal(&mut self) -> Result<(), UiError> {
        if let Some(mut terminal) = self.terminal.take() {
            disable_raw_mode()?;
            execute!(
                terminal.backend_mut(),
                LeaveAlternateScreen,
                DisableMouseCapture
            )?;
            terminal.show_cursor()?;
        }
        Ok(())
    }

    fn draw_ui(f: &mut Frame, session: &ReadingSession, floating_pane: &FloatingPane) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(f.area());

        let book = session.book();
        let chapter = session.chapter();
        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                book.title.as_str(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}/{}", chapter.index + 1, book.chapter_count()),
                Style::default().fg(Color::DarkGray),
            ),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Cyan))
                .padding(Padding::horizontal(1)),
        )
        .alignment(Alignment::Left);
        f.render_widget(header, chunks[0]);

        let lines: Vec<Line> = if session.is_settling() {
            vec![Line::from(Span::styled(
                "Laying out...",
                Style::default().fg(Color::DarkGray),
            ))]
        } else {
            session
                .layout()
                .page_rows()
                .into_iter()
                .map(Line::from)
                .collect()
        };
        let content = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Blue))
                    .title(format!("│ {} ", chapter.title))
                    .title_style(
                        Style::default()
                            .fg(Color::LightBlue)
                            .add_modifier(Modifier::BOLD),
                    )
                    .padding(Padding::new(2, 1, 0, 0)),
            )
            .style(Style::default().fg(Color::White));
        f.render_widget(content, chunks[1]);

        let progress = session.progress();
        let label = format!(
            "{}/{} chars · {:.1}%",
            session.explored_char_count(),
            chapter.char_count,
            progress * 100.0
        );
        let gauge = Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
            .percent((progress * 100.0).round().clamp(0.0, 100.0) as u16)
            .label(label);
        f.render_widget(gauge, chunks[2]);

        if let FloatingPane::Contents { selected_index } = floating_pane {
            Self::render_contents_pane(f, session, *selected_index);
        }
    }

    fn handle_floating_pane_input(&mut self, key: KeyEvent) -> Result<bool, UiError> {
        let floating_pane = std::mem::replace(&mut self.floating_pane, FloatingPane::None);
        let FloatingPane::Contents { mut selected_index } = floating_pane else {
            return Ok(false);
        };

        match key.code {
            KeyCode::Esc => {}
            KeyCode::Up => {
                selected_index = selected_index.saturating_sub(1);
                self.floating_pane = FloatingPane::Contents { selected_index };
            }
            KeyCode::Down => {
                if selected_index < self.session.book().chapter_count().saturating_sub(1) {
                    selected_index += 1;
                }
                self.floating_pane = FloatingPane::Contents { selected_index };
            }
            KeyCode::Enter => self.session.go_to_chapter(selected_index)?,
            _ => self.floating_pane = FloatingPane::Contents { selected_index },
        }
        Ok(true)
    }

    fn open_contents_pane(&mut self) {
        self.floating_pane = FloatingPane::Contents {
            selected_index: self.session.chapter_index(),
        };
    }

    fn render_contents_pane(f: &mut Frame, session: &ReadingSession, selected_index: usize) {
        let area = f.area();

        let popup_width = area.width.saturating_mul(60).saturating_div(100);
        let popup_height = area.height.saturating_mul(50).saturating_div(100);
        let x = area.width.saturating_sub(popup_width).saturating_div(2);
        let y = area.height.saturating_sub(popup_height).saturating_div(2);

        let popup_area = Rect {
            x,
            y,
            width: popup_width,
            height: popup_height,
        };
        f.render_widget(Clear, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(popup_area);

        let book = session.book();
        let counts = book.chapter_char_counts();
        let items: Vec<ListItem> = counts
            .iter()
            .enumerate()
            .map(|(i, count)| {
                let title = book.chapter_title(i).unwrap_or_default();
                ListItem::new(format!("{}: {} ({} chars)", i + 1, title, count))
            })
            .collect();

        let contents_list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::Blue))
                    .title(format!("Contents ({} chapters)", book.chapter_count()))
                    .style(Style::default().fg(Color::Blue)),
            )
            .style(Style::default().fg(Color::White))
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(Some(selected_index));
        f.render_stateful_widget(contents_list, chunks[0], &mut list_state);

        let help = Paragraph::new(Line::from(vec![
            Span::styled("↑↓", Style::default().fg(Color::Blue)),
            Span::raw(" navigate  "),
            Span::styled("Enter", Style::default().fg(Color::Blue)),
            Span::raw(" select  "),
            Span::styled("Esc", Style::default().fg(Color::Blue)),
            Span::raw(" close"),
        ]))
        .alignment(Alignment::Center);
        f.render_widget(help, chunks[1]);
    }
}
