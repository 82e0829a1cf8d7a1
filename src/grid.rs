//! Terminal cell-grid rendering surface.
//!
//! Lays a chapter out as lines of glyphs. Lines stack along the primary axis
//! one unit apart, so positions, extents and scroll offsets are all measured
//! in lines. With a vertical primary axis lines are rows (horizontal
//! writing); with a horizontal axis they are columns (vertical writing,
//! usually stacked right to left).

use crate::{
    constants::{DEFAULT_LINE_LENGTH, DEFAULT_PAGE_LINES, GAIJI_PLACEHOLDER},
    document::{Document, NodeId, NodeKind},
    geometry::{Axis, Flow, FlowTransform, Layout, NodeBox},
};
use std::collections::HashMap;
use unicode_segmentation::UnicodeSegmentation;

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure",
    "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p",
    "pre", "section", "table", "tr", "ul",
];

const SKIPPED_TAGS: &[&str] = &["head", "script", "style", "rp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    /// Slots per line: cells for rows, glyphs for columns.
    pub line_length: usize,
    /// Lines visible at once.
    pub page_lines: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            line_length: DEFAULT_LINE_LENGTH,
            page_lines: DEFAULT_PAGE_LINES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    pub text: String,
    pub width: usize,
}

#[derive(Debug, Clone, Copy)]
struct NodeSpan {
    first_line: usize,
    last_line: usize,
    slots: usize,
}

#[derive(Debug, Clone)]
pub struct GridLayout {
    transform: FlowTransform,
    config: GridConfig,
    lines: Vec<Vec<Glyph>>,
    spans: HashMap<NodeId, NodeSpan>,
    scroll: f64,
    shift: f64,
}

fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x3FFFD)
}

fn display_width(grapheme: &str) -> usize {
    if grapheme.chars().any(is_wide) { 2 } else { 1 }
}

struct Builder<'a> {
    doc: &'a Document,
    axis: Axis,
    line_length: usize,
    lines: Vec<Vec<Glyph>>,
    current: Vec<Glyph>,
    used: usize,
    spans: HashMap<NodeId, NodeSpan>,
}

impl Builder<'_> {
    fn slot_width(&self, glyph_width: usize) -> usize {
        match self.axis {
            Axis::Vertical => glyph_width,
            Axis::Horizontal => 1,
        }
    }

    fn break_line(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
            self.used = 0;
        }
    }

    fn hard_break(&mut self) {
        if self.current.is_empty() {
            self.lines.push(Vec::new());
        } else {
            self.break_line();
        }
    }

    fn push_glyph(&mut self, node: NodeId, text: String, width: usize) {
        let slots = self.slot_width(width);
        if self.used + slots > self.line_length && !self.current.is_empty() {
            self.break_line();
        }
        let line = self.lines.len();
        self.current.push(Glyph { text, width });
        self.used += slots;

        let span = self.spans.entry(node).or_insert(NodeSpan {
            first_line: line,
            last_line: line,
            slots: 0,
        });
        span.last_line = line;
        span.slots += slots;
    }

    fn push_text(&mut self, node: NodeId, text: &str) {
        let mut pending_space = false;
        for grapheme in text.graphemes(true) {
            if grapheme.chars().all(|c| c.is_ascii_whitespace()) {
                pending_space = true;
                continue;
            }
            if pending_space && self.used > 0 {
                self.push_glyph(node, " ".to_string(), 1);
            }
            pending_space = false;
            self.push_glyph(node, grapheme.to_string(), display_width(grapheme));
        }
    }

    fn visit(&mut self, node: NodeId) {
        let doc = self.doc;
        if doc.is_annotation(node) || doc.is_hidden(node) {
            return;
        }
        if doc.is_gaiji(node) {
            self.push_glyph(node, GAIJI_PLACEHOLDER.to_string(), 2);
            return;
        }
        match doc.kind(node) {
            Some(NodeKind::Text(text)) => self.push_text(node, text),
            Some(NodeKind::Element { name, .. }) => {
                let name = name.as_str();
                if SKIPPED_TAGS.contains(&name) {
                    return;
                }
                if name == "br" {
                    self.hard_break();
                    return;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    self.break_line();
                }
                for &child in doc.children(node) {
                    self.visit(child);
                }
                if block {
                    self.break_line();
                }
            }
            None => {}
        }
    }
}

impl GridLayout {
    pub fn new(doc: &Document, flow: Flow, config: GridConfig) -> Self {
        let mut builder = Builder {
            doc,
            axis: flow.axis,
            line_length: config.line_length.max(1),
            lines: Vec::new(),
            current: Vec::new(),
            used: 0,
            spans: HashMap::new(),
        };
        if let Some(root) = doc.content_root() {
            builder.visit(root);
        }
        builder.break_line();

        Self {
            transform: flow.transform(),
            config,
            lines: builder.lines,
            spans: builder.spans,
            scroll: 0.0,
            shift: 0.0,
        }
    }

    pub fn config(&self) -> GridConfig {
        self.config
    }

    pub fn flow(&self) -> Flow {
        self.transform.flow()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[Vec<Glyph>] {
        &self.lines
    }

    /// First visible line, including any content offset.
    pub fn view_start(&self) -> f64 {
        self.scroll + self.shift
    }

    fn max_scroll(&self) -> f64 {
        (self.lines.len() as f64 - self.config.page_lines as f64).max(0.0)
    }

    pub fn visible_lines(&self) -> &[Vec<Glyph>] {
        let start = (self.view_start().max(0.0) as usize).min(self.lines.len());
        let end = (start + self.config.page_lines).min(self.lines.len());
        &self.lines[start..end]
    }

    /// Visible page as terminal rows, left to right, top to bottom.
    pub fn page_rows(&self) -> Vec<String> {
        let visible = self.visible_lines();
        let reversed = self.transform.sign() < 0.0;
        match self.transform.axis() {
            Axis::Vertical => {
                let mut rows: Vec<String> = visible
                    .iter()
                    .map(|line| line.iter().map(|g| g.text.as_str()).collect())
                    .collect();
                if reversed {
                    rows.reverse();
                }
                rows
            }
            Axis::Horizontal => {
                let mut columns: Vec<&Vec<Glyph>> = visible.iter().collect();
                if reversed {
                    columns.reverse();
                }
                (0..self.config.line_length)
                    .map(|row| {
                        columns
                            .iter()
                            .map(|column| match column.get(row) {
                                Some(glyph) if glyph.width >= 2 => glyph.text.clone(),
                                Some(glyph) => format!("{} ", glyph.text),
                                None => "  ".to_string(),
                            })
                            .collect::<String>()
                    })
                    .collect()
            }
        }
    }
}

impl Layout for GridLayout {
    fn bounding_box(&self, node: NodeId) -> Option<NodeBox> {
        let span = self.spans.get(&node)?;
        let view = self.view_start();
        let first = span.first_line as f64 - view;
        let last = (span.last_line + 1) as f64 - view;
        let cross = span.slots as f64;
        if self.transform.sign() > 0.0 {
            Some(NodeBox::new(first, last, cross))
        } else {
            let width = self.config.page_lines as f64;
            Some(NodeBox::new(width - last, width - first, cross))
        }
    }

    fn container_box(&self) -> NodeBox {
        NodeBox::new(
            0.0,
            self.config.page_lines as f64,
            self.config.line_length as f64,
        )
    }

    fn viewport_extent(&self, axis: Axis) -> f64 {
        if axis == self.transform.axis() {
            self.config.page_lines as f64
        } else {
            self.config.line_length as f64
        }
    }

    fn scroll_extent(&self, axis: Axis) -> f64 {
        if axis == self.transform.axis() {
            self.lines.len() as f64
        } else {
            self.config.line_length as f64
        }
    }

    fn scroll_offset(&self, axis: Axis) -> f64 {
        if axis == self.transform.axis() {
            self.transform.to_physical(self.scroll)
        } else {
            0.0
        }
    }

    fn set_scroll_offset(&mut self, axis: Axis, value: f64) {
        if axis == self.transform.axis() {
            self.scroll = self.transform.to_virtual(value).clamp(0.0, self.max_scroll());
        }
    }

    fn set_content_transform(&mut self, offset: f64) {
        self.shift = -self.transform.sign() * offset;
    }

    fn clear_content_transform(&mut self) {
        self.shift = 0.0;
    }
}
