//! Rendered-tree model for a single chapter.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. The tree is built
//! either programmatically or by parsing chapter XHTML, and is read-only once
//! handed to the pagination engine.

use crate::{
    constants::{ANNOTATION_TAG, GAIJI_CLASS_MARKER, MAX_CHAPTER_SIZE},
    error::DocumentError,
};
use quick_xml::{Reader, events::Event};
use std::{fs, path::Path};
use tracing::{debug, warn};

/// Opaque reference into a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: Option<NodeId>,
}

impl Document {
    /// A document with no tree at all. Every walk over it yields nothing.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(name: &str) -> Self {
        let mut doc = Self::new();
        let root = doc.push(
            NodeKind::Element {
                name: name.to_ascii_lowercase(),
                attributes: Vec::new(),
            },
            None,
        );
        doc.root = Some(root);
        doc
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// The subtree readers actually see: `<body>` when present, else the root.
    pub fn content_root(&self) -> Option<NodeId> {
        let root = self.root?;
        self.find_element(root, "body").or(Some(root))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn append_element(&mut self, parent: NodeId, name: &str, attributes: &[(&str, &str)]) -> NodeId {
        let kind = NodeKind::Element {
            name: name.to_ascii_lowercase(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
                .collect(),
        };
        self.push(kind, Some(parent))
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()), Some(parent))
    }

    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|n| &n.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { name, .. } => Some(name),
            NodeKind::Text(_) => None,
        }
    }

    pub fn attribute(&self, id: NodeId, key: &str) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    /// Raw text of a text node; `None` for elements.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    /// Concatenated text of `id` and all of its descendants, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            match self.kind(current) {
                Some(NodeKind::Text(text)) => out.push_str(text),
                Some(NodeKind::Element { .. }) => {
                    stack.extend(self.children(current).iter().rev().copied());
                }
                None => {}
            }
        }
        out
    }

    pub fn has_class_containing(&self, id: NodeId, needle: &str) -> bool {
        self.attribute(id, "class")
            .map(|classes| classes.split_whitespace().any(|c| c.contains(needle)))
            .unwrap_or(false)
    }

    pub fn is_element(&self, id: NodeId, name: &str) -> bool {
        self.tag_name(id)
            .map(|tag| tag.eq_ignore_ascii_case(name))
            .unwrap_or(false)
    }

    /// Pronunciation annotation (ruby text).
    pub fn is_annotation(&self, id: NodeId) -> bool {
        self.is_element(id, ANNOTATION_TAG)
    }

    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.attribute(id, "hidden").is_some() || self.attribute(id, "aria-hidden").is_some()
    }

    /// An embedded bitmap standing in for a character the font cannot render.
    pub fn is_gaiji(&self, id: NodeId) -> bool {
        self.is_element(id, "img") && self.has_class_containing(id, GAIJI_CLASS_MARKER)
    }

    fn find_element(&self, from: NodeId, name: &str) -> Option<NodeId> {
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            if self.is_element(current, name) {
                return Some(current);
            }
            stack.extend(self.children(current).iter().rev().copied());
        }
        None
    }

    /// Title from `<title>`, then the first `<h1>`/`<h2>`.
    pub fn title(&self) -> Option<String> {
        let root = self.root?;
        ["title", "h1", "h2"].iter().find_map(|tag| {
            let node = self.find_element(root, tag)?;
            let text = self.text_content(node);
            let text = text.trim();
            if text.is_empty() || text.chars().count() >= 100 {
                None
            } else {
                Some(text.to_string())
            }
        })
    }
}

impl Document {
    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        let size = fs::metadata(path)?.len();
        if size > MAX_CHAPTER_SIZE {
            warn!("Chapter {:?} exceeds size limit: {} bytes", path, size);
            return Err(DocumentError::ChapterTooLarge {
                size,
                max: MAX_CHAPTER_SIZE,
            });
        }

        let bytes = fs::read(path)?;
        let source = String::from_utf8(bytes)?;
        debug!("Parsing chapter {:?} ({} bytes)", path, size);
        Self::parse(&source)
    }

    /// Parses well-formed chapter XHTML. Mismatched end tags close the
    /// innermost open element rather than failing.
    pub fn parse(source: &str) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(false);
        reader.config_mut().check_end_names = false;

        let mut doc = Document::new();
        let mut open: Vec<NodeId> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let id = doc.push_element(&e, open.last().copied())?;
                    open.push(id);
                }
                Event::Empty(e) => {
                    doc.push_element(&e, open.last().copied())?;
                }
                Event::End(_) => {
                    open.pop();
                }
                Event::Text(text) => {
                    if let Some(&parent) = open.last() {
                        let decoded = match text.unescape_with(resolve_entity) {
                            Ok(decoded) => decoded.into_owned(),
                            Err(_) => std::str::from_utf8(&text)?.to_string(),
                        };
                        if !decoded.is_empty() {
                            doc.append_text(parent, &decoded);
                        }
                    }
                }
                Event::CData(data) => {
                    if let Some(&parent) = open.last() {
                        let decoded = String::from_utf8(data.into_inner().into_owned())?;
                        doc.append_text(parent, &decoded);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(doc)
    }

    fn push_element(
        &mut self,
        start: &quick_xml::events::BytesStart<'_>,
        parent: Option<NodeId>,
    ) -> Result<NodeId, DocumentError> {
        let name = String::from_utf8(start.local_name().as_ref().to_vec())?.to_ascii_lowercase();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8(attr.key.local_name().as_ref().to_vec())?;
            let value = String::from_utf8(attr.value.to_vec())?;
            attributes.push((key.to_ascii_lowercase(), value));
        }

        let kind = NodeKind::Element { name, attributes };
        let id = self.push(kind, parent);
        if parent.is_none() && self.root.is_none() {
            self.root = Some(id);
        }
        Ok(id)
    }
}

fn resolve_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "lt" => Some("<"),
        "gt" => Some(">"),
        "amp" => Some("&"),
        "apos" => Some("'"),
        "quot" => Some("\""),
        "nbsp" => Some("\u{a0}"),
        "ensp" => Some("\u{2002}"),
        "emsp" => Some("\u{2003}"),
        "thinsp" => Some("\u{2009}"),
        "hellip" => Some("\u{2026}"),
        "mdash" => Some("\u{2014}"),
        "ndash" => Some("\u{2013}"),
        "laquo" => Some("\u{ab}"),
        "raquo" => Some("\u{bb}"),
        _ => None,
    }
}
