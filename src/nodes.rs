use crate::{
    count::CharacterCounter,
    document::{Document, NodeId, NodeKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountableKind {
    Text,
    Gaiji,
}

/// A leaf unit of reading order. Rebuilt wholesale on every relayout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountableNode {
    pub id: NodeId,
    pub kind: CountableKind,
    pub char_count: usize,
}

fn is_excluded(doc: &Document, node: NodeId) -> bool {
    doc.is_annotation(node) || doc.is_hidden(node)
}

/// Walks the content root in document order and returns every non-blank text
/// run and glyph-image, skipping annotation and hidden subtrees.
///
/// Index order equals reading order; callers accumulate counts in a single
/// forward pass over the result.
pub fn collect_countable_nodes(doc: &Document, counter: &CharacterCounter) -> Vec<CountableNode> {
    let Some(root) = doc.content_root() else {
        return Vec::new();
    };
    if is_excluded(doc, root) {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = doc.children(root).iter().rev().copied().collect();

    while let Some(node) = stack.pop() {
        if is_excluded(doc, node) {
            continue;
        }
        if doc.is_gaiji(node) {
            out.push(CountableNode {
                id: node,
                kind: CountableKind::Gaiji,
                char_count: 1,
            });
            continue;
        }
        match doc.kind(node) {
            Some(NodeKind::Text(text)) => {
                if text.chars().any(|c| !c.is_whitespace()) {
                    out.push(CountableNode {
                        id: node,
                        kind: CountableKind::Text,
                        char_count: counter.count_text(text),
                    });
                }
            }
            Some(NodeKind::Element { .. }) => {
                stack.extend(doc.children(node).iter().rev().copied());
            }
            None => {}
        }
    }

    out
}
