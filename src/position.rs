//! Monotonic mapping between layout positions and accumulated character counts.

use crate::{
    document::NodeId,
    geometry::{Flow, FlowTransform, Layout},
    nodes::CountableNode,
    search::{binary_search_floor, binary_search_lower_bound},
};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PositionIndex {
    transform: FlowTransform,
    node_ids: Vec<NodeId>,
    accumulated_char_count: Vec<usize>,
    physical_pos: Vec<f64>,
    max_count_at_pos: HashMap<u64, usize>,
}

fn position_key(pos: f64) -> u64 {
    // folds -0.0 onto 0.0
    (pos + 0.0).to_bits()
}

impl PositionIndex {
    /// An index with no nodes; every lookup returns 0.
    pub fn empty(flow: Flow) -> Self {
        Self {
            transform: flow.transform(),
            node_ids: Vec::new(),
            accumulated_char_count: Vec::new(),
            physical_pos: Vec::new(),
            max_count_at_pos: HashMap::new(),
        }
    }

    /// `scroll_position` is the view's current virtual scroll position.
    pub fn build<L: Layout + ?Sized>(
        nodes: &[CountableNode],
        layout: &L,
        flow: Flow,
        scroll_position: f64,
    ) -> Self {
        let mut index = Self::empty(flow);
        let mut total = 0usize;
        index.accumulated_char_count.reserve(nodes.len());
        for node in nodes {
            total += node.char_count;
            index.accumulated_char_count.push(total);
            index.node_ids.push(node.id);
        }
        index.update_positions(layout, scroll_position);
        index
    }

    // no nodes to re-measure: update_positions leaves this index alone
    pub fn from_samples<I>(samples: I, flow: Flow) -> Self
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        let mut index = Self::empty(flow);
        let mut total = 0usize;
        for (count, pos) in samples {
            total += count;
            index.accumulated_char_count.push(total);
            index.physical_pos.push(pos);
        }
        index.rebuild_tie_map();
        index
    }

    /// Re-measures every node after a relayout. Unmeasurable nodes reuse the
    /// previous position; a leading one sits at 0.
    pub fn update_positions<L: Layout + ?Sized>(&mut self, layout: &L, scroll_position: f64) {
        if self.node_ids.is_empty() {
            return;
        }

        let t = self.transform;
        let container = layout.container_box();
        let container_edge = t.to_virtual(t.leading_edge(&container));
        let padding = layout.content_padding(t.axis());

        let mut positions = Vec::with_capacity(self.node_ids.len());
        let mut previous = 0.0;
        let mut reused = 0usize;
        for &id in &self.node_ids {
            let pos = match layout.bounding_box(id) {
                Some(rect) if !rect.is_degenerate() => {
                    t.to_virtual(t.leading_edge(&rect)) - container_edge - padding + scroll_position
                }
                _ => {
                    reused += 1;
                    previous
                }
            };
            positions.push(pos);
            previous = pos;
        }

        self.physical_pos = positions;
        self.rebuild_tie_map();
        debug!(
            "Position index built: {} nodes, {} characters, {} degenerate measurements reused",
            self.node_ids.len(),
            self.total_char_count(),
            reused
        );
    }

    fn rebuild_tie_map(&mut self) {
        self.max_count_at_pos.clear();
        for (&pos, &count) in self.physical_pos.iter().zip(&self.accumulated_char_count) {
            let entry = self.max_count_at_pos.entry(position_key(pos)).or_insert(count);
            *entry = (*entry).max(count);
        }
    }

    pub fn flow(&self) -> Flow {
        self.transform.flow()
    }

    pub fn len(&self) -> usize {
        self.accumulated_char_count.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accumulated_char_count.is_empty()
    }

    pub fn total_char_count(&self) -> usize {
        self.accumulated_char_count.last().copied().unwrap_or(0)
    }

    pub fn accumulated_char_counts(&self) -> &[usize] {
        &self.accumulated_char_count
    }

    pub fn positions(&self) -> &[f64] {
        &self.physical_pos
    }

    /// Characters read once the view's leading edge is at `pos`.
    pub fn char_count_at_position(&self, pos: f64) -> usize {
        let Some(idx) = binary_search_floor(&self.physical_pos, pos) else {
            return 0;
        };
        let node_pos = self.physical_pos[idx];
        self.max_count_at_pos
            .get(&position_key(node_pos))
            .copied()
            .unwrap_or(self.accumulated_char_count[idx])
    }

    /// Virtual position to restore `count`. Reading it back never exceeds
    /// `count`; counts inside the first plateau land ahead of the first node.
    pub fn position_at_char_count(&self, count: usize) -> f64 {
        let Some(idx) = binary_search_floor(&self.accumulated_char_count, count) else {
            return self.before_first_node();
        };
        let pos = self.physical_pos[idx];
        let Some(&next) = self.physical_pos.get(idx + 1) else {
            return pos;
        };
        if pos < next {
            return pos;
        }

        // back off past the plateau the node shares with later nodes
        binary_search_lower_bound(&self.physical_pos, next)
            .and_then(|plateau_start| plateau_start.checked_sub(1))
            .map(|before| self.physical_pos[before])
            .unwrap_or_else(|| self.before_first_node())
    }

    fn before_first_node(&self) -> f64 {
        self.physical_pos
            .first()
            .map_or(0.0, |&first| first.min(0.0) - 1.0)
    }

    pub fn scroll_offset_at_char_count(&self, count: usize) -> f64 {
        self.transform
            .to_physical(self.position_at_char_count(count).max(0.0))
    }
}
