//! Writing-flow coordinates and the layout collaborator contract.

use crate::document::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

/// Which way "forward" runs along the primary axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowDirection {
    #[default]
    LeftToRight,
    RightToLeft,
}

/// Primary axis and forward direction of a reading view. Vertical Japanese
/// text paginates along the horizontal axis, right to left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flow {
    pub axis: Axis,
    pub direction: FlowDirection,
}

impl Flow {
    pub const fn new(axis: Axis, direction: FlowDirection) -> Self {
        Self { axis, direction }
    }

    pub const fn vertical_rl() -> Self {
        Self::new(Axis::Horizontal, FlowDirection::RightToLeft)
    }

    pub const fn horizontal_tb() -> Self {
        Self::new(Axis::Vertical, FlowDirection::LeftToRight)
    }

    pub fn transform(self) -> FlowTransform {
        let sign = match self.direction {
            FlowDirection::LeftToRight => 1.0,
            FlowDirection::RightToLeft => -1.0,
        };
        FlowTransform { flow: self, sign }
    }
}

// Virtual positions grow forward from 0; physical values are the surface's.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowTransform {
    flow: Flow,
    sign: f64,
}

impl FlowTransform {
    pub fn flow(&self) -> Flow {
        self.flow
    }

    pub fn axis(&self) -> Axis {
        self.flow.axis
    }

    pub fn sign(&self) -> f64 {
        self.sign
    }

    pub fn leading_edge(&self, rect: &NodeBox) -> f64 {
        if self.sign > 0.0 { rect.start } else { rect.end }
    }

    pub fn to_virtual(&self, physical: f64) -> f64 {
        self.sign * physical
    }

    pub fn to_physical(&self, virtual_pos: f64) -> f64 {
        self.sign * virtual_pos
    }

    pub fn content_offset(&self, virtual_delta: f64) -> f64 {
        -self.sign * virtual_delta
    }
}

/// Geometry of a node along the primary axis, relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeBox {
    pub start: f64,
    pub end: f64,
    pub primary_extent: f64,
    pub cross_extent: f64,
}

impl NodeBox {
    pub fn new(start: f64, end: f64, cross_extent: f64) -> Self {
        Self {
            start,
            end,
            primary_extent: end - start,
            cross_extent,
        }
    }

    /// Zero cross extent: the surface could not size this node.
    pub fn is_degenerate(&self) -> bool {
        self.cross_extent == 0.0
    }
}

/// Geometry and scroll control supplied by the rendering surface.
pub trait Layout {
    /// `None` when the node is not rendered; treated like degenerate geometry.
    fn bounding_box(&self, node: NodeId) -> Option<NodeBox>;

    /// The scroll container itself, in the same coordinate space as nodes.
    fn container_box(&self) -> NodeBox;

    fn content_padding(&self, _axis: Axis) -> f64 {
        0.0
    }

    fn viewport_extent(&self, axis: Axis) -> f64;

    fn scroll_extent(&self, axis: Axis) -> f64;

    fn scroll_offset(&self, axis: Axis) -> f64;

    fn set_scroll_offset(&mut self, axis: Axis, value: f64);

    fn set_content_transform(&mut self, offset: f64);

    fn clear_content_transform(&mut self);
}
