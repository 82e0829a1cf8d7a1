#![allow(dead_code)]

use std::collections::HashMap;
use yomu::{Axis, Layout, NodeBox, NodeId};

/// Scripted layout surface: node boxes are set directly and scroll writes
/// are clamped the way a native scroll container clamps them.
#[derive(Debug, Clone)]
pub struct MockLayout {
    pub boxes: HashMap<NodeId, NodeBox>,
    pub container: NodeBox,
    pub padding: f64,
    pub viewport: f64,
    pub extent: f64,
    pub scroll: f64,
    pub transform: Option<f64>,
    /// Clamp to `[-max, 0]` instead of `[0, max]`, like an RTL container.
    pub negative_scroll: bool,
    pub scroll_writes: usize,
}

impl MockLayout {
    pub fn new(viewport: f64, extent: f64) -> Self {
        Self {
            boxes: HashMap::new(),
            container: NodeBox::new(0.0, viewport, viewport),
            padding: 0.0,
            viewport,
            extent,
            scroll: 0.0,
            transform: None,
            negative_scroll: false,
            scroll_writes: 0,
        }
    }

    pub fn right_to_left(viewport: f64, extent: f64) -> Self {
        Self {
            negative_scroll: true,
            ..Self::new(viewport, extent)
        }
    }

    /// Places `node` with its leading edge `start` (left-to-right) and the
    /// given extent along the primary axis.
    pub fn place(&mut self, node: NodeId, start: f64, extent: f64, cross: f64) {
        self.boxes.insert(node, NodeBox::new(start, start + extent, cross));
    }
}

impl Layout for MockLayout {
    fn bounding_box(&self, node: NodeId) -> Option<NodeBox> {
        self.boxes.get(&node).copied()
    }

    fn container_box(&self) -> NodeBox {
        self.container
    }

    fn content_padding(&self, _axis: Axis) -> f64 {
        self.padding
    }

    fn viewport_extent(&self, _axis: Axis) -> f64 {
        self.viewport
    }

    fn scroll_extent(&self, _axis: Axis) -> f64 {
        self.extent
    }

    fn scroll_offset(&self, _axis: Axis) -> f64 {
        self.scroll
    }

    fn set_scroll_offset(&mut self, _axis: Axis, value: f64) {
        let max = (self.extent - self.viewport).max(0.0);
        self.scroll = if self.negative_scroll {
            value.clamp(-max, 0.0)
        } else {
            value.clamp(0.0, max)
        };
        self.scroll_writes += 1;
    }

    fn set_content_transform(&mut self, offset: f64) {
        self.transform = Some(offset);
    }

    fn clear_content_transform(&mut self) {
        self.transform = None;
    }
}

pub const CHAPTER_ONE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>第一章</title></head>
<body>
<h1>第一章</h1>
<p>吾輩は猫である。名前はまだ無い。</p>
<p>どこで生れたかとんと見当がつかぬ。</p>
</body>
</html>"#;

pub const CHAPTER_TWO: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>第二章</title></head>
<body>
<p>何でも薄暗いじめじめした所で<ruby>泣<rt>な</rt></ruby>いていた事だけは記憶している。</p>
</body>
</html>"#;
