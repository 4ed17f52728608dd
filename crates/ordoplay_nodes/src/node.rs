// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node records.
//!
//! A node keeps two kinds of state. Cross-frame state (`origin`, `name`,
//! `content_rect`, `title_size`) survives between frames and drives
//! hit-testing and persistence. Per-frame scratch (`attribute_rects`,
//! `labels`) is rebuilt during declaration and cleared when the frame ends.

use crate::pool::PoolRecord;
use crate::style::{ColorStyle, Style};
use egui::{Color32, Pos2, Rect, Vec2};

/// Longest node name kept, in characters
pub const NODE_NAME_MAX_CHARS: usize = 31;

/// Origin given to nodes that have never been positioned
pub const DEFAULT_NODE_ORIGIN: Pos2 = Pos2::new(100.0, 100.0);

/// Colors a node is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeColors {
    /// Body fill
    pub background: Color32,
    /// Body fill while hovered
    pub background_hovered: Color32,
    /// Body fill while selected
    pub background_selected: Color32,
    /// Body outline
    pub outline: Color32,
    /// Title bar fill
    pub titlebar: Color32,
    /// Title bar fill while hovered
    pub titlebar_hovered: Color32,
    /// Title bar fill while selected
    pub titlebar_selected: Color32,
}

impl NodeColors {
    /// Capture the node colors of the current style
    pub fn from_style(style: &Style) -> Self {
        let colors = &style.colors;
        Self {
            background: colors.get(ColorStyle::NodeBackground),
            background_hovered: colors.get(ColorStyle::NodeBackgroundHovered),
            background_selected: colors.get(ColorStyle::NodeBackgroundSelected),
            outline: colors.get(ColorStyle::NodeOutline),
            titlebar: colors.get(ColorStyle::TitleBar),
            titlebar_hovered: colors.get(ColorStyle::TitleBarHovered),
            titlebar_selected: colors.get(ColorStyle::TitleBarSelected),
        }
    }
}

/// A line of text laid out inside a node this frame
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLabel {
    /// Top-left corner in editor space
    pub position: Pos2,
    /// Text to draw
    pub text: String,
}

/// A node in the editor
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Caller-supplied node id
    pub id: i32,
    /// Title shown in the title bar
    pub name: String,
    /// Top-left corner in editor space
    pub origin: Pos2,
    /// Bounds of the node content in editor space, from the last declaration
    pub content_rect: Rect,
    /// Measured size of the title text
    pub title_size: Vec2,
    /// Attribute bounds in editor space, rebuilt every frame
    pub attribute_rects: Vec<Rect>,
    /// Text rows laid out this frame
    pub labels: Vec<NodeLabel>,
    /// Colors captured at declaration
    pub colors: NodeColors,
}

impl Default for NodeData {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            origin: DEFAULT_NODE_ORIGIN,
            content_rect: Rect::from_min_size(DEFAULT_NODE_ORIGIN, Vec2::ZERO),
            title_size: Vec2::ZERO,
            attribute_rects: Vec::new(),
            labels: Vec::new(),
            colors: NodeColors::default(),
        }
    }
}

impl NodeData {
    /// Set the title, keeping at most [`NODE_NAME_MAX_CHARS`] characters.
    ///
    /// Returns `false` if the name had to be truncated.
    pub fn set_name(&mut self, name: &str) -> bool {
        self.name.clear();
        match name.char_indices().nth(NODE_NAME_MAX_CHARS) {
            Some((cut, _)) => {
                self.name.push_str(&name[..cut]);
                false
            }
            None => {
                self.name.push_str(name);
                true
            }
        }
    }

    /// Where the first content row starts, in editor space
    pub fn content_origin(&self, padding: Vec2, line_height: f32) -> Pos2 {
        self.origin + padding + Vec2::new(0.0, line_height + 2.0 * padding.y)
    }

    /// Height of the title bar
    pub fn title_bar_height(&self, padding: Vec2) -> f32 {
        self.title_size.y + 2.0 * padding.y
    }

    /// Full node bounds in editor space: content widened to the title,
    /// padded, with the title bar on top
    pub fn rect(&self, padding: Vec2) -> Rect {
        let mut content = self.content_rect;
        content.max.x = content.max.x.max(content.min.x + self.title_size.x);
        let mut rect = content.expand2(padding);
        rect.min.y -= self.title_bar_height(padding);
        rect
    }

    /// Title bar bounds in editor space
    pub fn title_bar_rect(&self, padding: Vec2) -> Rect {
        let rect = self.rect(padding);
        Rect::from_min_max(
            rect.min,
            Pos2::new(rect.max.x, rect.min.y + self.title_bar_height(padding)),
        )
    }

    /// Drop the per-frame scratch data
    pub fn clear_frame_data(&mut self) {
        self.attribute_rects.clear();
        self.labels.clear();
    }
}

impl PoolRecord for NodeData {
    fn id(&self) -> i32 {
        self.id
    }

    fn set_id(&mut self, id: i32) {
        self.id = id;
    }
}
