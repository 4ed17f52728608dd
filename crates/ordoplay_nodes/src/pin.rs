// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pin records for node attributes.

use crate::pool::PoolRecord;
use crate::style::{ColorStyle, Style};
use egui::{Color32, Pos2, Rect};
use serde::{Deserialize, Serialize};

/// Which side of a node an attribute's pin sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttributeKind {
    /// Input pin, drawn on the left edge
    #[default]
    Input,
    /// Output pin, drawn on the right edge
    Output,
}

/// Colors a pin is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinColors {
    /// Fill color
    pub background: Color32,
    /// Fill color while hovered
    pub hovered: Color32,
    /// Outline color
    pub outline: Color32,
}

impl PinColors {
    /// Capture the pin colors of the current style
    pub fn from_style(style: &Style) -> Self {
        Self {
            background: style.colors.get(ColorStyle::Pin),
            hovered: style.colors.get(ColorStyle::PinHovered),
            outline: style.colors.get(ColorStyle::PinOutline),
        }
    }
}

/// A pin on one of a node's attributes
#[derive(Debug, Clone, Default)]
pub struct PinData {
    /// Caller-supplied pin id
    pub id: i32,
    /// Slot index of the owning node, valid for the frame it was declared in
    pub node_index: usize,
    /// Index into the owning node's attribute rectangles
    pub attribute_index: usize,
    /// Input or output
    pub kind: AttributeKind,
    /// Colors captured at declaration
    pub colors: PinColors,
}

impl PoolRecord for PinData {
    fn id(&self) -> i32 {
        self.id
    }

    fn set_id(&mut self, id: i32) {
        self.id = id;
    }
}

/// Anchor point of a pin given its node and attribute rectangles
pub fn pin_position(node_rect: Rect, attribute_rect: Rect, kind: AttributeKind) -> Pos2 {
    let x = match kind {
        AttributeKind::Input => node_rect.min.x,
        AttributeKind::Output => node_rect.max.x,
    };
    Pos2::new(x, attribute_rect.center().y)
}
