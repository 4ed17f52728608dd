// SPDX-License-Identifier: MIT OR Apache-2.0
//! Link records between two pins.

use crate::pool::PoolRecord;
use crate::style::{ColorStyle, Style};
use egui::Color32;

/// Colors a link is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkColors {
    /// Idle color
    pub base: Color32,
    /// Color while hovered
    pub hovered: Color32,
    /// Color while selected
    pub selected: Color32,
}

impl LinkColors {
    /// Capture the link colors of the current style
    pub fn from_style(style: &Style) -> Self {
        Self {
            base: style.colors.get(ColorStyle::Link),
            hovered: style.colors.get(ColorStyle::LinkHovered),
            selected: style.colors.get(ColorStyle::LinkSelected),
        }
    }
}

/// A link declared between two pins.
///
/// Endpoints are stored as pin ids and resolved to slots when the link is
/// drawn, so a link survives its pins being reshuffled in the pin pool.
#[derive(Debug, Clone, Default)]
pub struct LinkData {
    /// Caller-supplied link id
    pub id: i32,
    /// Pin id the link starts at
    pub start_pin: i32,
    /// Pin id the link ends at
    pub end_pin: i32,
    /// Colors captured at declaration
    pub colors: LinkColors,
}

impl PoolRecord for LinkData {
    fn id(&self) -> i32 {
        self.id
    }

    fn set_id(&mut self, id: i32) {
        self.id = id;
    }
}
