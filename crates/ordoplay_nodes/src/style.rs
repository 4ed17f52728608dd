// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor style configuration.
//!
//! The style is plain data stored as RON. Missing fields fall back to the
//! defaults, so a style file only needs the entries it overrides.

use egui::{Color32, Vec2};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Palette entries that can be overridden with
/// [`NodeEditor::push_color_style`](crate::NodeEditor::push_color_style)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorStyle {
    /// Node body
    NodeBackground,
    /// Node body while hovered
    NodeBackgroundHovered,
    /// Node body while selected
    NodeBackgroundSelected,
    /// Node outline
    NodeOutline,
    /// Node title bar
    TitleBar,
    /// Node title bar while hovered
    TitleBarHovered,
    /// Node title bar while selected
    TitleBarSelected,
    /// Link
    Link,
    /// Link while hovered
    LinkHovered,
    /// Link while selected
    LinkSelected,
    /// Pin fill
    Pin,
    /// Pin fill while hovered
    PinHovered,
    /// Pin outline
    PinOutline,
    /// Canvas background
    GridBackground,
    /// Grid lines
    GridLine,
    /// Node titles and text rows
    Text,
}

/// Editor color palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Colors {
    /// Node body
    pub node_background: Color32,
    /// Node body while hovered
    pub node_background_hovered: Color32,
    /// Node body while selected
    pub node_background_selected: Color32,
    /// Node outline
    pub node_outline: Color32,
    /// Node title bar
    pub title_bar: Color32,
    /// Node title bar while hovered
    pub title_bar_hovered: Color32,
    /// Node title bar while selected
    pub title_bar_selected: Color32,
    /// Link
    pub link: Color32,
    /// Link while hovered
    pub link_hovered: Color32,
    /// Link while selected
    pub link_selected: Color32,
    /// Pin fill
    pub pin: Color32,
    /// Pin fill while hovered
    pub pin_hovered: Color32,
    /// Pin outline
    pub pin_outline: Color32,
    /// Canvas background
    pub grid_background: Color32,
    /// Grid lines
    pub grid_line: Color32,
    /// Node titles and text rows
    pub text: Color32,
}

impl Colors {
    /// Get a palette entry
    pub fn get(&self, item: ColorStyle) -> Color32 {
        *self.entry(item)
    }

    /// Replace a palette entry, returning the previous color
    pub fn set(&mut self, item: ColorStyle, color: Color32) -> Color32 {
        std::mem::replace(self.entry_mut(item), color)
    }

    fn entry(&self, item: ColorStyle) -> &Color32 {
        match item {
            ColorStyle::NodeBackground => &self.node_background,
            ColorStyle::NodeBackgroundHovered => &self.node_background_hovered,
            ColorStyle::NodeBackgroundSelected => &self.node_background_selected,
            ColorStyle::NodeOutline => &self.node_outline,
            ColorStyle::TitleBar => &self.title_bar,
            ColorStyle::TitleBarHovered => &self.title_bar_hovered,
            ColorStyle::TitleBarSelected => &self.title_bar_selected,
            ColorStyle::Link => &self.link,
            ColorStyle::LinkHovered => &self.link_hovered,
            ColorStyle::LinkSelected => &self.link_selected,
            ColorStyle::Pin => &self.pin,
            ColorStyle::PinHovered => &self.pin_hovered,
            ColorStyle::PinOutline => &self.pin_outline,
            ColorStyle::GridBackground => &self.grid_background,
            ColorStyle::GridLine => &self.grid_line,
            ColorStyle::Text => &self.text,
        }
    }

    fn entry_mut(&mut self, item: ColorStyle) -> &mut Color32 {
        match item {
            ColorStyle::NodeBackground => &mut self.node_background,
            ColorStyle::NodeBackgroundHovered => &mut self.node_background_hovered,
            ColorStyle::NodeBackgroundSelected => &mut self.node_background_selected,
            ColorStyle::NodeOutline => &mut self.node_outline,
            ColorStyle::TitleBar => &mut self.title_bar,
            ColorStyle::TitleBarHovered => &mut self.title_bar_hovered,
            ColorStyle::TitleBarSelected => &mut self.title_bar_selected,
            ColorStyle::Link => &mut self.link,
            ColorStyle::LinkHovered => &mut self.link_hovered,
            ColorStyle::LinkSelected => &mut self.link_selected,
            ColorStyle::Pin => &mut self.pin,
            ColorStyle::PinHovered => &mut self.pin_hovered,
            ColorStyle::PinOutline => &mut self.pin_outline,
            ColorStyle::GridBackground => &mut self.grid_background,
            ColorStyle::GridLine => &mut self.grid_line,
            ColorStyle::Text => &mut self.text,
        }
    }
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            node_background: Color32::from_rgb(60, 60, 60),
            node_background_hovered: Color32::from_rgb(75, 75, 75),
            node_background_selected: Color32::from_rgb(90, 90, 90),
            node_outline: Color32::from_rgb(100, 100, 100),
            title_bar: Color32::from_rgb(60, 0, 40),
            title_bar_hovered: Color32::from_rgb(85, 0, 55),
            title_bar_selected: Color32::from_rgb(110, 0, 70),
            link: Color32::from_rgb(200, 200, 100),
            link_hovered: Color32::from_rgb(250, 250, 100),
            link_selected: Color32::from_rgb(255, 255, 255),
            pin: Color32::from_rgb(150, 150, 150),
            pin_hovered: Color32::from_rgb(200, 200, 100),
            pin_outline: Color32::from_rgb(200, 200, 200),
            grid_background: Color32::from_rgba_unmultiplied(40, 40, 50, 200),
            grid_line: Color32::from_rgba_unmultiplied(200, 200, 200, 40),
            text: Color32::from_gray(230),
        }
    }
}

/// Optional decorations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleFlags {
    /// Draw an outline around nodes
    pub node_outline: bool,
    /// Draw an outline around pins
    pub pin_outline: bool,
    /// Draw the background grid
    pub show_grid: bool,
}

impl Default for StyleFlags {
    fn default() -> Self {
        Self {
            node_outline: true,
            pin_outline: true,
            show_grid: true,
        }
    }
}

/// Complete editor style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Decorations
    pub flags: StyleFlags,
    /// Palette
    pub colors: Colors,
    /// Distance between grid lines
    pub grid_spacing: f32,
    /// Corner radius of node bodies and title bars
    pub node_corner_rounding: f32,
    /// Padding between a node's edge and its content
    pub node_padding: Vec2,
    /// Size of an attribute that declares no content
    pub attribute_min_size: Vec2,
    /// Vertical gap between content rows
    pub item_spacing: f32,
    /// Link stroke width
    pub link_thickness: f32,
    /// Render segments per pixel of link length
    pub link_segments_per_length: f32,
    /// Pointer distance below which a link counts as hovered
    pub link_hover_distance: f32,
    /// Drawn pin radius
    pub pin_radius: f32,
    /// Pointer distance below which a pin counts as hovered
    pub pin_hover_radius: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            flags: StyleFlags::default(),
            colors: Colors::default(),
            grid_spacing: 32.0,
            node_corner_rounding: 4.0,
            node_padding: Vec2::new(8.0, 8.0),
            attribute_min_size: Vec2::new(80.0, 20.0),
            item_spacing: 4.0,
            link_thickness: 3.0,
            link_segments_per_length: 0.1,
            link_hover_distance: 7.0,
            pin_radius: 4.0,
            pin_hover_radius: 10.0,
        }
    }
}

impl Style {
    /// Parse a style from RON
    pub fn from_ron(source: &str) -> Result<Self, StyleError> {
        Ok(ron::from_str(source)?)
    }

    /// Serialize the style to pretty-printed RON
    pub fn to_ron(&self) -> Result<String, StyleError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Load a style file
    pub fn load(path: &Path) -> Result<Self, StyleError> {
        let source = std::fs::read_to_string(path)?;
        let style = Self::from_ron(&source)?;
        tracing::info!("Loaded node editor style from {:?}", path);
        Ok(style)
    }

    /// Write the style to a file
    pub fn save(&self, path: &Path) -> Result<(), StyleError> {
        std::fs::write(path, self.to_ron()?)?;
        tracing::info!("Saved node editor style to {:?}", path);
        Ok(())
    }
}

/// Error reading or writing a style
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    /// File could not be read or written
    #[error("Style I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// RON text is not a valid style
    #[error("Invalid style: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Style could not be encoded
    #[error("Failed to encode style: {0}")]
    Encode(#[from] ron::Error),
}
