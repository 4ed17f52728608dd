// SPDX-License-Identifier: MIT OR Apache-2.0
//! Render surface and text metrics.
//!
//! The editor does not rasterize anything itself. Each frame it records
//! [`DrawCommand`]s into a layered [`DrawList`]; [`paint`] hands the merged
//! result to an egui painter. Text sizes come from a [`TextMeasure`].

use crate::geometry::CubicBezier;
use egui::{Align2, Color32, FontId, Pos2, Rect, Rounding, Shape, Stroke, Vec2};

/// Draw layers, painted back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Grid and links
    Background = 0,
    /// Node bodies and pins
    Foreground = 1,
    /// Text on top of nodes
    Ui = 2,
}

const CHANNEL_COUNT: usize = 3;

/// Which corners of a rectangle are rounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corners {
    /// All four corners
    All,
    /// Only the top two corners
    Top,
}

/// A single shape submitted to the render surface
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Filled rectangle
    RectFilled {
        /// Bounds
        rect: Rect,
        /// Corner radius
        rounding: f32,
        /// Rounded corners
        corners: Corners,
        /// Fill
        color: Color32,
    },
    /// Rectangle outline
    RectStroke {
        /// Bounds
        rect: Rect,
        /// Corner radius
        rounding: f32,
        /// Outline
        stroke: Stroke,
    },
    /// Filled circle
    CircleFilled {
        /// Center
        center: Pos2,
        /// Radius
        radius: f32,
        /// Fill
        color: Color32,
    },
    /// Circle outline
    CircleStroke {
        /// Center
        center: Pos2,
        /// Radius
        radius: f32,
        /// Outline
        stroke: Stroke,
    },
    /// Straight line
    Line {
        /// Endpoints
        points: [Pos2; 2],
        /// Stroke
        stroke: Stroke,
    },
    /// Cubic bezier curve, tessellated into `segments` lines
    Bezier {
        /// Curve
        curve: CubicBezier,
        /// Number of line segments
        segments: usize,
        /// Stroke
        stroke: Stroke,
    },
    /// Single line of text anchored at its top-left corner
    Text {
        /// Top-left corner
        position: Pos2,
        /// Text
        text: String,
        /// Color
        color: Color32,
    },
}

/// Layered command buffer for one frame
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    channels: [Vec<DrawCommand>; CHANNEL_COUNT],
}

impl DrawList {
    /// Create an empty draw list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command to a layer
    pub fn push(&mut self, channel: Channel, command: DrawCommand) {
        self.channels[channel as usize].push(command);
    }

    /// Commands recorded so far on a layer
    pub fn channel(&self, channel: Channel) -> &[DrawCommand] {
        &self.channels[channel as usize]
    }

    /// Flatten all layers back to front, leaving the list empty
    pub fn merge(&mut self) -> Vec<DrawCommand> {
        let mut merged = Vec::with_capacity(self.channels.iter().map(Vec::len).sum());
        for channel in &mut self.channels {
            merged.append(channel);
        }
        merged
    }
}

/// Source of text metrics
pub trait TextMeasure {
    /// Size of a single line of text
    fn text_size(&self, text: &str) -> Vec2;

    /// Height of one line of text
    fn line_height(&self) -> f32;
}

/// Monospace metrics with a fixed cell size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedMetrics {
    /// Advance of every character
    pub char_width: f32,
    /// Height of every line
    pub line_height: f32,
}

impl Default for FixedMetrics {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            line_height: 14.0,
        }
    }
}

impl TextMeasure for FixedMetrics {
    fn text_size(&self, text: &str) -> Vec2 {
        Vec2::new(text.chars().count() as f32 * self.char_width, self.line_height)
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }
}

/// Text metrics from egui's font atlas
#[derive(Clone)]
pub struct EguiTextMeasure {
    ctx: egui::Context,
    font: FontId,
}

impl EguiTextMeasure {
    /// Measure text laid out with `font`
    pub fn new(ctx: egui::Context, font: FontId) -> Self {
        Self { ctx, font }
    }
}

impl TextMeasure for EguiTextMeasure {
    fn text_size(&self, text: &str) -> Vec2 {
        self.ctx.fonts(|fonts| {
            fonts
                .layout_no_wrap(text.to_owned(), self.font.clone(), Color32::WHITE)
                .size()
        })
    }

    fn line_height(&self) -> f32 {
        self.ctx.fonts(|fonts| fonts.row_height(&self.font))
    }
}

/// Submit recorded commands to an egui painter
pub fn paint(painter: &egui::Painter, commands: &[DrawCommand], font: &FontId) {
    for command in commands {
        match command {
            DrawCommand::RectFilled {
                rect,
                rounding,
                corners,
                color,
            } => {
                painter.rect_filled(*rect, egui_rounding(*rounding, *corners), *color);
            }
            DrawCommand::RectStroke {
                rect,
                rounding,
                stroke,
            } => {
                painter.rect_stroke(*rect, *rounding, *stroke);
            }
            DrawCommand::CircleFilled {
                center,
                radius,
                color,
            } => {
                painter.circle_filled(*center, *radius, *color);
            }
            DrawCommand::CircleStroke {
                center,
                radius,
                stroke,
            } => {
                painter.circle_stroke(*center, *radius, *stroke);
            }
            DrawCommand::Line { points, stroke } => {
                painter.line_segment(*points, *stroke);
            }
            DrawCommand::Bezier {
                curve,
                segments,
                stroke,
            } => {
                let points = (0..=*segments)
                    .map(|i| curve.eval(i as f32 / *segments as f32))
                    .collect();
                painter.add(Shape::line(points, *stroke));
            }
            DrawCommand::Text {
                position,
                text,
                color,
            } => {
                painter.text(*position, Align2::LEFT_TOP, text, font.clone(), *color);
            }
        }
    }
}

fn egui_rounding(radius: f32, corners: Corners) -> Rounding {
    match corners {
        Corners::All => Rounding::same(radius),
        Corners::Top => Rounding {
            nw: radius,
            ne: radius,
            sw: 0.0,
            se: 0.0,
        },
    }
}
