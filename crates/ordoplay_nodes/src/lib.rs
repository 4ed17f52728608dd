// SPDX-License-Identifier: MIT OR Apache-2.0
//! Retained state behind an immediate-mode node editor.
//!
//! Callers redeclare their whole graph every frame through [`NodeEditor`].
//! The crate keeps what must outlive a frame (node positions, selection,
//! drags in progress, the camera) and reports interactions back: hovered
//! and selected items, and links the user created or dropped.
//!
//! ## Architecture
//!
//! - [`pool`]: id-keyed arenas reclaimed by mark and sweep
//! - [`geometry`]: cubic bezier evaluation and link hit-testing
//! - [`editor`]: declaration API and the interaction state machine
//! - [`draw`]: layered draw commands and an egui backend
//! - [`persist`]: text save format for editor layout
//! - [`style`]: palette and metrics, stored as RON

pub mod context;
pub mod draw;
pub mod editor;
pub mod geometry;
pub mod input;
pub mod link;
pub mod node;
pub mod persist;
pub mod pin;
pub mod pool;
pub mod scope;
pub mod style;

pub use context::EditorContext;
pub use draw::{paint, Channel, DrawCommand, DrawList, EguiTextMeasure, FixedMetrics, TextMeasure};
pub use editor::NodeEditor;
pub use geometry::{CubicBezier, LinkCurve};
pub use input::{ButtonState, FrameInput};
pub use persist::{load_state, save_state};
pub use pin::AttributeKind;
pub use pool::{ObjectPool, PoolRecord};
pub use style::{ColorStyle, Colors, Style, StyleError, StyleFlags};
