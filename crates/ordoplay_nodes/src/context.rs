// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor context: the state that persists between frames.
//!
//! One context holds one editor's nodes, pins and links, its camera offset,
//! its selection and any drag in progress. Several contexts can be kept
//! around and swapped into a [`NodeEditor`](crate::NodeEditor).

use crate::link::LinkData;
use crate::node::NodeData;
use crate::pin::PinData;
use crate::pool::ObjectPool;
use egui::{Pos2, Vec2};

/// Cross-frame state of one node editor
#[derive(Debug, Clone, Default)]
pub struct EditorContext {
    pub(crate) nodes: ObjectPool<NodeData>,
    pub(crate) pins: ObjectPool<PinData>,
    pub(crate) links: ObjectPool<LinkData>,
    /// Camera offset added to editor space to get canvas space
    pub panning: Vec2,
    pub(crate) selected_node: Option<i32>,
    pub(crate) selected_link: Option<i32>,
    /// Pin id a link drag started from
    pub(crate) link_drag: Option<i32>,
    /// Node holding pointer capture
    pub(crate) active_node: Option<i32>,
    /// Attribute (by pin id) holding pointer capture
    pub(crate) active_attribute: Option<i32>,
}

impl EditorContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Node pool
    pub fn nodes(&self) -> &ObjectPool<NodeData> {
        &self.nodes
    }

    /// Pin pool
    pub fn pins(&self) -> &ObjectPool<PinData> {
        &self.pins
    }

    /// Link pool
    pub fn links(&self) -> &ObjectPool<LinkData> {
        &self.links
    }

    /// Get a node by ID
    pub fn node(&self, node_id: i32) -> Option<&NodeData> {
        self.nodes.get(node_id)
    }

    /// Editor-space origin of a node
    pub fn node_origin(&self, node_id: i32) -> Option<Pos2> {
        self.node(node_id).map(|node| node.origin)
    }

    /// Place a node in editor space, creating its record if needed
    pub fn set_node_origin(&mut self, node_id: i32, origin: Pos2) {
        self.nodes.find_or_create(node_id).origin = origin;
    }

    /// Currently selected node
    pub fn selected_node(&self) -> Option<i32> {
        self.selected_node
    }

    /// Currently selected link
    pub fn selected_link(&self) -> Option<i32> {
        self.selected_link
    }

    /// Clear node and link selection
    pub fn clear_selection(&mut self) {
        self.selected_node = None;
        self.selected_link = None;
    }

    /// Pin id of the link drag in progress
    pub fn link_drag_origin(&self) -> Option<i32> {
        self.link_drag
    }

    /// Whether a node or link drag holds the pointer
    pub fn has_pointer_capture(&self) -> bool {
        self.active_node.is_some() || self.link_drag.is_some()
    }

    /// Translation from editor space to screen space for a canvas whose
    /// top-left corner is `canvas_origin`
    pub fn screen_offset(&self, canvas_origin: Pos2) -> Vec2 {
        canvas_origin.to_vec2() + self.panning
    }

    /// Convert an editor-space point to screen space
    pub fn editor_to_screen(&self, point: Pos2, canvas_origin: Pos2) -> Pos2 {
        point + self.screen_offset(canvas_origin)
    }

    /// Convert a screen-space point to editor space
    pub fn screen_to_editor(&self, point: Pos2, canvas_origin: Pos2) -> Pos2 {
        point - self.screen_offset(canvas_origin)
    }

    /// Free every record not declared since the previous call and drop
    /// selection or capture that referred to them
    pub(crate) fn reconcile(&mut self) {
        self.nodes.reconcile();
        self.pins.reconcile();
        self.links.reconcile();

        if self.selected_node.is_some_and(|id| !self.nodes.contains(id)) {
            self.selected_node = None;
        }
        if self.active_node.is_some_and(|id| !self.nodes.contains(id)) {
            self.active_node = None;
        }
        if self.selected_link.is_some_and(|id| !self.links.contains(id)) {
            self.selected_link = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_round_trip() {
        let mut ctx = EditorContext::new();
        ctx.panning = Vec2::new(12.0, -7.0);
        let canvas_origin = Pos2::new(50.0, 20.0);

        let screen = ctx.editor_to_screen(Pos2::new(100.0, 100.0), canvas_origin);
        assert_eq!(screen, Pos2::new(162.0, 113.0));
        assert_eq!(ctx.screen_to_editor(screen, canvas_origin), Pos2::new(100.0, 100.0));
    }

    #[test]
    fn test_reconcile_drops_stale_selection() {
        let mut ctx = EditorContext::new();
        ctx.nodes.find_or_create(1);
        ctx.selected_node = Some(1);

        // Live when the frame starts, then never redeclared
        ctx.reconcile();
        assert_eq!(ctx.selected_node(), Some(1));
        ctx.reconcile();
        assert_eq!(ctx.selected_node(), None);
    }

    #[test]
    fn test_set_node_origin_creates_node() {
        let mut ctx = EditorContext::new();
        ctx.set_node_origin(9, Pos2::new(-4.0, 2.5));
        assert_eq!(ctx.node_origin(9), Some(Pos2::new(-4.0, 2.5)));
        assert_eq!(ctx.node(9).map(|n| n.id), Some(9));
    }
}
