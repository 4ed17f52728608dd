// SPDX-License-Identifier: MIT OR Apache-2.0
//! Immediate-mode declaration API and the interaction state machine.
//!
//! Every frame the caller describes the graph from scratch:
//!
//! ```ignore
//! editor.begin_editor(input);
//! editor.begin_node(1);
//! editor.set_node_name("Add");
//! editor.begin_input_attribute(10);
//! editor.text("a");
//! editor.end_attribute();
//! editor.begin_output_attribute(11);
//! editor.text("sum");
//! editor.end_attribute();
//! editor.end_node();
//! editor.link(100, 11, 20);
//! editor.end_editor();
//!
//! if let Some((from, to)) = editor.link_created() { /* add a link */ }
//! ```
//!
//! Nodes are hit-tested as they are declared, so a later node wins hover over
//! an earlier one it overlaps. Pins and links are resolved in
//! [`NodeEditor::end_editor`], in that order. Links only take hover where no
//! node or pin claimed it.

use crate::context::EditorContext;
use crate::draw::{Channel, Corners, DrawCommand, DrawList, FixedMetrics, TextMeasure};
use crate::geometry::LinkCurve;
use crate::input::FrameInput;
use crate::link::{LinkColors, LinkData};
use crate::node::{NodeColors, NodeLabel};
use crate::persist;
use crate::pin::{pin_position, AttributeKind, PinColors, PinData};
use crate::scope::Scope;
use crate::style::{ColorStyle, Style};
use egui::{Color32, Pos2, Rect, Stroke, Vec2};

/// Outline width of nodes and pins
const OUTLINE_THICKNESS: f32 = 1.0;

/// Node drag recorded during declaration, applied at the end of the frame
#[derive(Debug, Clone, Copy)]
struct NodeMove {
    index: usize,
    position: Pos2,
}

/// Interaction results of the current frame, reset by `begin_editor`
#[derive(Debug, Clone, Default)]
struct FrameState {
    node_hovered: Option<i32>,
    pin_hovered: Option<i32>,
    link_hovered: Option<i32>,
    node_moved: Option<NodeMove>,
    link_created: Option<(i32, i32)>,
    link_dropped: bool,
    /// Node slots in the order their declarations ended, back to front
    node_order: Vec<usize>,
}

/// Attribute currently being declared
#[derive(Debug, Clone, Copy)]
struct AttributeInProgress {
    pin_id: i32,
    bounds: Option<Rect>,
}

/// Node currently being declared
#[derive(Debug, Clone)]
struct NodeInProgress {
    index: usize,
    content_origin: Pos2,
    cursor_y: f32,
    width: f32,
    attribute: Option<AttributeInProgress>,
    last_attribute: Option<i32>,
}

/// A link whose endpoints resolved to pins declared this frame
#[derive(Debug, Clone, Copy)]
struct ResolvedLink {
    id: i32,
    curve: LinkCurve,
    colors: LinkColors,
}

fn in_progress(current: &mut Option<NodeInProgress>) -> &mut NodeInProgress {
    match current {
        Some(node) => node,
        None => panic!("no node is being declared"),
    }
}

/// Immediate-mode node editor
pub struct NodeEditor {
    style: Style,
    color_stack: Vec<(ColorStyle, Color32)>,
    scope: Scope,
    editor: EditorContext,
    input: FrameInput,
    frame: FrameState,
    current: Option<NodeInProgress>,
    draw_list: DrawList,
    commands: Vec<DrawCommand>,
    measure: Box<dyn TextMeasure>,
}

impl NodeEditor {
    /// Create an editor with the default style, an empty context and
    /// monospace text metrics
    pub fn new() -> Self {
        Self {
            style: Style::default(),
            color_stack: Vec::new(),
            scope: Scope::None,
            editor: EditorContext::new(),
            input: FrameInput::default(),
            frame: FrameState::default(),
            current: None,
            draw_list: DrawList::new(),
            commands: Vec::new(),
            measure: Box::new(FixedMetrics::default()),
        }
    }

    /// Use `measure` for all text layout
    pub fn with_text_measure(mut self, measure: impl TextMeasure + 'static) -> Self {
        self.measure = Box::new(measure);
        self
    }

    /// Use `style` instead of the default style
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Current style
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Mutable style
    pub fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    /// Override a palette entry until the matching [`Self::pop_color_style`]
    pub fn push_color_style(&mut self, item: ColorStyle, color: Color32) {
        let previous = self.style.colors.set(item, color);
        self.color_stack.push((item, previous));
    }

    /// Undo the most recent [`Self::push_color_style`]
    #[track_caller]
    pub fn pop_color_style(&mut self) {
        let Some((item, color)) = self.color_stack.pop() else {
            panic!("pop_color_style called with an empty color style stack");
        };
        self.style.colors.set(item, color);
    }

    /// The active editor context
    pub fn context(&self) -> &EditorContext {
        &self.editor
    }

    /// The active editor context, mutably
    pub fn context_mut(&mut self) -> &mut EditorContext {
        &mut self.editor
    }

    /// Make `ctx` the active context and return the previous one
    #[track_caller]
    pub fn swap_context(&mut self, ctx: EditorContext) -> EditorContext {
        self.scope.expect(&[Scope::None], "swap_context");
        std::mem::replace(&mut self.editor, ctx)
    }

    /// Start a frame.
    ///
    /// Reclaims every node, pin and link that was not declared during the
    /// previous frame and resets per-frame interaction results.
    #[track_caller]
    pub fn begin_editor(&mut self, input: FrameInput) {
        self.scope.transition(&[Scope::None], Scope::Editor, "begin_editor");
        self.input = input;
        self.frame = FrameState::default();
        self.editor.reconcile();
    }

    /// Start declaring a node
    #[track_caller]
    pub fn begin_node(&mut self, node_id: i32) {
        self.scope.transition(&[Scope::Editor], Scope::Node, "begin_node");

        let colors = NodeColors::from_style(&self.style);
        let index = self.editor.nodes.find_or_create_index(node_id);
        let node = &mut self.editor.nodes[index];
        node.colors = colors;

        let content_origin = node.content_origin(self.style.node_padding, self.measure.line_height());
        self.current = Some(NodeInProgress {
            index,
            content_origin,
            cursor_y: 0.0,
            width: 0.0,
            attribute: None,
            last_attribute: None,
        });
    }

    /// Set the title of the node being declared
    #[track_caller]
    pub fn set_node_name(&mut self, name: &str) {
        self.scope.expect(&[Scope::Node], "set_node_name");
        let index = in_progress(&mut self.current).index;
        let node = &mut self.editor.nodes[index];
        if !node.set_name(name) {
            tracing::warn!("Node {} name truncated to {:?}", node.id, node.name);
        }
    }

    /// Finish the node being declared and hit-test it
    #[track_caller]
    pub fn end_node(&mut self) {
        self.scope.transition(&[Scope::Node], Scope::Editor, "end_node");
        let Some(current) = self.current.take() else {
            panic!("end_node called without a node in progress");
        };

        let padding = self.style.node_padding;
        let pointer = self
            .input
            .pointer_in_canvas()
            .map(|p| self.editor.screen_to_editor(p, self.input.canvas.min));
        let content_height = (current.cursor_y - self.style.item_spacing).max(0.0);
        let title_width = self.measure.text_size(&self.editor.nodes[current.index].name).x;
        let line_height = self.measure.line_height();

        let node = &mut self.editor.nodes[current.index];
        node.content_rect = Rect::from_min_size(
            current.content_origin,
            Vec2::new(current.width, content_height),
        );
        node.title_size = Vec2::new(title_width, line_height);

        if pointer.is_some_and(|p| node.rect(padding).contains(p)) {
            self.frame.node_hovered = Some(node.id);
        }
        self.frame.node_order.push(current.index);

        if self.editor.active_node == Some(node.id) && self.input.primary.down && self.input.pointer_moved() {
            self.frame.node_moved = Some(NodeMove {
                index: current.index,
                position: node.origin + self.input.pointer_delta,
            });
        }
    }

    /// Start an input attribute whose pin is `pin_id`
    #[track_caller]
    pub fn begin_input_attribute(&mut self, pin_id: i32) {
        self.begin_attribute(pin_id, AttributeKind::Input, "begin_input_attribute");
    }

    /// Start an output attribute whose pin is `pin_id`
    #[track_caller]
    pub fn begin_output_attribute(&mut self, pin_id: i32) {
        self.begin_attribute(pin_id, AttributeKind::Output, "begin_output_attribute");
    }

    #[track_caller]
    fn begin_attribute(&mut self, pin_id: i32, kind: AttributeKind, call: &str) {
        self.scope.transition(&[Scope::Node], Scope::Attribute, call);

        let colors = PinColors::from_style(&self.style);
        let current = in_progress(&mut self.current);
        let attribute_index = self.editor.nodes[current.index].attribute_rects.len();

        let pin = self.editor.pins.find_or_create(pin_id);
        pin.node_index = current.index;
        pin.attribute_index = attribute_index;
        pin.kind = kind;
        pin.colors = colors;

        current.attribute = Some(AttributeInProgress { pin_id, bounds: None });
    }

    /// Finish the attribute being declared
    #[track_caller]
    pub fn end_attribute(&mut self) {
        self.scope.transition(&[Scope::Attribute], Scope::Node, "end_attribute");

        let Some(attribute) = in_progress(&mut self.current).attribute.take() else {
            panic!("end_attribute called without an attribute in progress");
        };
        let rect = match attribute.bounds {
            Some(bounds) => bounds,
            None => self.place_row(self.style.attribute_min_size),
        };

        let current = in_progress(&mut self.current);
        self.editor.nodes[current.index].attribute_rects.push(rect);
        current.last_attribute = Some(attribute.pin_id);

        let canvas_origin = self.input.canvas.min;
        let pressed_inside = self.input.primary.pressed
            && self
                .input
                .pointer_in_canvas()
                .is_some_and(|p| rect.contains(self.editor.screen_to_editor(p, canvas_origin)));
        if pressed_inside {
            self.editor.active_attribute = Some(attribute.pin_id);
        }
    }

    /// Add a line of text to the node or attribute being declared
    #[track_caller]
    pub fn text(&mut self, text: &str) {
        self.scope.expect(&[Scope::Node, Scope::Attribute], "text");
        let rect = self.place_row(self.measure.text_size(text));
        let index = in_progress(&mut self.current).index;
        self.editor.nodes[index].labels.push(NodeLabel {
            position: rect.min,
            text: text.to_owned(),
        });
    }

    /// Reserve a row of `size` for content the caller draws itself.
    ///
    /// Returns the screen-space rectangle reserved this frame.
    #[track_caller]
    pub fn item(&mut self, size: Vec2) -> Rect {
        self.scope.expect(&[Scope::Node, Scope::Attribute], "item");
        self.place_row(size).translate(self.screen_offset())
    }

    /// Declare a link between two pins. Links follow all nodes.
    #[track_caller]
    pub fn link(&mut self, link_id: i32, start_pin: i32, end_pin: i32) {
        self.scope.transition(&[Scope::Editor, Scope::Links], Scope::Links, "link");

        let colors = LinkColors::from_style(&self.style);
        let link = self.editor.links.find_or_create(link_id);
        link.start_pin = start_pin;
        link.end_pin = end_pin;
        link.colors = colors;
    }

    /// Place a node in editor space, independent of dragging
    pub fn set_node_position(&mut self, node_id: i32, position: Pos2) {
        self.editor.set_node_origin(node_id, position);
    }

    /// Editor-space position of a node
    pub fn node_position(&self, node_id: i32) -> Option<Pos2> {
        self.editor.node_origin(node_id)
    }

    /// Finish the frame: resolve hover, selection, link drags, node drags and
    /// panning, then record the frame's draw commands
    #[track_caller]
    pub fn end_editor(&mut self) {
        self.scope.transition(&[Scope::Editor, Scope::Links], Scope::None, "end_editor");

        self.draw_grid();

        self.frame.pin_hovered = self.find_hovered_pin();
        let links = self.resolve_links();
        if self.frame.node_hovered.is_none() && self.frame.pin_hovered.is_none() {
            if let Some(pointer) = self.input.pointer_in_canvas() {
                let hover_distance = self.style.link_hover_distance;
                self.frame.link_hovered = links
                    .iter()
                    .rev()
                    .find(|link| link.curve.bezier.is_near(pointer, hover_distance))
                    .map(|link| link.id);
            }
        }

        if self.input.primary.pressed {
            self.on_primary_pressed();
        }
        let provisional = self.update_link_drag();

        self.draw_nodes();
        self.draw_pins();
        self.draw_links(&links, provisional);

        if let Some(moved) = self.frame.node_moved {
            // A node under a link drag stays put
            if self.editor.link_drag.is_none() {
                let node = &mut self.editor.nodes[moved.index];
                tracing::trace!("Node {} dragged to {:?}", node.id, moved.position);
                node.origin = moved.position;
            }
        }

        if self.input.pan.down
            && self.input.pointer_moved()
            && self.input.pointer_in_canvas().is_some()
            && !self.editor.has_pointer_capture()
        {
            self.editor.panning += self.input.pointer_delta;
        }

        if !self.input.primary.down {
            self.editor.active_node = None;
            self.editor.active_attribute = None;
        }

        for node in self.editor.nodes.slots_mut() {
            node.clear_frame_data();
        }
        self.commands = self.draw_list.merge();
    }

    /// Node under the pointer this frame
    #[track_caller]
    pub fn hovered_node(&self) -> Option<i32> {
        self.scope.expect(&[Scope::None], "hovered_node");
        self.frame.node_hovered
    }

    /// Selected node
    #[track_caller]
    pub fn selected_node(&self) -> Option<i32> {
        self.scope.expect(&[Scope::None], "selected_node");
        self.editor.selected_node
    }

    /// Link under the pointer this frame
    #[track_caller]
    pub fn hovered_link(&self) -> Option<i32> {
        self.scope.expect(&[Scope::None], "hovered_link");
        self.frame.link_hovered
    }

    /// Selected link
    #[track_caller]
    pub fn selected_link(&self) -> Option<i32> {
        self.scope.expect(&[Scope::None], "selected_link");
        self.editor.selected_link
    }

    /// Pin under the pointer this frame
    #[track_caller]
    pub fn hovered_pin(&self) -> Option<i32> {
        self.scope.expect(&[Scope::None], "hovered_pin");
        self.frame.pin_hovered
    }

    /// Pin a link drag in progress started from
    #[track_caller]
    pub fn link_started(&self) -> Option<i32> {
        self.scope.expect(&[Scope::None], "link_started");
        self.editor.link_drag
    }

    /// Whether a link drag ended this frame without reaching another pin
    #[track_caller]
    pub fn is_link_dropped(&self) -> bool {
        self.scope.expect(&[Scope::None], "is_link_dropped");
        self.frame.link_dropped
    }

    /// `(started_at, ended_at)` pin ids of a link drag completed this frame.
    ///
    /// The editor does not add the link; declare it from the next frame on.
    #[track_caller]
    pub fn link_created(&self) -> Option<(i32, i32)> {
        self.scope.expect(&[Scope::None], "link_created");
        self.frame.link_created
    }

    /// Whether the attribute just ended holds the pointer
    #[track_caller]
    pub fn is_attribute_active(&self) -> bool {
        self.scope.expect(&[Scope::Node], "is_attribute_active");
        let last = self.current.as_ref().and_then(|node| node.last_attribute);
        last.is_some() && last == self.editor.active_attribute
    }

    /// Pin id of the attribute holding the pointer, if any
    #[track_caller]
    pub fn is_any_attribute_active(&self) -> Option<i32> {
        self.scope.expect(&[Scope::None, Scope::Editor, Scope::Links], "is_any_attribute_active");
        self.editor.active_attribute
    }

    /// Deselect every node and link
    #[track_caller]
    pub fn clear_selection(&mut self) {
        self.scope.expect(&[Scope::None], "clear_selection");
        self.editor.clear_selection();
    }

    /// Serialize the active context's layout
    pub fn save_current_state(&self) -> String {
        persist::save_state(&self.editor)
    }

    /// Restore layout into the active context
    #[track_caller]
    pub fn load_current_state(&mut self, data: &str) {
        self.scope.expect(&[Scope::None], "load_current_state");
        persist::load_state(&mut self.editor, data);
    }

    /// Draw commands recorded by the last completed frame, back to front
    pub fn draw_commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    fn screen_offset(&self) -> Vec2 {
        self.editor.screen_offset(self.input.canvas.min)
    }

    /// Lay out a content row in the node being declared, in editor space
    fn place_row(&mut self, size: Vec2) -> Rect {
        let spacing = self.style.item_spacing;
        let current = in_progress(&mut self.current);
        let rect = Rect::from_min_size(current.content_origin + Vec2::new(0.0, current.cursor_y), size);
        current.cursor_y += size.y + spacing;
        current.width = current.width.max(size.x);
        if let Some(attribute) = current.attribute.as_mut() {
            attribute.bounds = Some(attribute.bounds.map_or(rect, |bounds| bounds.union(rect)));
        }
        rect
    }

    /// Screen-space anchor of a pin declared this frame
    fn pin_anchor(&self, pin: &PinData) -> Option<Pos2> {
        let node = self.editor.nodes.slot(pin.node_index)?;
        let attribute = node.attribute_rects.get(pin.attribute_index)?;
        let anchor = pin_position(node.rect(self.style.node_padding), *attribute, pin.kind);
        Some(self.editor.editor_to_screen(anchor, self.input.canvas.min))
    }

    /// Anchor and kind of a pin by id, if it was declared this frame
    fn pin_anchor_by_id(&self, pin_id: i32) -> Option<(Pos2, AttributeKind)> {
        let index = self.editor.pins.index_of(pin_id)?;
        if !self.editor.pins.is_live(index) {
            return None;
        }
        let pin = &self.editor.pins[index];
        Some((self.pin_anchor(pin)?, pin.kind))
    }

    /// Nearest pin within the hover radius; on equal distance the pin
    /// declared later wins
    fn find_hovered_pin(&self) -> Option<i32> {
        let pointer = self.input.pointer_in_canvas()?;
        let radius_sq = self.style.pin_hover_radius * self.style.pin_hover_radius;

        let mut best: Option<(i32, f32)> = None;
        for (_, pin) in self.editor.pins.live() {
            let Some(anchor) = self.pin_anchor(pin) else {
                continue;
            };
            let distance_sq = anchor.distance_sq(pointer);
            if distance_sq < radius_sq && !best.is_some_and(|(_, d)| distance_sq > d) {
                best = Some((pin.id, distance_sq));
            }
        }
        best.map(|(id, _)| id)
    }

    fn resolve_links(&self) -> Vec<ResolvedLink> {
        self.editor
            .links
            .live()
            .filter_map(|(_, link)| self.resolve_link(link))
            .collect()
    }

    fn resolve_link(&self, link: &LinkData) -> Option<ResolvedLink> {
        let (Some((start, start_kind)), Some((end, _))) = (
            self.pin_anchor_by_id(link.start_pin),
            self.pin_anchor_by_id(link.end_pin),
        ) else {
            tracing::trace!("Link {} has an undeclared endpoint, skipping", link.id);
            return None;
        };
        Some(ResolvedLink {
            id: link.id,
            curve: LinkCurve::new(start, end, start_kind, self.style.link_segments_per_length),
            colors: link.colors,
        })
    }

    fn on_primary_pressed(&mut self) {
        if self.input.pointer_in_canvas().is_none() {
            return;
        }
        let FrameState {
            node_hovered,
            pin_hovered,
            link_hovered,
            ..
        } = self.frame;

        if node_hovered.is_some() {
            self.editor.selected_node = node_hovered;
        }
        if link_hovered.is_some() {
            self.editor.selected_link = link_hovered;
        }
        if node_hovered.is_none() && pin_hovered.is_none() && link_hovered.is_none() {
            self.editor.clear_selection();
        }
        self.editor.active_node = node_hovered;

        if let Some(pin_id) = pin_hovered {
            tracing::debug!("Link drag started from pin {}", pin_id);
            self.editor.link_drag = Some(pin_id);
        }
    }

    /// Advance the link drag, returning the provisional curve to draw
    fn update_link_drag(&mut self) -> Option<LinkCurve> {
        let origin = self.editor.link_drag?;

        let Some((start, kind)) = self.pin_anchor_by_id(origin) else {
            tracing::debug!("Link drag origin pin {} was not declared, dropping", origin);
            self.editor.link_drag = None;
            self.frame.link_dropped = true;
            return None;
        };

        if self.input.primary.down {
            let pointer = self.input.pointer?;
            return Some(LinkCurve::new(start, pointer, kind, self.style.link_segments_per_length));
        }

        match self.frame.pin_hovered {
            Some(end) if end != origin => {
                tracing::debug!("Link created from pin {} to pin {}", origin, end);
                self.frame.link_created = Some((origin, end));
            }
            _ => {
                tracing::debug!("Link drag from pin {} dropped", origin);
                self.frame.link_dropped = true;
            }
        }
        self.editor.link_drag = None;
        None
    }

    fn draw_grid(&mut self) {
        let canvas = self.input.canvas;
        let colors = self.style.colors;
        self.draw_list.push(
            Channel::Background,
            DrawCommand::RectFilled {
                rect: canvas,
                rounding: 0.0,
                corners: Corners::All,
                color: colors.grid_background,
            },
        );

        let spacing = self.style.grid_spacing;
        if !self.style.flags.show_grid || spacing <= 0.0 {
            return;
        }
        let stroke = Stroke::new(1.0, colors.grid_line);
        let panning = self.editor.panning;

        let mut x = canvas.min.x + panning.x.rem_euclid(spacing);
        while x < canvas.max.x {
            self.draw_list.push(
                Channel::Background,
                DrawCommand::Line {
                    points: [Pos2::new(x, canvas.min.y), Pos2::new(x, canvas.max.y)],
                    stroke,
                },
            );
            x += spacing;
        }
        let mut y = canvas.min.y + panning.y.rem_euclid(spacing);
        while y < canvas.max.y {
            self.draw_list.push(
                Channel::Background,
                DrawCommand::Line {
                    points: [Pos2::new(canvas.min.x, y), Pos2::new(canvas.max.x, y)],
                    stroke,
                },
            );
            y += spacing;
        }
    }

    fn draw_nodes(&mut self) {
        let offset = self.screen_offset();
        let style = &self.style;

        for &index in &self.frame.node_order {
            let node = &self.editor.nodes[index];
            let (background, titlebar) = if self.editor.selected_node == Some(node.id) {
                (node.colors.background_selected, node.colors.titlebar_selected)
            } else if self.frame.node_hovered == Some(node.id) {
                (node.colors.background_hovered, node.colors.titlebar_hovered)
            } else {
                (node.colors.background, node.colors.titlebar)
            };

            let rect = node.rect(style.node_padding).translate(offset);
            self.draw_list.push(
                Channel::Foreground,
                DrawCommand::RectFilled {
                    rect,
                    rounding: style.node_corner_rounding,
                    corners: Corners::All,
                    color: background,
                },
            );
            self.draw_list.push(
                Channel::Foreground,
                DrawCommand::RectFilled {
                    rect: node.title_bar_rect(style.node_padding).translate(offset),
                    rounding: style.node_corner_rounding,
                    corners: Corners::Top,
                    color: titlebar,
                },
            );
            if style.flags.node_outline {
                self.draw_list.push(
                    Channel::Foreground,
                    DrawCommand::RectStroke {
                        rect,
                        rounding: style.node_corner_rounding,
                        stroke: Stroke::new(OUTLINE_THICKNESS, node.colors.outline),
                    },
                );
            }

            self.draw_list.push(
                Channel::Ui,
                DrawCommand::Text {
                    position: node.origin + style.node_padding + offset,
                    text: node.name.clone(),
                    color: style.colors.text,
                },
            );
            for label in &node.labels {
                self.draw_list.push(
                    Channel::Ui,
                    DrawCommand::Text {
                        position: label.position + offset,
                        text: label.text.clone(),
                        color: style.colors.text,
                    },
                );
            }
        }
    }

    fn draw_pins(&mut self) {
        for (_, pin) in self.editor.pins.live() {
            let Some(center) = self.pin_anchor(pin) else {
                continue;
            };
            let color = if self.frame.pin_hovered == Some(pin.id) {
                pin.colors.hovered
            } else {
                pin.colors.background
            };
            self.draw_list.push(
                Channel::Foreground,
                DrawCommand::CircleFilled {
                    center,
                    radius: self.style.pin_radius,
                    color,
                },
            );
            if self.style.flags.pin_outline {
                self.draw_list.push(
                    Channel::Foreground,
                    DrawCommand::CircleStroke {
                        center,
                        radius: self.style.pin_radius,
                        stroke: Stroke::new(OUTLINE_THICKNESS, pin.colors.outline),
                    },
                );
            }
        }
    }

    fn draw_links(&mut self, links: &[ResolvedLink], provisional: Option<LinkCurve>) {
        let thickness = self.style.link_thickness;
        for link in links {
            let color = if self.editor.selected_link == Some(link.id) {
                link.colors.selected
            } else if self.frame.link_hovered == Some(link.id) {
                link.colors.hovered
            } else {
                link.colors.base
            };
            self.draw_list.push(
                Channel::Background,
                DrawCommand::Bezier {
                    curve: link.curve.bezier,
                    segments: link.curve.segments,
                    stroke: Stroke::new(thickness, color),
                },
            );
        }
        if let Some(curve) = provisional {
            self.draw_list.push(
                Channel::Background,
                DrawCommand::Bezier {
                    curve: curve.bezier,
                    segments: curve.segments,
                    stroke: Stroke::new(thickness, self.style.colors.link),
                },
            );
        }
    }
}

impl Default for NodeEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ButtonState;

    fn canvas() -> Rect {
        Rect::from_min_max(Pos2::ZERO, Pos2::new(800.0, 600.0))
    }

    fn input(pointer: Pos2, primary: ButtonState, delta: Vec2) -> FrameInput {
        FrameInput {
            pointer: Some(pointer),
            pointer_delta: delta,
            primary,
            ..FrameInput::new(canvas())
        }
    }

    fn idle(pointer: Pos2) -> FrameInput {
        input(pointer, ButtonState::default(), Vec2::ZERO)
    }

    /// Node 1 at (100, 100) with output pin 10 anchored at (137, 145);
    /// node 2 at (300, 200) with input pin 20 anchored at (300, 245).
    fn editor() -> NodeEditor {
        let mut editor = NodeEditor::new();
        editor.set_node_position(2, Pos2::new(300.0, 200.0));
        editor
    }

    fn declare_nodes(editor: &mut NodeEditor) {
        editor.begin_node(1);
        editor.set_node_name("A");
        editor.begin_output_attribute(10);
        editor.text("out");
        editor.end_attribute();
        editor.end_node();

        editor.begin_node(2);
        editor.set_node_name("B");
        editor.begin_input_attribute(20);
        editor.text("in");
        editor.end_attribute();
        editor.end_node();
    }

    fn frame(editor: &mut NodeEditor, input: FrameInput) {
        editor.begin_editor(input);
        declare_nodes(editor);
        editor.end_editor();
    }

    fn frame_with_link(editor: &mut NodeEditor, input: FrameInput) {
        editor.begin_editor(input);
        declare_nodes(editor);
        editor.link(100, 10, 20);
        editor.end_editor();
    }

    #[test]
    fn test_layout_and_pin_hover() {
        let mut editor = editor();
        frame(&mut editor, idle(Pos2::new(137.0, 145.0)));

        let node = editor.context().node(1).unwrap();
        assert_eq!(node.rect(editor.style().node_padding), Rect::from_min_max(Pos2::new(100.0, 100.0), Pos2::new(137.0, 160.0)));
        assert_eq!(editor.hovered_pin(), Some(10));
        assert_eq!(editor.hovered_node(), Some(1));

        frame(&mut editor, idle(Pos2::new(305.0, 240.0)));
        assert_eq!(editor.hovered_pin(), Some(20));
        assert_eq!(editor.hovered_node(), Some(2));

        frame(&mut editor, idle(Pos2::new(700.0, 500.0)));
        assert_eq!(editor.hovered_pin(), None);
        assert_eq!(editor.hovered_node(), None);
    }

    #[test]
    fn test_link_drag_creates_link() {
        let mut editor = editor();
        frame(&mut editor, input(Pos2::new(137.0, 145.0), ButtonState::PRESSED, Vec2::ZERO));
        assert_eq!(editor.link_started(), Some(10));

        frame(&mut editor, input(Pos2::new(250.0, 200.0), ButtonState::HELD, Vec2::new(113.0, 55.0)));
        assert_eq!(editor.link_started(), Some(10));
        assert!(editor.link_created().is_none());
        // The node the drag started on does not move
        assert_eq!(editor.node_position(1), Some(Pos2::new(100.0, 100.0)));
        let curves = editor
            .draw_commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Bezier { .. }))
            .count();
        assert_eq!(curves, 1);

        frame(&mut editor, input(Pos2::new(300.0, 245.0), ButtonState::RELEASED, Vec2::new(50.0, 45.0)));
        assert_eq!(editor.link_created(), Some((10, 20)));
        assert!(!editor.is_link_dropped());
        assert_eq!(editor.link_started(), None);
        assert_eq!(editor.node_position(1), Some(Pos2::new(100.0, 100.0)));

        // The event lasts one frame
        frame(&mut editor, idle(Pos2::new(300.0, 245.0)));
        assert!(editor.link_created().is_none());
    }

    #[test]
    fn test_link_drag_keeps_start_order_from_input() {
        let mut editor = editor();
        frame(&mut editor, input(Pos2::new(300.0, 245.0), ButtonState::PRESSED, Vec2::ZERO));
        frame(&mut editor, input(Pos2::new(137.0, 145.0), ButtonState::RELEASED, Vec2::ZERO));
        assert_eq!(editor.link_created(), Some((20, 10)));
    }

    #[test]
    fn test_link_drag_dropped_on_empty_space() {
        let mut editor = editor();
        frame(&mut editor, input(Pos2::new(137.0, 145.0), ButtonState::PRESSED, Vec2::ZERO));
        frame(&mut editor, input(Pos2::new(600.0, 500.0), ButtonState::RELEASED, Vec2::new(463.0, 355.0)));
        assert!(editor.is_link_dropped());
        assert!(editor.link_created().is_none());
        assert_eq!(editor.link_started(), None);
    }

    #[test]
    fn test_link_drag_released_on_origin_pin_is_dropped() {
        let mut editor = editor();
        frame(&mut editor, input(Pos2::new(137.0, 145.0), ButtonState::PRESSED, Vec2::ZERO));
        frame(&mut editor, input(Pos2::new(138.0, 146.0), ButtonState::RELEASED, Vec2::new(1.0, 1.0)));
        assert!(editor.is_link_dropped());
        assert!(editor.link_created().is_none());
    }

    #[test]
    fn test_link_drag_cancelled_when_origin_pin_disappears() {
        let mut editor = editor();
        frame(&mut editor, input(Pos2::new(137.0, 145.0), ButtonState::PRESSED, Vec2::ZERO));

        editor.begin_editor(input(Pos2::new(200.0, 200.0), ButtonState::HELD, Vec2::ZERO));
        editor.begin_node(2);
        editor.begin_input_attribute(20);
        editor.end_attribute();
        editor.end_node();
        editor.end_editor();

        assert!(editor.is_link_dropped());
        assert_eq!(editor.link_started(), None);
    }

    #[test]
    fn test_node_drag() {
        let mut editor = editor();
        frame(&mut editor, input(Pos2::new(110.0, 105.0), ButtonState::PRESSED, Vec2::ZERO));
        assert_eq!(editor.selected_node(), Some(1));
        assert_eq!(editor.link_started(), None);

        frame(&mut editor, input(Pos2::new(130.0, 125.0), ButtonState::HELD, Vec2::new(20.0, 20.0)));
        assert_eq!(editor.node_position(1), Some(Pos2::new(120.0, 120.0)));

        frame(&mut editor, input(Pos2::new(130.0, 125.0), ButtonState::RELEASED, Vec2::ZERO));
        frame(&mut editor, input(Pos2::new(150.0, 150.0), ButtonState::default(), Vec2::new(20.0, 25.0)));
        assert_eq!(editor.node_position(1), Some(Pos2::new(120.0, 120.0)));
        assert_eq!(editor.node_position(2), Some(Pos2::new(300.0, 200.0)));
    }

    #[test]
    fn test_node_selection_is_exclusive() {
        let mut editor = editor();
        frame(&mut editor, input(Pos2::new(110.0, 105.0), ButtonState::PRESSED, Vec2::ZERO));
        assert_eq!(editor.selected_node(), Some(1));

        frame(&mut editor, input(Pos2::new(310.0, 205.0), ButtonState::PRESSED, Vec2::ZERO));
        assert_eq!(editor.selected_node(), Some(2));

        // Selection is sticky while nothing is clicked
        frame(&mut editor, idle(Pos2::new(600.0, 500.0)));
        assert_eq!(editor.selected_node(), Some(2));

        frame(&mut editor, input(Pos2::new(600.0, 500.0), ButtonState::PRESSED, Vec2::ZERO));
        assert_eq!(editor.selected_node(), None);

        frame(&mut editor, input(Pos2::new(110.0, 105.0), ButtonState::PRESSED, Vec2::ZERO));
        editor.clear_selection();
        assert_eq!(editor.selected_node(), None);
    }

    #[test]
    fn test_link_hover_and_selection_independent_of_nodes() {
        let mut editor = editor();
        // Midpoint of the curve from (137, 145) to (300, 245)
        let on_link = Pos2::new(218.5, 195.0);

        frame_with_link(&mut editor, idle(on_link));
        assert_eq!(editor.hovered_link(), Some(100));
        assert_eq!(editor.hovered_node(), None);

        frame_with_link(&mut editor, input(Pos2::new(110.0, 105.0), ButtonState::PRESSED, Vec2::ZERO));
        frame_with_link(&mut editor, input(Pos2::new(110.0, 105.0), ButtonState::RELEASED, Vec2::ZERO));
        frame_with_link(&mut editor, input(on_link, ButtonState::PRESSED, Vec2::ZERO));
        assert_eq!(editor.selected_link(), Some(100));
        assert_eq!(editor.selected_node(), Some(1));

        frame_with_link(&mut editor, input(on_link, ButtonState::RELEASED, Vec2::ZERO));
        frame_with_link(&mut editor, input(Pos2::new(600.0, 500.0), ButtonState::PRESSED, Vec2::ZERO));
        assert_eq!(editor.selected_link(), None);
        assert_eq!(editor.selected_node(), None);
    }

    #[test]
    fn test_link_with_undeclared_pin_is_not_drawn() {
        let mut editor = editor();
        editor.begin_editor(idle(Pos2::new(700.0, 500.0)));
        declare_nodes(&mut editor);
        editor.link(100, 10, 20);
        editor.link(101, 10, 999);
        editor.end_editor();

        let curves = editor
            .draw_commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Bezier { .. }))
            .count();
        assert_eq!(curves, 1);
        assert!(editor.context().links().contains(101));
    }

    #[test]
    fn test_pin_hover_prefers_nearest() {
        let mut editor = editor();
        editor.set_node_position(3, Pos2::new(145.0, 100.0));
        let declare = |editor: &mut NodeEditor, pointer: Pos2| {
            editor.begin_editor(idle(pointer));
            declare_nodes(editor);
            editor.begin_node(3);
            editor.begin_input_attribute(30);
            editor.text("in");
            editor.end_attribute();
            editor.end_node();
            editor.end_editor();
        };

        declare(&mut editor, Pos2::new(139.0, 145.0));
        assert_eq!(editor.hovered_pin(), Some(10));

        declare(&mut editor, Pos2::new(143.0, 145.0));
        assert_eq!(editor.hovered_pin(), Some(30));
    }

    #[test]
    fn test_undeclared_nodes_are_reclaimed() {
        let mut editor = editor();
        frame(&mut editor, idle(Pos2::ZERO));

        editor.begin_editor(idle(Pos2::ZERO));
        editor.begin_node(1);
        editor.end_node();
        editor.end_editor();
        assert!(editor.context().nodes().contains(2));

        editor.begin_editor(idle(Pos2::ZERO));
        editor.end_editor();
        assert!(!editor.context().nodes().contains(2));
        assert!(!editor.context().pins().contains(20));
        assert!(editor.context().nodes().contains(1));
    }

    #[test]
    fn test_panning() {
        let mut editor = editor();
        let pan = FrameInput {
            pan: ButtonState::HELD,
            ..input(Pos2::new(600.0, 500.0), ButtonState::default(), Vec2::new(10.0, -5.0))
        };
        frame(&mut editor, pan);
        assert_eq!(editor.context().panning, Vec2::new(10.0, -5.0));

        // Node 1 moved on screen with the camera
        frame(&mut editor, idle(Pos2::new(147.0, 140.0)));
        assert_eq!(editor.hovered_pin(), Some(10));

        // No panning while a node holds the pointer
        frame(&mut editor, input(Pos2::new(120.0, 100.0), ButtonState::PRESSED, Vec2::ZERO));
        let captured = FrameInput {
            pan: ButtonState::HELD,
            ..input(Pos2::new(120.0, 100.0), ButtonState::HELD, Vec2::new(10.0, 0.0))
        };
        frame(&mut editor, captured);
        assert_eq!(editor.context().panning, Vec2::new(10.0, -5.0));
    }

    #[test]
    fn test_attribute_activity() {
        let mut editor = editor();
        editor.begin_editor(input(Pos2::new(115.0, 145.0), ButtonState::PRESSED, Vec2::ZERO));
        editor.begin_node(1);
        editor.begin_output_attribute(10);
        editor.text("out");
        editor.end_attribute();
        assert!(editor.is_attribute_active());
        editor.end_node();
        editor.end_editor();
        assert_eq!(editor.is_any_attribute_active(), Some(10));

        frame(&mut editor, input(Pos2::new(115.0, 145.0), ButtonState::RELEASED, Vec2::ZERO));
        assert_eq!(editor.is_any_attribute_active(), None);
    }

    #[test]
    fn test_color_style_stack() {
        let mut editor = editor();
        editor.push_color_style(ColorStyle::Link, Color32::RED);
        frame_with_link(&mut editor, idle(Pos2::ZERO));
        editor.pop_color_style();

        let link = editor.context().links().get(100).unwrap();
        assert_eq!(link.colors.base, Color32::RED);
        assert_eq!(editor.style().colors.link, Style::default().colors.link);
    }

    #[test]
    fn test_draw_commands() {
        let mut editor = editor();
        frame_with_link(&mut editor, idle(Pos2::new(700.0, 500.0)));
        let commands = editor.draw_commands();

        let texts: Vec<_> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        // Declaration order, even though node 2 holds the lower slot
        assert_eq!(texts, vec!["A", "out", "B", "in"]);
        let pins = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::CircleFilled { .. }))
            .count();
        assert_eq!(pins, 2);
        // Canvas background comes first
        assert!(matches!(commands[0], DrawCommand::RectFilled { .. }));
    }

    #[test]
    fn test_later_node_hovers_and_draws_on_top() {
        let mut editor = NodeEditor::new();
        // Slot order is the reverse of declaration order
        editor.set_node_position(2, Pos2::new(120.0, 110.0));
        editor.set_node_position(1, Pos2::new(100.0, 100.0));

        editor.begin_editor(idle(Pos2::new(125.0, 130.0)));
        editor.begin_node(1);
        editor.set_node_name("first");
        editor.end_node();
        editor.begin_node(2);
        editor.set_node_name("second");
        editor.end_node();
        editor.end_editor();

        assert_eq!(editor.hovered_node(), Some(2));
        let titles: Vec<_> = editor
            .draw_commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(titles, vec!["first", "second"]);

        let hovered_body = editor
            .draw_commands()
            .iter()
            .rposition(|c| {
                matches!(c, DrawCommand::RectFilled { color, .. } if *color == editor.style().colors.node_background_hovered)
            });
        let idle_body = editor
            .draw_commands()
            .iter()
            .position(|c| {
                matches!(c, DrawCommand::RectFilled { color, .. } if *color == editor.style().colors.node_background)
            });
        assert!(idle_body.is_some());
        assert!(idle_body < hovered_body);
    }

    #[test]
    fn test_state_round_trip_through_editor() {
        let mut editor = editor();
        frame(&mut editor, idle(Pos2::ZERO));
        editor.context_mut().panning = Vec2::new(12.0, -7.0);
        let saved = editor.save_current_state();

        let previous = editor.swap_context(EditorContext::new());
        assert!(previous.nodes().contains(1));
        assert!(editor.context().nodes().is_empty());

        editor.load_current_state(&saved);
        assert_eq!(editor.context().panning, Vec2::new(12.0, -7.0));
        assert_eq!(editor.node_position(2), Some(Pos2::new(300.0, 200.0)));
        assert_eq!(editor.node_position(1), Some(Pos2::new(100.0, 100.0)));
    }

    #[test]
    #[should_panic(expected = "end_node called in Editor scope")]
    fn test_end_node_without_begin_panics() {
        let mut editor = editor();
        editor.begin_editor(idle(Pos2::ZERO));
        editor.end_node();
    }

    #[test]
    #[should_panic(expected = "begin_editor called in Editor scope")]
    fn test_nested_editor_panics() {
        let mut editor = editor();
        editor.begin_editor(idle(Pos2::ZERO));
        editor.begin_editor(idle(Pos2::ZERO));
    }

    #[test]
    #[should_panic(expected = "begin_node called in Links scope")]
    fn test_node_after_link_panics() {
        let mut editor = editor();
        editor.begin_editor(idle(Pos2::ZERO));
        editor.link(1, 2, 3);
        editor.begin_node(4);
    }

    #[test]
    #[should_panic(expected = "end_attribute called in Node scope")]
    fn test_unbalanced_attribute_panics() {
        let mut editor = editor();
        editor.begin_editor(idle(Pos2::ZERO));
        editor.begin_node(1);
        editor.end_attribute();
    }

    #[test]
    #[should_panic(expected = "hovered_node called in Editor scope")]
    fn test_query_inside_frame_panics() {
        let mut editor = editor();
        editor.begin_editor(idle(Pos2::ZERO));
        let _ = editor.hovered_node();
    }

    #[test]
    #[should_panic(expected = "empty color style stack")]
    fn test_pop_empty_color_stack_panics() {
        let mut editor = editor();
        editor.pop_color_style();
    }
}
