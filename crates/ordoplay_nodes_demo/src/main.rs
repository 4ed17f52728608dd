// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scripted walkthrough of the node editor.
//!
//! Declares a small graph, drags a link between two pins with synthetic
//! pointer input, adds the link the editor reports, then renders the result
//! through egui and prints the saved layout.
//!
//! Usage: `ordoplay_nodes_demo [style.ron]`

use egui::{FontId, Pos2, Rect, Vec2};
use ordoplay_nodes::{
    paint, ButtonState, EditorContext, EguiTextMeasure, FrameInput, NodeEditor, Style,
};
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const CANVAS_SIZE: Vec2 = Vec2::new(800.0, 600.0);

/// Graph the demo declares every frame
#[derive(Default)]
struct Graph {
    links: Vec<(i32, i32, i32)>,
    next_link_id: i32,
}

impl Graph {
    fn declare(&self, editor: &mut NodeEditor) {
        editor.begin_node(1);
        editor.set_node_name("Time");
        editor.begin_output_attribute(10);
        editor.text("seconds");
        editor.end_attribute();
        editor.end_node();

        editor.begin_node(2);
        editor.set_node_name("Sine");
        editor.begin_input_attribute(20);
        editor.text("phase");
        editor.end_attribute();
        editor.begin_output_attribute(21);
        editor.text("value");
        editor.end_attribute();
        editor.end_node();

        for &(id, start, end) in &self.links {
            editor.link(id, start, end);
        }
    }

    fn add_link(&mut self, start: i32, end: i32) {
        self.next_link_id += 1;
        self.links.push((self.next_link_id, start, end));
    }
}

fn main() {
    let env_filter = match "ordoplay_nodes=debug".parse() {
        Ok(directive) => tracing_subscriber::EnvFilter::from_default_env().add_directive(directive),
        Err(_) => tracing_subscriber::EnvFilter::from_default_env(),
    };
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting node editor demo v{}", env!("CARGO_PKG_VERSION"));

    let style = match std::env::args().nth(1) {
        Some(path) => Style::load(Path::new(&path)).unwrap_or_else(|e| {
            tracing::error!("Falling back to the default style: {e}");
            Style::default()
        }),
        None => Style::default(),
    };

    let mut graph = Graph::default();
    let mut editor = NodeEditor::new().with_style(style.clone());
    editor.set_node_position(2, Pos2::new(300.0, 200.0));

    let canvas = Rect::from_min_size(Pos2::ZERO, CANVAS_SIZE);
    // Output pin 10 of "Time" to input pin 20 of "Sine"
    let script = [
        (Pos2::new(163.0, 145.0), ButtonState::PRESSED),
        (Pos2::new(240.0, 200.0), ButtonState::HELD),
        (Pos2::new(300.0, 245.0), ButtonState::RELEASED),
    ];

    let mut previous = script[0].0;
    for (pointer, primary) in script {
        let input = FrameInput {
            pointer: Some(pointer),
            pointer_delta: pointer - previous,
            primary,
            ..FrameInput::new(canvas)
        };
        previous = pointer;

        editor.begin_editor(input);
        graph.declare(&mut editor);
        editor.end_editor();

        if let Some(pin) = editor.link_started() {
            tracing::info!("Dragging a link from pin {pin}");
        }
        if let Some((start, end)) = editor.link_created() {
            tracing::info!("Link created from pin {start} to pin {end}");
            graph.add_link(start, end);
        }
        if editor.is_link_dropped() {
            tracing::info!("Link dropped");
        }
    }

    let context = editor.swap_context(EditorContext::new());
    render(&graph, context, style);
}

/// Draw one frame of the graph through egui with real font metrics
fn render(graph: &Graph, context: EditorContext, style: Style) {
    let ctx = egui::Context::default();
    let font = FontId::proportional(14.0);
    let mut editor = NodeEditor::new()
        .with_style(style)
        .with_text_measure(EguiTextMeasure::new(ctx.clone(), font.clone()));
    editor.swap_context(context);

    let raw_input = egui::RawInput {
        screen_rect: Some(Rect::from_min_size(Pos2::ZERO, CANVAS_SIZE)),
        ..Default::default()
    };
    let output = ctx.run(raw_input, |ctx| {
        egui::CentralPanel::default().show(ctx, |ui| {
            let canvas = ui.available_rect_before_wrap();
            let input = ctx.input(|i| FrameInput::from_egui(i, canvas));

            editor.begin_editor(input);
            graph.declare(&mut editor);
            editor.end_editor();

            paint(ui.painter(), editor.draw_commands(), &font);
        });
    });

    tracing::info!(
        "Rendered {} draw commands into {} shapes",
        editor.draw_commands().len(),
        output.shapes.len()
    );
    println!("{}", editor.save_current_state());
}
