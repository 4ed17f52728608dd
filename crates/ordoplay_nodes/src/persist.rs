// SPDX-License-Identifier: MIT OR Apache-2.0
//! Text save format for editor layout.
//!
//! ```text
//! [editor]
//! panning=12,-7
//!
//! [node.3]
//! origin=100,250
//! ```
//!
//! Coordinates are stored as integers, truncated toward zero. Loading is
//! lenient: comments (`;`), blank lines, unknown sections, unknown keys and
//! malformed values are skipped.

use crate::context::EditorContext;
use egui::{Pos2, Vec2};

/// Section the loader is currently routing lines to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    /// Before the first header, or after an unrecognized one
    Ignored,
    /// `[editor]`
    Editor,
    /// `[node.<id>]`
    Node(i32),
}

impl Section {
    fn parse(header: &str) -> Self {
        if header == "editor" {
            return Self::Editor;
        }
        match header.strip_prefix("node.").map(str::parse) {
            Some(Ok(id)) => Self::Node(id),
            _ => Self::Ignored,
        }
    }
}

/// Serialize the panning offset and every live node's origin
pub fn save_state(editor: &EditorContext) -> String {
    let mut out = format!(
        "[editor]\npanning={},{}\n",
        editor.panning.x as i32, editor.panning.y as i32
    );
    for (_, node) in editor.nodes.live() {
        out.push_str(&format!(
            "\n[node.{}]\norigin={},{}\n",
            node.id, node.origin.x as i32, node.origin.y as i32
        ));
    }
    out
}

/// Apply saved state to `editor`, creating nodes that do not exist yet
pub fn load_state(editor: &mut EditorContext, data: &str) {
    let mut section = Section::Ignored;

    for line in data.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = Section::parse(header);
            match section {
                Section::Node(id) => {
                    editor.nodes.find_or_create(id);
                }
                Section::Ignored => {
                    tracing::debug!("Ignoring unknown section [{}]", header);
                }
                Section::Editor => {}
            }
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            tracing::debug!("Skipping malformed line {:?}", line);
            continue;
        };

        match (section, key) {
            (Section::Editor, "panning") => match parse_pair(value) {
                Some((x, y)) => editor.panning = Vec2::new(x, y),
                None => tracing::debug!("Skipping malformed panning {:?}", value),
            },
            (Section::Node(id), "origin") => match parse_pair(value) {
                Some((x, y)) => editor.set_node_origin(id, Pos2::new(x, y)),
                None => tracing::debug!("Skipping malformed origin {:?} for node {}", value, id),
            },
            _ => {}
        }
    }
}

fn parse_pair(value: &str) -> Option<(f32, f32)> {
    let (x, y) = value.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}
