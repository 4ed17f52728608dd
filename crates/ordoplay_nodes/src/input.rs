// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pointer input sampled once per frame.

use egui::{PointerButton, Pos2, Rect, Vec2};

/// State of one pointer button during a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    /// Held down at the end of the frame
    pub down: bool,
    /// Went down during the frame
    pub pressed: bool,
    /// Went up during the frame
    pub released: bool,
}

impl ButtonState {
    /// Button held since an earlier frame
    pub const HELD: Self = Self {
        down: true,
        pressed: false,
        released: false,
    };

    /// Button pressed this frame
    pub const PRESSED: Self = Self {
        down: true,
        pressed: true,
        released: false,
    };

    /// Button released this frame
    pub const RELEASED: Self = Self {
        down: false,
        pressed: false,
        released: true,
    };
}

/// Everything the editor reads from the pointer in one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Screen-space area the editor occupies
    pub canvas: Rect,
    /// Pointer position in screen space, `None` when the pointer is gone
    pub pointer: Option<Pos2>,
    /// Pointer movement since the previous frame
    pub pointer_delta: Vec2,
    /// Button used for selection, node dragging and linking
    pub primary: ButtonState,
    /// Button used for panning
    pub pan: ButtonState,
}

impl FrameInput {
    /// Input for a frame with the pointer at rest inside `canvas`
    pub fn new(canvas: Rect) -> Self {
        Self {
            canvas,
            pointer: None,
            pointer_delta: Vec2::ZERO,
            primary: ButtonState::default(),
            pan: ButtonState::default(),
        }
    }

    /// Sample an egui input state. Panning uses the middle button.
    pub fn from_egui(input: &egui::InputState, canvas: Rect) -> Self {
        let button = |button: PointerButton| ButtonState {
            down: input.pointer.button_down(button),
            pressed: input.pointer.button_pressed(button),
            released: input.pointer.button_released(button),
        };
        Self {
            canvas,
            pointer: input.pointer.hover_pos(),
            pointer_delta: input.pointer.delta(),
            primary: button(PointerButton::Primary),
            pan: button(PointerButton::Middle),
        }
    }

    /// Pointer position, if it is inside the canvas
    pub fn pointer_in_canvas(&self) -> Option<Pos2> {
        self.pointer.filter(|pos| self.canvas.contains(*pos))
    }

    /// Whether the pointer moved this frame
    pub fn pointer_moved(&self) -> bool {
        self.pointer_delta != Vec2::ZERO
    }
}

impl Default for FrameInput {
    /// Input with an empty canvas, which no pointer position falls inside
    fn default() -> Self {
        Self::new(Rect::NOTHING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_input_is_idle() {
        let input = FrameInput::default();
        assert_eq!(input.canvas, Rect::NOTHING);
        assert_eq!(input.pointer, None);
        assert!(!input.primary.down);
        assert!(!input.pointer_moved());
    }

    #[test]
    fn test_pointer_outside_canvas_is_ignored() {
        let canvas = Rect::from_min_max(Pos2::ZERO, Pos2::new(100.0, 100.0));
        let input = FrameInput {
            pointer: Some(Pos2::new(150.0, 50.0)),
            ..FrameInput::new(canvas)
        };
        assert_eq!(input.pointer_in_canvas(), None);

        let input = FrameInput {
            pointer: Some(Pos2::new(50.0, 50.0)),
            ..FrameInput::new(canvas)
        };
        assert_eq!(input.pointer_in_canvas(), Some(Pos2::new(50.0, 50.0)));
    }
}
