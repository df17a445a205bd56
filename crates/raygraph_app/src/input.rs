// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-frame input state collected from winit events.

use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::keyboard::KeyCode;

/// Held keys, mouse deltas and scroll state for one frame.
///
/// Key booleans persist while held; deltas accumulate between frames and
/// are cleared by [`InputState::end_frame`].
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// W held: move forward
    pub forward: bool,
    /// S held: move backward
    pub back: bool,
    /// A held: strafe left
    pub left: bool,
    /// D held: strafe right
    pub right: bool,
    /// Up arrow held: move up
    pub rise: bool,
    /// Down arrow held: move down
    pub fall: bool,
    /// Left arrow held: turn left
    pub turn_left: bool,
    /// Right arrow held: turn right
    pub turn_right: bool,
    /// `[` held: shrink graph elements
    pub shrink: bool,
    /// `]` held: grow graph elements
    pub grow: bool,
    /// Right mouse button held (mouse-look)
    pub right_mouse: bool,
    /// Cursor movement since last frame, pixels
    pub mouse_delta: [f32; 2],
    /// Scroll movement since last frame, lines
    pub scroll_delta: f32,
    pub(crate) last_cursor: Option<[f32; 2]>,
}

impl InputState {
    /// Record a key press or release
    pub fn on_key(&mut self, key: KeyCode, state: ElementState) {
        let pressed = state.is_pressed();
        match key {
            KeyCode::KeyW => self.forward = pressed,
            KeyCode::KeyS => self.back = pressed,
            KeyCode::KeyA => self.left = pressed,
            KeyCode::KeyD => self.right = pressed,
            KeyCode::ArrowUp => self.rise = pressed,
            KeyCode::ArrowDown => self.fall = pressed,
            KeyCode::ArrowLeft => self.turn_left = pressed,
            KeyCode::ArrowRight => self.turn_right = pressed,
            KeyCode::BracketLeft => self.shrink = pressed,
            KeyCode::BracketRight => self.grow = pressed,
            _ => {}
        }
    }

    /// Record a mouse button change
    pub fn on_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Right {
            self.right_mouse = state.is_pressed();
        }
    }

    /// Record a cursor position, accumulating the delta
    pub fn on_cursor_moved(&mut self, x: f32, y: f32) {
        if let Some(last) = self.last_cursor {
            self.mouse_delta[0] += x - last[0];
            self.mouse_delta[1] += y - last[1];
        }
        self.last_cursor = Some([x, y]);
    }

    /// Record scroll movement
    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        match delta {
            MouseScrollDelta::LineDelta(_, y) => self.scroll_delta += y,
            MouseScrollDelta::PixelDelta(pos) => self.scroll_delta += pos.y as f32 / 20.0,
        }
    }

    /// Clear accumulated deltas at the end of a frame
    pub fn end_frame(&mut self) {
        self.mouse_delta = [0.0, 0.0];
        self.scroll_delta = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_state_tracks_press_and_release() {
        let mut input = InputState::default();
        input.on_key(KeyCode::KeyW, ElementState::Pressed);
        assert!(input.forward);
        input.on_key(KeyCode::KeyW, ElementState::Released);
        assert!(!input.forward);
    }

    #[test]
    fn test_mouse_delta_accumulates_until_end_frame() {
        let mut input = InputState::default();
        // First sample only establishes the reference position
        input.on_cursor_moved(100.0, 100.0);
        input.on_cursor_moved(105.0, 98.0);
        input.on_cursor_moved(107.0, 98.0);
        assert_eq!(input.mouse_delta, [7.0, -2.0]);

        input.end_frame();
        assert_eq!(input.mouse_delta, [0.0, 0.0]);
        // Reference position survives the frame boundary
        input.on_cursor_moved(110.0, 98.0);
        assert_eq!(input.mouse_delta, [3.0, 0.0]);
    }
}
