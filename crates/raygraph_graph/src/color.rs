// SPDX-License-Identifier: MIT OR Apache-2.0
//! Highlight color catalog and per-entity color state.
//!
//! Every vertex and edge carries a [`ColorState`] that the presentation
//! rules overwrite. The catalog is closed: rules select colors by name and
//! the throughput gradient is only legal on the gradient-capable yellow.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Named highlight colors available to presentation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphColor {
    /// Secondary highlight (translucent)
    YellowTransparent,
    /// Primary highlight (translucent)
    BlueTransparent,
    /// Gradient-capable throughput color
    Yellow,
    /// Ray vertex type: final scatter
    Red,
    /// Ray vertex type: entry point
    Green,
    /// Ray vertex type: absorption
    Black,
    /// Neutral highlight / default
    White,
}

impl GraphColor {
    /// Base RGBA for this color, normalized channels
    pub fn rgba(&self) -> [f32; 4] {
        match self {
            GraphColor::YellowTransparent => [1.0, 0.9, 0.2, 0.45],
            GraphColor::BlueTransparent => [0.25, 0.45, 1.0, 0.45],
            GraphColor::Yellow => [1.0, 1.0, 1.0, 1.0],
            GraphColor::Red => [0.9, 0.1, 0.1, 1.0],
            GraphColor::Green => [0.1, 0.8, 0.2, 1.0],
            GraphColor::Black => [0.02, 0.02, 0.02, 1.0],
            GraphColor::White => [0.95, 0.95, 0.95, 1.0],
        }
    }
}

/// Errors from color state transitions
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorStateError {
    /// Gradient shading requested while not in the gradient-capable color
    #[error("throughput gradient requires the yellow gradient color, current is {current:?}")]
    NotGradientCapable {
        /// Color the entity was in when the gradient was requested
        current: GraphColor,
    },
}

/// Mutable color state of a renderable entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorState {
    color: GraphColor,
    rgba: [f32; 4],
}

impl ColorState {
    /// New state in the given color
    pub fn new(color: GraphColor) -> Self {
        Self { color, rgba: color.rgba() }
    }

    /// Current named color
    pub fn color(&self) -> GraphColor {
        self.color
    }

    /// Current RGBA, including any applied gradient
    pub fn rgba(&self) -> [f32; 4] {
        self.rgba
    }

    /// Overwrite with a catalog color, resetting any gradient.
    pub fn set_color(&mut self, color: GraphColor) {
        self.color = color;
        self.rgba = color.rgba();
    }

    /// Apply the throughput gradient for a weight in `[0, 1]`.
    ///
    /// Sets the blue channel to `1 - weight`. Only legal while the entity
    /// is in the [`GraphColor::Yellow`] gradient color; anything else is a
    /// misuse of the presentation pass and is reported as an error.
    pub fn yellow_gradient(&mut self, weight: f32) -> Result<(), ColorStateError> {
        if self.color != GraphColor::Yellow {
            return Err(ColorStateError::NotGradientCapable { current: self.color });
        }
        self.rgba[2] = 1.0 - weight;
        Ok(())
    }
}

impl Default for ColorState {
    fn default() -> Self {
        Self::new(GraphColor::White)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_sets_blue_channel() {
        let mut state = ColorState::new(GraphColor::Yellow);
        state.yellow_gradient(0.25).unwrap();
        assert_eq!(state.rgba()[2], 0.75);

        state.yellow_gradient(1.0).unwrap();
        assert_eq!(state.rgba()[2], 0.0);
    }

    #[test]
    fn test_gradient_requires_yellow() {
        let mut state = ColorState::new(GraphColor::White);
        let err = state.yellow_gradient(0.5).unwrap_err();
        assert_eq!(err, ColorStateError::NotGradientCapable { current: GraphColor::White });
        // State untouched on error
        assert_eq!(state.rgba(), GraphColor::White.rgba());
    }

    #[test]
    fn test_set_color_resets_gradient() {
        let mut state = ColorState::new(GraphColor::Yellow);
        state.yellow_gradient(0.9).unwrap();
        state.set_color(GraphColor::Yellow);
        assert_eq!(state.rgba(), GraphColor::Yellow.rgba());
    }
}
