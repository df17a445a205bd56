// SPDX-License-Identifier: MIT OR Apache-2.0
//! Free-fly camera for the graph viewport.

use crate::config::ViewerSettings;
use crate::input::InputState;
use raygraph_graph::{CameraFrame, Vec3};

/// Pitch limit in degrees, keeps the camera off the poles
const PITCH_LIMIT: f32 = 80.0;

/// A yaw/pitch fly camera driven once per frame by [`FlyCamera::tick`].
#[derive(Debug, Clone)]
pub struct FlyCamera {
    /// World position
    pub position: Vec3,
    /// Yaw in degrees; 0 looks along +Z
    pub yaw: f32,
    /// Pitch in degrees, clamped to ±[`PITCH_LIMIT`]
    pub pitch: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
    /// Movement speed, units per second
    pub move_speed: f32,
    /// Arrow-key turn speed, degrees per second
    pub turn_speed: f32,
    /// Mouse-drag turn speed
    pub mouse_turn_speed: f32,
    /// Scroll vertical-movement speed
    pub scroll_speed: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -10.0),
            yaw: 0.0,
            pitch: 0.0,
            fov: 60.0,
            near: 0.1,
            far: 10000.0,
            move_speed: 10.0,
            turn_speed: 90.0,
            mouse_turn_speed: 10.0,
            scroll_speed: 10.0,
        }
    }
}

impl FlyCamera {
    /// New camera with speeds taken from the settings
    pub fn from_settings(settings: &ViewerSettings) -> Self {
        Self {
            move_speed: settings.move_speed,
            turn_speed: settings.turn_speed,
            mouse_turn_speed: settings.mouse_turn_speed,
            scroll_speed: settings.scroll_speed,
            ..Self::default()
        }
    }

    /// Frame the primary graph after a load.
    ///
    /// The graph is translated to the origin by the scene, so the camera
    /// backs away on -Z far enough that the box's vertical extent fills the
    /// view: `distance = half_height / tan(fov / 2)`.
    pub fn frame(&mut self, frame: CameraFrame) {
        let half_fov = (self.fov / 2.0).to_radians();
        let half_height = frame.bounding_max.y - frame.center.y;
        let distance = half_height / half_fov.tan();
        self.position = Vec3::new(0.0, 0.0, -distance.max(self.near));
        self.yaw = 0.0;
        self.pitch = 0.0;
    }

    /// Unit forward direction from yaw/pitch
    pub fn forward(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        Vec3::new(
            pitch.cos() * yaw.sin(),
            pitch.sin(),
            pitch.cos() * yaw.cos(),
        )
    }

    /// Unit right direction
    pub fn right(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        // Perpendicular to forward in the horizontal plane
        Vec3::new(yaw.cos(), 0.0, -yaw.sin())
    }

    /// Look-at target for view matrix construction
    pub fn target(&self) -> Vec3 {
        self.position + self.forward()
    }

    /// World up
    pub fn up(&self) -> Vec3 {
        Vec3::new(0.0, 1.0, 0.0)
    }

    /// Advance the camera by one frame of input.
    pub fn tick(&mut self, dt: f32, input: &InputState) {
        // Planar movement ignores pitch so W/S never change altitude
        let forward = Vec3::new(self.forward().x, 0.0, self.forward().z).normalize();
        let right = self.right();

        if input.forward {
            self.position = self.position + forward * (dt * self.move_speed);
        }
        if input.back {
            self.position = self.position - forward * (dt * self.move_speed);
        }
        if input.left {
            self.position = self.position - right * (dt * self.move_speed);
        }
        if input.right {
            self.position = self.position + right * (dt * self.move_speed);
        }
        if input.rise {
            self.position.y += dt * self.move_speed;
        }
        if input.fall {
            self.position.y -= dt * self.move_speed;
        }
        if input.scroll_delta != 0.0 {
            self.position.y += dt * input.scroll_delta * self.scroll_speed;
        }

        if input.turn_right {
            self.yaw += dt * self.turn_speed;
        }
        if input.turn_left {
            self.yaw -= dt * self.turn_speed;
        }
        if input.right_mouse {
            self.yaw += dt * input.mouse_delta[0] * self.mouse_turn_speed;
            self.pitch -= dt * input.mouse_delta[1] * self.mouse_turn_speed;
        }

        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing_distance_from_fov() {
        let mut camera = FlyCamera { fov: 60.0, ..FlyCamera::default() };
        let frame = CameraFrame {
            center: Vec3::zero(),
            bounding_max: Vec3::new(0.0, 3.0, 0.0),
        };
        camera.frame(frame);

        let expected = 3.0 / (30.0f32.to_radians()).tan();
        assert!((camera.position.z + expected).abs() < 1e-4);
        assert_eq!(camera.position.x, 0.0);
    }

    #[test]
    fn test_forward_movement_is_planar() {
        let mut camera = FlyCamera { pitch: 45.0, ..FlyCamera::default() };
        let y_before = camera.position.y;

        let input = InputState { forward: true, ..InputState::default() };
        camera.tick(0.1, &input);

        assert_eq!(camera.position.y, y_before);
        assert!(camera.position.z > -10.0);
    }

    #[test]
    fn test_pitch_clamped() {
        let mut camera = FlyCamera::default();
        let input = InputState {
            right_mouse: true,
            mouse_delta: [0.0, -10000.0],
            ..InputState::default()
        };
        camera.tick(1.0, &input);
        assert_eq!(camera.pitch, 80.0);
    }

    #[test]
    fn test_degenerate_frame_keeps_camera_in_front() {
        // A flat graph (zero height) must not place the camera at the origin
        let mut camera = FlyCamera::default();
        camera.frame(CameraFrame {
            center: Vec3::zero(),
            bounding_max: Vec3::new(5.0, 0.0, 0.0),
        });
        assert!(camera.position.z <= -camera.near);
    }
}
