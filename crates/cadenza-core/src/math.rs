//! Math utilities
//!
//! Re-exports from glam and the camera pose consumed by listener updates.

pub use glam::Vec3;

use serde::{Deserialize, Serialize};

/// Camera pose supplied by the frame loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    /// Eye position in world space
    pub position: Vec3,
    /// Point the camera looks at
    pub target: Vec3,
    /// Up vector
    pub up: Vec3,
}

impl CameraPose {
    /// Create a camera pose
    pub fn new(position: Vec3, target: Vec3, up: Vec3) -> Self {
        Self { position, target, up }
    }

    /// Create a pose at `position` looking along `direction` with +Y up
    pub fn looking(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            target: position + direction,
            up: Vec3::Y,
        }
    }

    /// Direction from the eye to the target (not normalized)
    pub fn view_direction(&self) -> Vec3 {
        self.target - self.position
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::looking(Vec3::ZERO, Vec3::NEG_Z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_default() {
        let camera = CameraPose::default();
        assert_eq!(camera.position, Vec3::ZERO);
        assert_eq!(camera.view_direction(), Vec3::NEG_Z);
        assert_eq!(camera.up, Vec3::Y);
    }

    #[test]
    fn test_camera_looking() {
        let camera = CameraPose::looking(Vec3::new(1.0, 2.0, 3.0), Vec3::X);
        assert_eq!(camera.target, Vec3::new(2.0, 2.0, 3.0));
    }
}
