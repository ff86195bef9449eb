//! Listener state
//!
//! The listener is packed into a fixed 12-float block laid out the way the
//! device expects it: position, velocity, then the "at" and "up" halves of
//! the orientation pair.

use crate::math::{CameraPose, Vec3};

/// Number of floats in the packed listener block
pub const LISTENER_FLOATS: usize = 12;

/// Packed listener state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ListenerState([f32; LISTENER_FLOATS]);

impl ListenerState {
    /// Pack a camera pose and velocity.
    ///
    /// The forward vector is `position - target` on X and Y and
    /// `target - position` on Z to match the device's handedness.
    pub fn from_camera(camera: &CameraPose, velocity: Vec3) -> Self {
        let pos = camera.position;
        let at = camera.target;
        let up = camera.up;

        Self([
            pos.x,
            pos.y,
            pos.z,
            velocity.x,
            velocity.y,
            velocity.z,
            pos.x - at.x,
            pos.y - at.y,
            at.z - pos.z,
            up.x,
            up.y,
            up.z,
        ])
    }

    /// Listener position
    pub fn position(&self) -> [f32; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// Listener velocity
    pub fn velocity(&self) -> [f32; 3] {
        [self.0[3], self.0[4], self.0[5]]
    }

    /// Orientation pair (at followed by up)
    pub fn orientation(&self) -> [f32; 6] {
        let mut out = [0.0; 6];
        out.copy_from_slice(&self.0[6..]);
        out
    }

    /// Raw packed block
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_packing() {
        let camera = CameraPose::new(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(4.0, 6.0, 8.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let state = ListenerState::from_camera(&camera, Vec3::new(0.5, 0.0, -0.5));

        assert_eq!(state.position(), [1.0, 2.0, 3.0]);
        assert_eq!(state.velocity(), [0.5, 0.0, -0.5]);
        assert_eq!(state.orientation(), [-3.0, -4.0, 5.0, 0.0, 1.0, 0.0]);
        assert_eq!(state.as_slice().len(), LISTENER_FLOATS);
    }

    #[test]
    fn test_listener_default_is_zeroed() {
        let state = ListenerState::default();
        assert!(state.as_slice().iter().all(|v| *v == 0.0));
    }
}
