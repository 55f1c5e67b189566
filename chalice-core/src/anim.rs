//! The floating idle animation applied around the model.

use glam::Vec3;

use crate::scene::Transform;

/// A gentle bob and sway, evaluated from elapsed time.
///
/// With `t = offset + elapsed` and `w = t / 4 * speed`, the pose is a rotation of
/// `(cos w / 8, sin w / 8, sin w / 20) * rotation_intensity` and a vertical offset of
/// `sin w / 10` remapped into `floating_range`, times `float_intensity`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatAnimation {
    pub speed: f32,
    pub rotation_intensity: f32,
    pub float_intensity: f32,
    pub floating_range: (f32, f32),
    pub offset: f32,
}

impl Default for FloatAnimation {
    fn default() -> Self {
        Self {
            speed: 1.0,
            rotation_intensity: 1.0,
            float_intensity: 1.0,
            floating_range: (-0.1, 0.1),
            offset: 0.0,
        }
    }
}

impl FloatAnimation {
    /// The settings the chalice floats with.
    pub fn chalice() -> Self {
        Self {
            speed: 2.0,
            rotation_intensity: 1.0,
            float_intensity: 2.0,
            ..Self::default()
        }
    }

    /// Picks a random phase so separate sessions do not start in lockstep.
    pub fn with_random_offset(self) -> Self {
        Self {
            offset: rand::random::<f32>() * 10000.0,
            ..self
        }
    }

    /// Returns the animated local transform after `elapsed` seconds.
    pub fn pose(&self, elapsed: f32) -> Transform {
        let t = self.offset + elapsed;
        let w = t / 4.0 * self.speed;

        let rotation = Vec3::new(w.cos() / 8.0, w.sin() / 8.0, w.sin() / 20.0)
            * self.rotation_intensity;

        let (lo, hi) = self.floating_range;
        let y = w.sin() / 10.0;
        let y = lo + (y + 0.1) * (hi - lo) / 0.2;

        Transform {
            translation: Vec3::new(0.0, y * self.float_intensity, 0.0),
            rotation,
            scale: Vec3::ONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_pose_at_phase_zero() {
        let pose = FloatAnimation::chalice().pose(0.0);
        assert!(close(pose.rotation.x, 1.0 / 8.0));
        assert!(close(pose.rotation.y, 0.0));
        assert!(close(pose.rotation.z, 0.0));
        assert!(close(pose.translation.y, 0.0));
        assert_eq!(pose.scale, Vec3::ONE);
    }

    #[test]
    fn test_pose_at_quarter_period() {
        // w = t / 4 * 2 = pi / 2 when t = pi.
        let pose = FloatAnimation::chalice().pose(std::f32::consts::PI);
        assert!(close(pose.rotation.x, 0.0));
        assert!(close(pose.rotation.y, 1.0 / 8.0));
        assert!(close(pose.rotation.z, 1.0 / 20.0));
        assert!(close(pose.translation.y, 0.1 * 2.0));
    }

    #[test]
    fn test_bob_stays_in_range() {
        let anim = FloatAnimation::chalice().with_random_offset();
        for i in 0..200 {
            let y = anim.pose(i as f32 * 0.37).translation.y;
            assert!(y.abs() <= 0.2 + 1e-5);
        }
    }

    #[test]
    fn test_floating_range_remaps_height() {
        let anim = FloatAnimation {
            floating_range: (0.0, 1.0),
            ..FloatAnimation::default()
        };
        // sin(w) = 1 maps the top of the range.
        let pose = anim.pose(2.0 * std::f32::consts::PI);
        assert!(close(pose.translation.y, 1.0));
    }
}
