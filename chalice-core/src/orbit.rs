//! Orbit camera controls.
//!
//! The camera circles a target point on a sphere. Dragging rotates it, the wheel dollies it in
//! and out, and a secondary drag pans the target. Rotation and panning ease out with
//! exponential damping, so `update` has to be called once per frame.

use std::f32::consts::PI;

use glam::{Mat4, Vec3};

const EPS: f32 = 1e-6;

/// Radius plus polar (`phi`, from +Y) and azimuthal (`theta`, around +Y from +Z) angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spherical {
    pub radius: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Spherical {
    pub fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius < EPS {
            return Self {
                radius: 0.0,
                phi: 0.0,
                theta: 0.0,
            };
        }
        Self {
            radius,
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            theta: offset.x.atan2(offset.z),
        }
    }

    pub fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

/// Pointer-driven orbit controls around a target.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    spherical: Spherical,
    delta_theta: f32,
    delta_phi: f32,
    pan_offset: Vec3,
    pending_scale: f32,
}

impl OrbitControls {
    /// Starts orbiting `target` from the camera's current `position`.
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            target,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            damping_factor: 0.05,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            spherical: Spherical::from_offset(position - target),
            delta_theta: 0.0,
            delta_phi: 0.0,
            pan_offset: Vec3::ZERO,
            pending_scale: 1.0,
        }
    }

    pub fn eye(&self) -> Vec3 {
        self.target + self.spherical.to_offset()
    }

    pub fn distance(&self) -> f32 {
        self.spherical.radius
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    /// Rotates by a pointer drag of `dx`, `dy` pixels on a viewport `height` pixels tall.
    pub fn rotate(&mut self, dx: f32, dy: f32, height: f32) {
        let height = height.max(1.0);
        self.delta_theta -= 2.0 * PI * dx / height * self.rotate_speed;
        self.delta_phi -= 2.0 * PI * dy / height * self.rotate_speed;
    }

    /// Dollies in for positive `steps` (wheel away from the user) and out for negative.
    pub fn zoom(&mut self, steps: f32) {
        let scale = 0.95_f32.powf(self.zoom_speed);
        self.pending_scale *= scale.powf(steps);
    }

    /// Pans the target by a drag of `dx`, `dy` pixels, keeping the point under the cursor fixed
    /// at the target depth. `fov` is the vertical field of view in degrees.
    pub fn pan(&mut self, dx: f32, dy: f32, height: f32, fov: f32) {
        let height = height.max(1.0);
        let view = self.view_matrix().inverse();
        let right = view.x_axis.truncate();
        let up = view.y_axis.truncate();
        let target_distance = self.distance() * (fov.to_radians() / 2.0).tan();
        let scale = 2.0 * target_distance / height * self.pan_speed;
        self.pan_offset += -right * dx * scale + up * dy * scale;
    }

    /// Advances damping and applies pending input. Returns the new eye position.
    pub fn update(&mut self) -> Vec3 {
        let d = self.damping_factor;

        self.spherical.theta += self.delta_theta * d;
        self.spherical.phi += self.delta_phi * d;
        self.spherical.phi = self.spherical.phi.clamp(EPS, PI - EPS);
        self.spherical.radius =
            (self.spherical.radius * self.pending_scale).clamp(self.min_distance, self.max_distance);
        self.target += self.pan_offset * d;

        self.delta_theta *= 1.0 - d;
        self.delta_phi *= 1.0 - d;
        self.pan_offset *= 1.0 - d;
        self.pending_scale = 1.0;

        self.eye()
    }
}
