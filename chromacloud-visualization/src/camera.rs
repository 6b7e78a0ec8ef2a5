//! Orbit camera for the scene viewer

use nalgebra::{Matrix4, Perspective3, Point3, Unit, UnitQuaternion, Vector3};

/// Closest the camera may get to the target
pub const MIN_DISTANCE: f32 = 0.05;
pub const MAX_DISTANCE: f32 = 50.0;

/// Orbiting stops this close (as a cosine) to looking straight along `up`
const MAX_PITCH_COS: f32 = 0.995;

/// A 3D camera orbiting a target point
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    home: (Point3<f32>, Point3<f32>),
}

impl Camera {
    /// Create a new camera; `reset` returns to this position and target
    pub fn new(
        position: Point3<f32>,
        target: Point3<f32>,
        up: Vector3<f32>,
        fov: f32,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self {
            position,
            target,
            up,
            fov,
            aspect_ratio,
            near,
            far,
            home: (position, target),
        }
    }

    /// Default scene view: looking at the origin from `(1.25, 1.25, 1.25)` with Z up
    pub fn scene_default(aspect_ratio: f32) -> Self {
        Self::new(
            Point3::new(1.25, 1.25, 1.25),
            Point3::origin(),
            Vector3::z(),
            std::f32::consts::FRAC_PI_4,
            aspect_ratio,
            0.01,
            100.0,
        )
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Perspective3::new(self.aspect_ratio, self.fov, self.near, self.far).into_inner()
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.target).norm()
    }

    /// Rotate the camera around the target.
    ///
    /// `horizontal` turns around the up axis, `vertical` tilts toward or away
    /// from it; both in radians.
    pub fn orbit(&mut self, horizontal: f32, vertical: f32) {
        let radius = self.distance();
        let up_axis = self.up.normalize();
        let up = Unit::new_unchecked(up_axis);

        let yaw = UnitQuaternion::from_axis_angle(&up, -horizontal);
        let mut offset = yaw * (self.position - self.target);

        let right = offset.cross(&up_axis);
        if right.norm() > f32::EPSILON {
            let pitch = UnitQuaternion::from_axis_angle(&Unit::new_normalize(right), vertical);
            let tilted = pitch * offset;
            if tilted.normalize().dot(&up_axis).abs() < MAX_PITCH_COS {
                offset = tilted;
            }
        }

        self.position = self.target + offset.normalize() * radius;
    }

    /// Slide camera and target across the view plane, scaled by distance
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = (self.target - self.position).normalize();
        let right = forward.cross(&self.up).normalize();
        let up = right.cross(&forward);
        let shift = (right * -dx + up * dy) * self.distance();
        self.position += shift;
        self.target += shift;
    }

    /// Move toward (`delta > 0`) or away from the target
    pub fn zoom(&mut self, delta: f32) {
        let direction = (self.position - self.target).normalize();
        let distance = (self.distance() * (1.0 - delta)).clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.position = self.target + direction * distance;
    }

    /// Return to the position the camera was created with
    pub fn reset(&mut self) {
        (self.position, self.target) = self.home;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::scene_default(4.0 / 3.0)
    }
}
