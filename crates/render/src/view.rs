use glam::{Mat4, Vec3};
use walkthrough_common::Pose;

/// First-person camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Heading in radians; 0 looks down -Z.
    pub yaw: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Output width / height.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::ZERO,
            yaw: 0.0,
            fov_degrees: 75.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl RenderView {
    pub fn from_pose(pose: Pose) -> Self {
        let mut view = Self::default();
        view.set_pose(pose);
        view
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.eye = pose.position;
        self.yaw = pose.yaw;
    }

    /// Recompute the aspect ratio for a new output size. Must run before the
    /// next frame is drawn at that size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
        tracing::debug!(width, height, aspect = self.aspect, "view resized");
    }

    pub fn forward(&self) -> Vec3 {
        Pose::new(self.eye, self.yaw).forward()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.eye + self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
