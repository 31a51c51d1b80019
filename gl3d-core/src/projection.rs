/// Projection settings and screen mapping
use crate::math::{Mat4, Point3H, Vec3};

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Projection volume.
///
/// `ratio` is height over width of the target surface. The orthographic
/// volume is `ortho_height` tall and `ortho_height / ratio` wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub mode: ProjectionMode,
    pub fov: f64,
    pub ratio: f64,
    pub near: f64,
    pub far: f64,
    pub ortho_height: f64,
}

impl Projection {
    pub fn perspective(fov: f64, ratio: f64, near: f64, far: f64) -> Self {
        Self {
            mode: ProjectionMode::Perspective,
            fov,
            ratio,
            near,
            far,
            ortho_height: 10.0,
        }
    }

    pub fn orthographic(height: f64, ratio: f64, near: f64, far: f64) -> Self {
        Self {
            mode: ProjectionMode::Orthographic,
            ratio,
            near,
            far,
            ortho_height: height,
            ..Self::default()
        }
    }

    /// Same volume fitted to a surface of the given size.
    pub fn with_viewport(self, width: u32, height: u32) -> Self {
        if width == 0 {
            return self;
        }
        Self {
            ratio: height as f64 / width as f64,
            ..self
        }
    }

    /// Switches between perspective and orthographic.
    pub fn toggled(self) -> Self {
        let mode = match self.mode {
            ProjectionMode::Perspective => ProjectionMode::Orthographic,
            ProjectionMode::Orthographic => ProjectionMode::Perspective,
        };
        Self { mode, ..self }
    }

    pub fn matrix(&self) -> Mat4 {
        match self.mode {
            ProjectionMode::Perspective => Mat4::persp_rh(self.fov, self.ratio, self.near, self.far),
            ProjectionMode::Orthographic => Mat4::ortho_rh(
                self.ortho_height / self.ratio,
                self.ortho_height,
                self.near,
                self.far,
            ),
        }
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::perspective(std::f64::consts::FRAC_PI_4, 1.0, 0.01, 60.0)
    }
}

/// Project a 3D point to screen space through a combined
/// model-view-projection matrix.
///
/// Returns pixel x, pixel y (growing downwards) and the normalized depth, or
/// nothing when the point falls outside the clip volume.
pub fn project_to_screen(
    point: Vec3,
    mvp: &Mat4,
    width: u32,
    height: u32,
) -> Option<(f32, f32, f32)> {
    let clip = Point3H::from(point).mul_mat4(mvp);

    // Prevent division by near-zero w
    if clip.w.abs() < 1e-9 {
        return None;
    }
    let ndc = clip.dehomog()?;

    if !(-1.0..=1.0).contains(&ndc.x)
        || !(-1.0..=1.0).contains(&ndc.y)
        || !(0.0..=1.0).contains(&ndc.z)
    {
        return None;
    }

    let screen_x = (ndc.x + 1.0) * 0.5 * width as f64;
    let screen_y = (1.0 - ndc.y) * 0.5 * height as f64;
    Some((screen_x as f32, screen_y as f32, ndc.z as f32))
}
