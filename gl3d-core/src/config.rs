//! View configuration.
//!
//! Projection, initial camera and input sensitivity, loaded from TOML (file
//! IO left to the front end). Every field has a default.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::camera::{Camera, CameraMode};
use crate::error::Error;
use crate::input::CameraControls;
use crate::math::Vec3;
use crate::projection::Projection;
use crate::renderer::UniformNames;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Vertical field of view in radians.
    pub fov: f64,
    /// Height over width of the projection volume.
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    /// Initial observer position.
    pub position: [f64; 3],
    pub azimuth: f64,
    pub zenith: f64,
    pub radius: f64,
    pub first_person: bool,
    /// Distance per movement key press.
    pub move_speed: f64,
    /// Radians turned by a drag across the full surface width.
    pub drag_scale: f64,
    pub uniforms: UniformNames,
    /// Frame rate the terminal front end aims for.
    pub target_fps: u32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            fov: PI / 3.0,
            aspect: 1.0,
            near: 1.0,
            far: 60.0,
            position: [20.0, 20.0, 10.0],
            azimuth: PI * 1.25,
            zenith: PI * -0.125,
            radius: 1.0,
            first_person: true,
            move_speed: 1.0,
            drag_scale: PI,
            uniforms: UniformNames::default(),
            target_fps: 30,
        }
    }
}

impl ViewConfig {
    /// Parses and validates config from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, Error> {
        toml::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(self.fov > 0.0 && self.fov < PI) {
            return Err(Error::Config(format!("fov {} is outside (0, π)", self.fov)));
        }
        if self.aspect <= 0.0 {
            return Err(Error::Config(format!("aspect {} must be positive", self.aspect)));
        }
        if !(self.near > 0.0 && self.near < self.far) {
            return Err(Error::Config(format!(
                "near {} and far {} must satisfy 0 < near < far",
                self.near, self.far
            )));
        }
        if self.target_fps == 0 {
            return Err(Error::Config("target_fps must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn camera(&self) -> Camera {
        Camera::new(
            Vec3::from_array(self.position),
            self.azimuth,
            self.zenith,
            self.radius,
            CameraMode::from_first_person(self.first_person),
        )
    }

    pub fn projection(&self) -> Projection {
        Projection::perspective(self.fov, self.aspect, self.near, self.far)
    }

    pub fn controls(&self) -> CameraControls {
        CameraControls {
            move_speed: self.move_speed,
            drag_scale: self.drag_scale,
            ..CameraControls::default()
        }
    }
}
