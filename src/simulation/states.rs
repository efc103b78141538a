//! Core state types shared by every gravity source.
//!
//! - `Particle`   one point mass with identity, extent and kinematic state
//! - `Checkpoint` copy of a member's particles at a substep boundary
//!
//! Everything is 3D and uses `NVec3` (nalgebra `Vector3<f64>`).

use nalgebra::Vector3;

use crate::simulation::error::{BridgeError, Result};

pub type NVec3 = Vector3<f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub name: String, // identity, used in logs and reports
    pub x: NVec3, // position
    pub v: NVec3, // velocity
    pub m: f64, // mass
    pub radius: f64, // radius (extent / softening)
}

impl Particle {
    pub fn new(name: impl Into<String>, x: NVec3, v: NVec3, m: f64, radius: f64) -> Self {
        Self {
            name: name.into(),
            x,
            v,
            m,
            radius,
        }
    }

    /// Reject non-physical mass or radius
    pub fn validate(&self) -> Result<()> {
        if !self.m.is_finite() || self.m < 0.0 {
            return Err(BridgeError::InvalidConfiguration(format!(
                "particle '{}' has mass {}",
                self.name, self.m
            )));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(BridgeError::InvalidConfiguration(format!(
                "particle '{}' has radius {}",
                self.name, self.radius
            )));
        }
        Ok(())
    }

    /// 0.5 * m * |v|^2
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.m * self.v.norm_squared()
    }

    /// m * v
    pub fn momentum(&self) -> NVec3 {
        self.m * self.v
    }
}

/// Kinematic state of one member at a substep boundary.
/// The coupler takes one before every substep so a failed substep can be undone.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub model_time: f64,
    pub particles: Vec<Particle>,
}
