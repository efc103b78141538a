//! Numerical and physical parameters for a bridged run
//!
//! `BridgeParameters` is what the coupler is constructed with:
//! - substep size,
//! - coupling graph (who feels whom),
//! - start time
//!
//! `Parameters` wraps it with the driver-level settings: end time, reporting
//! interval, gravitational constant and the finite-difference scheme used by
//! analytic fields.

use serde::Deserialize;

use crate::simulation::error::{BridgeError, Result};
use crate::simulation::potentials::Differencing;

/// Which members feel which.
/// A pair `(i, j)` means member `i` feels the field sourced by member `j`
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coupling {
    /// Every member feels every other member, no self-loops
    #[default]
    FullyConnected,
    /// Explicit ordered pairs
    Pairs(Vec<(usize, usize)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BridgeParameters {
    pub timestep: f64, // substep size
    pub coupling: Coupling, // coupling graph
    pub t_start: f64, // model time before the first advance
}

impl BridgeParameters {
    pub fn new(timestep: f64) -> Self {
        Self {
            timestep,
            coupling: Coupling::FullyConnected,
            t_start: 0.0,
        }
    }

    pub fn with_coupling(mut self, coupling: Coupling) -> Self {
        self.coupling = coupling;
        self
    }

    pub fn starting_at(mut self, t_start: f64) -> Self {
        self.t_start = t_start;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.timestep.is_finite() || self.timestep <= 0.0 {
            return Err(BridgeError::InvalidConfiguration(format!(
                "bridge timestep must be positive, got {}",
                self.timestep
            )));
        }
        if !self.t_start.is_finite() {
            return Err(BridgeError::InvalidConfiguration(format!(
                "start time must be finite, got {}",
                self.t_start
            )));
        }
        Ok(())
    }
}

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub t_end: f64, // time end
    pub report_interval: f64, // driver step between reports
    pub G: f64, // gravitational constant
    pub differencing: Differencing, // gradient scheme of analytic fields
    pub bridge: BridgeParameters,
}

impl Parameters {
    pub fn validate(&self) -> Result<()> {
        self.bridge.validate()?;
        if !self.report_interval.is_finite() || self.report_interval <= 0.0 {
            return Err(BridgeError::InvalidConfiguration(format!(
                "report interval must be positive, got {}",
                self.report_interval
            )));
        }
        if !self.t_end.is_finite() || self.t_end < self.bridge.t_start {
            return Err(BridgeError::InvalidConfiguration(format!(
                "end time {} lies before start time {}",
                self.t_end, self.bridge.t_start
            )));
        }
        if !self.G.is_finite() || self.G < 0.0 {
            return Err(BridgeError::InvalidConfiguration(format!(
                "gravitational constant must be non-negative, got {}",
                self.G
            )));
        }
        Ok(())
    }
}
