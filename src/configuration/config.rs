//! Configuration types for loading bridged scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`BridgeConfig`]     – substep, reporting interval, end time, coupling, energy convention
//! - [`ParametersConfig`] – physical constants and the finite-difference scheme
//! - [`SourceConfig`]     – the gravity sources, each with its bodies
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! A binary where one star carries a point-mass field and a small cluster is
//! integrated directly:
//!
//! ```yaml
//! bridge:
//!   report_interval: 0.25   # driver step between reports
//!   t_end: 10.0             # total simulation time
//!   timestep: 0.125         # optional, defaults to report_interval / 2
//!   coupling: fully_connected   # or { pairs: [[0, 1], [1, 0]] }
//!   energy: external        # or self_binding
//!
//! parameters:
//!   G: 1.0                  # gravitational constant
//!   differencing: forward   # or central
//!
//! sources:
//!   - kind: field           # one analytic source per body
//!     field: point          # or plummer
//!     epsilon2: 0.0
//!     bodies:
//!       - name: star
//!         x: [ 1.0, 0.0, 0.0 ]
//!         v: [ 0.0, 1.0, 0.0 ]
//!         m: 1.0
//!         radius: 0.001
//!   - kind: direct          # one member integrating its bodies directly
//!     eps2: 1.0e-4
//!     h0: 0.001
//!     bodies:
//!       - x: [ 0.0, 0.0, 0.0 ]
//!         v: [ 0.0, 0.0, 0.0 ]
//!         m: 1.0
//!         radius: 0.001
//! ```
//!
//! The runner then maps this configuration into its runtime types
//! (`Parameters`, `BridgeCoupler`, members).

use std::io::Read;

use serde::Deserialize;

use crate::simulation::energy::EnergyConvention;
use crate::simulation::params::Coupling;
use crate::simulation::potentials::{Differencing, FieldKind};

/// Bridge and driver-loop configuration
#[derive(Deserialize, Debug, Clone)]
pub struct BridgeConfig {
    pub report_interval: f64, // driver step between reports
    pub t_end: f64, // time end
    #[serde(default)]
    pub t_start: f64, // model time of the initial conditions
    pub timestep: Option<f64>, // bridge substep, half the report interval when absent
    #[serde(default)]
    pub coupling: Coupling, // who feels whom
    #[serde(default)]
    pub energy: EnergyConvention, // potential energy bookkeeping
}

/// Physical constants and numerical scheme shared by all sources
#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    #[serde(default = "unit_g")]
    pub G: f64, // gravitational constant
    #[serde(default)]
    pub differencing: Differencing, // gradient of analytic fields
}

fn unit_g() -> f64 {
    1.0
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            G: unit_g(),
            differencing: Differencing::default(),
        }
    }
}

/// Initial state of a single body
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub name: Option<String>, // label, generated from the index when absent
    pub x: Vec<f64>, // initial position
    pub v: Vec<f64>, // initial velocity
    pub m: f64, // mass
    #[serde(default)]
    pub radius: f64, // radius, the scale length of its field
}

/// One entry of the `sources` list
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// One analytic `ForceSource` per body
    Field {
        field: FieldKind,
        #[serde(default)]
        epsilon2: f64,
        bodies: Vec<BodyConfig>,
    },
    /// One `DirectNBody` member holding all bodies
    Direct {
        #[serde(default)]
        eps2: f64,
        h0: f64,
        bodies: Vec<BodyConfig>,
    },
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub parameters: ParametersConfig,
    pub sources: Vec<SourceConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_reader(reader)
    }
}
