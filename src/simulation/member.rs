//! The contract every bridged gravity source honours.
//!
//! The coupler never looks at a concrete member. It only needs to:
//! - drift a member to a time (`evolve_model`),
//! - read and kick its particles,
//! - ask for its potential / gravity at foreign points,
//! - read its energies,
//! - checkpoint and restore it around a substep,
//! - stop it.
//!
//! Analytic sources ([`ForceSource`](crate::simulation::source::ForceSource))
//! and integrators wrapping their own particle group
//! ([`DirectNBody`](crate::simulation::direct::DirectNBody)) both implement it.

use crate::simulation::error::Result;
use crate::simulation::states::{Checkpoint, NVec3, Particle};

pub trait BridgeMember: Send {
    /// Label used in logs
    fn label(&self) -> &str;

    /// Time through which the member's state has been advanced
    fn model_time(&self) -> f64;

    /// Advance the member's own dynamics to `t`; never backwards
    fn evolve_model(&mut self, t: f64) -> Result<()>;

    fn particles(&self) -> &[Particle];

    /// Write access for the coupler's velocity kicks
    fn particles_mut(&mut self) -> &mut [Particle];

    fn kinetic_energy(&self) -> f64 {
        self.particles().iter().map(Particle::kinetic_energy).sum()
    }

    /// Internal potential energy of the member (excludes bridge couplings)
    fn potential_energy(&self) -> f64;

    /// Binding energy of the member in its own field, if it defines one
    fn self_energy(&self) -> Option<f64> {
        None
    }

    /// Potential per unit mass this member sources at a foreign point
    fn potential_at(&self, point: &NVec3) -> f64;

    /// Acceleration this member sources at a foreign point
    fn gravity_at(&self, point: &NVec3) -> Result<NVec3>;

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            model_time: self.model_time(),
            particles: self.particles().to_vec(),
        }
    }

    /// Put the member back to a state produced by `checkpoint`
    fn restore(&mut self, checkpoint: Checkpoint);

    fn stop(&mut self);
}
