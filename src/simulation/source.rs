//! A particle (or homogeneous group) carrying an analytic field
//!
//! `ForceSource` binds one [`PotentialField`] to the kinematic state of its
//! particles. Its own dynamics are a pure drift; everything it feels comes
//! from the bridge kicks. Field queries are answered in the frame of the
//! reference particle (the first one registered), so the field travels with
//! its owner.

use log::debug;

use crate::simulation::error::{BridgeError, Result};
use crate::simulation::member::BridgeMember;
use crate::simulation::potentials::PotentialField;
use crate::simulation::states::{Checkpoint, NVec3, Particle};

pub struct ForceSource {
    label: String,
    particles: Vec<Particle>,
    field: Box<dyn PotentialField>,
    model_time: f64,
}

impl ForceSource {
    pub fn new(field: Box<dyn PotentialField>) -> Self {
        Self {
            label: String::from("source"),
            particles: Vec::new(),
            field,
            model_time: 0.0,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Start the source's clock somewhere other than t = 0
    pub fn starting_at(mut self, t: f64) -> Self {
        self.model_time = t;
        self
    }

    /// Register a particle. The first one sizes the field; a group must be
    /// homogeneous, so later particles have to match its mass and radius.
    pub fn add_particle(&mut self, particle: Particle) -> Result<()> {
        particle.validate()?;
        match self.particles.first() {
            None => self.field.set_parameters(particle.m, particle.radius)?,
            Some(reference) if reference.m != particle.m || reference.radius != particle.radius => {
                return Err(BridgeError::InvalidConfiguration(format!(
                    "{}: '{}' (m = {}, radius = {}) does not match reference '{}' (m = {}, radius = {})",
                    self.label,
                    particle.name,
                    particle.m,
                    particle.radius,
                    reference.name,
                    reference.m,
                    reference.radius
                )));
            }
            Some(_) => {}
        }
        debug!(
            "{}: added '{}' (m = {}, radius = {})",
            self.label, particle.name, particle.m, particle.radius
        );
        self.particles.push(particle);
        Ok(())
    }

    /// Re-sync the field after the reference particle's mass or radius changed
    pub fn refresh_parameters(&mut self) -> Result<()> {
        let Some(reference) = self.particles.first() else {
            return Ok(());
        };
        reference.validate()?;
        self.field.set_parameters(reference.m, reference.radius)
    }

    /// Drift every particle in a straight line to `target_time`
    pub fn evolve(&mut self, target_time: f64) -> Result<()> {
        if !(target_time >= self.model_time) {
            return Err(BridgeError::InvalidTimeOrder {
                requested: target_time,
                current: self.model_time,
            });
        }

        let dt = target_time - self.model_time;
        for p in self.particles.iter_mut() {
            p.x += p.v * dt;
        }
        self.model_time = target_time;
        Ok(())
    }

    pub fn reference(&self) -> Option<&Particle> {
        self.particles.first()
    }

    /// Field centre: the reference particle, or the origin while empty
    pub fn centre(&self) -> NVec3 {
        self.particles.first().map_or_else(NVec3::zeros, |p| p.x)
    }

    pub fn field(&self) -> &dyn PotentialField {
        self.field.as_ref()
    }

    pub fn field_mut(&mut self) -> &mut dyn PotentialField {
        self.field.as_mut()
    }

    pub fn potential_at(&self, point: &NVec3) -> f64 {
        self.field.potential(&(point - self.centre()))
    }

    pub fn gravity_at(&self, point: &NVec3) -> Result<NVec3> {
        self.field.gravity(&(point - self.centre()))
    }
}

impl BridgeMember for ForceSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn model_time(&self) -> f64 {
        self.model_time
    }

    fn evolve_model(&mut self, t: f64) -> Result<()> {
        self.evolve(t)
    }

    fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// A lone analytic source has no internal potential energy
    fn potential_energy(&self) -> f64 {
        0.0
    }

    /// `Σ m · Φ_own(x)`; for the reference particle this is `m Φ(0)`,
    /// finite only for a softened or extended field
    fn self_energy(&self) -> Option<f64> {
        Some(self.particles.iter().map(|p| p.m * self.potential_at(&p.x)).sum())
    }

    fn potential_at(&self, point: &NVec3) -> f64 {
        ForceSource::potential_at(self, point)
    }

    fn gravity_at(&self, point: &NVec3) -> Result<NVec3> {
        ForceSource::gravity_at(self, point)
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.model_time = checkpoint.model_time;
        self.particles = checkpoint.particles;
    }

    fn stop(&mut self) {
        self.field.stop();
    }
}
