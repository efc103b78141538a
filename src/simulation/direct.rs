//! Direct-summation N-body group as a bridge member
//!
//! `DirectNBody` owns a particle group and integrates its internal gravity
//! with fixed-step velocity-Verlet (`h0`), exactly like a self-contained
//! N-body code would. To the bridge it is just another member: it drifts
//! itself with `evolve_model`, and answers potential / gravity queries at
//! foreign points by summing over its particles.

use log::{debug, info};

use crate::simulation::error::{BridgeError, Result};
use crate::simulation::forces::{AccelSet3, NewtonianGravity3};
use crate::simulation::integrator::{substep_ends, verlet_integrator_3d};
use crate::simulation::member::BridgeMember;
use crate::simulation::states::{Checkpoint, NVec3, Particle};

pub struct DirectNBody {
    label: String,
    particles: Vec<Particle>,
    gravity: NewtonianGravity3,
    forces: AccelSet3,
    h0: f64, // internal step size
    model_time: f64,
}

impl DirectNBody {
    #[allow(non_snake_case)]
    pub fn new(G: f64, eps2: f64, h0: f64) -> Result<Self> {
        if !h0.is_finite() || h0 <= 0.0 {
            return Err(BridgeError::InvalidConfiguration(format!(
                "direct N-body step must be positive, got {h0}"
            )));
        }
        if !eps2.is_finite() || eps2 < 0.0 {
            return Err(BridgeError::InvalidConfiguration(format!(
                "direct N-body softening must be non-negative, got {eps2}"
            )));
        }

        let gravity = NewtonianGravity3 { G, eps2 };
        Ok(Self {
            label: String::from("direct"),
            particles: Vec::new(),
            gravity,
            forces: AccelSet3::new().with(gravity),
            h0,
            model_time: 0.0,
        })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn starting_at(mut self, t: f64) -> Self {
        self.model_time = t;
        self
    }

    pub fn add_particle(&mut self, particle: Particle) -> Result<()> {
        particle.validate()?;
        self.particles.push(particle);
        Ok(())
    }

    pub fn add_particles(&mut self, particles: impl IntoIterator<Item = Particle>) -> Result<()> {
        for p in particles {
            self.add_particle(p)?;
        }
        Ok(())
    }

    pub fn step_size(&self) -> f64 {
        self.h0
    }

    /// Softened squared distance between a group particle and a foreign point
    fn softened_d2(&self, p: &Particle, point: &NVec3) -> f64 {
        (p.x - point).norm_squared() + self.gravity.pair_softening2(p.radius, 0.0)
    }
}

impl BridgeMember for DirectNBody {
    fn label(&self) -> &str {
        &self.label
    }

    fn model_time(&self) -> f64 {
        self.model_time
    }

    fn evolve_model(&mut self, t: f64) -> Result<()> {
        if !(t >= self.model_time) {
            return Err(BridgeError::InvalidTimeOrder {
                requested: t,
                current: self.model_time,
            });
        }

        let mut t_cur = self.model_time;
        for t_next in substep_ends(self.model_time, t, self.h0) {
            verlet_integrator_3d(&mut self.particles, &self.forces, t_cur, t_next - t_cur);
            t_cur = t_next;
        }
        self.model_time = t;
        Ok(())
    }

    fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    fn potential_energy(&self) -> f64 {
        self.gravity.potential_energy(&self.particles)
    }

    fn potential_at(&self, point: &NVec3) -> f64 {
        self.particles
            .iter()
            .map(|p| -self.gravity.G * p.m / self.softened_d2(p, point).sqrt())
            .sum()
    }

    fn gravity_at(&self, point: &NVec3) -> Result<NVec3> {
        let mut acc = NVec3::zeros();
        for p in &self.particles {
            let d2 = self.softened_d2(p, point);
            if d2 == 0.0 {
                debug!("{}: gravity queried on top of '{}'", self.label, p.name);
                return Err(BridgeError::DegenerateQuery);
            }
            let inv_r = d2.sqrt().recip();
            acc += self.gravity.G * p.m * inv_r * inv_r * inv_r * (p.x - point);
        }
        Ok(acc)
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.model_time = checkpoint.model_time;
        self.particles = checkpoint.particles;
    }

    fn stop(&mut self) {
        info!("{}: stopped at t = {} with {} particles", self.label, self.model_time, self.particles.len());
    }
}
