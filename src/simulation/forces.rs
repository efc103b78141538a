//! Internal force contributors for particle groups
//!
//! Defines the acceleration trait used by integrators that own a group of
//! particles (see `DirectNBody`), plus softened direct-summation Newtonian
//! gravity. Forces between *members* of a bridge never go through here; those
//! are exchanged as field evaluations by the coupler.

use crate::simulation::states::{NVec3, Particle};

/// Collection of acceleration terms (gravity, drag, etc)
/// Each term implements [`Acceleration3`] and their contributions are summed
/// into a single acceleration vector per particle
pub struct AccelSet3 {
    terms: Vec<Box<dyn Acceleration3>>,
}

impl AccelSet3 {
    /// Constructor
    pub fn new() -> Self {
        Self {
            terms: Vec::new(),
        }
    }

    /// Add an acceleration term
    pub fn with(mut self, term: impl Acceleration3 + 'static) -> Self {
        self.terms.push(Box::new(term));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Compute total accelerations at time `t` for all `particles`
    /// - `out[i]` will be set to the sum of contributions from all terms
    pub fn accumulate_accels(&self, t: f64, particles: &[Particle], out: &mut [NVec3]) {
        // Zero buffer
        for a in out.iter_mut() {
            *a = NVec3::zeros();
        }
        // Iterate over all acceleration contributors
        for term in &self.terms {
            term.acceleration(t, particles, out);
        }
    }
}

impl Default for AccelSet3 {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for acceleration sources acting inside one particle group
/// Implementations add their contribution into `out[i]` for each particle
pub trait Acceleration3: Send {
    fn acceleration(&self, t: f64, particles: &[Particle], out: &mut [NVec3]);
}

/// Newtonian gravity with softening (direct n^2 sum)
/// Uses particle radius and eps2 to smooth close encounters
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy)]
pub struct NewtonianGravity3 {
    pub G: f64, // gravitational constant
    pub eps2: f64, // softening floor
}

impl NewtonianGravity3 {
    /// Per-pair softening: mean of the squared radii plus the global floor
    pub fn pair_softening2(&self, ri: f64, rj: f64) -> f64 {
        0.5 * (ri * ri + rj * rj) + self.eps2
    }

    /// Pairwise potential energy `-Σ_{i<j} G m_i m_j / |r_soft|`,
    /// softened exactly like the forces so the pair stays conservative
    pub fn potential_energy(&self, particles: &[Particle]) -> f64 {
        let n = particles.len();
        let mut u = 0.0;

        for i in 0..n {
            let pi = &particles[i];
            for j in (i + 1)..n {
                let pj = &particles[j];
                let d2 = (pj.x - pi.x).norm_squared() + self.pair_softening2(pi.radius, pj.radius);
                u -= self.G * pi.m * pj.m / d2.sqrt();
            }
        }

        u
    }
}

impl Acceleration3 for NewtonianGravity3 {
    fn acceleration(&self, _t: f64, particles: &[Particle], out: &mut [NVec3]) {
        let n = particles.len();
        if n == 0 { // No particles, return
            return;
        }

        // Loop over each unordered pair (i, j) with i < j
        for i in 0..n {
            let pi = &particles[i];
            for j in (i + 1)..n {
                let pj = &particles[j];

                // r points from i to j: i is pulled along +r, j along -r
                let r = pj.x - pi.x;

                // softened squared distance |r|^2 + soft^2
                let d2 = r.norm_squared() + self.pair_softening2(pi.radius, pj.radius);

                // G / |r_soft|^3
                let inv_r = d2.sqrt().recip();
                let coef = self.G * inv_r * inv_r * inv_r;

                // a_i +=  G m_j r / |r_soft|^3
                // a_j += -G m_i r / |r_soft|^3
                out[i] += coef * pj.m * r;
                out[j] -= coef * pi.m * r;
            }
        }
    }
}
