//! Fixed-step time integration helpers
//!
//! - [`substep_ends`] splits an interval into whole steps plus a final
//!   partial step; both the bridge and `DirectNBody` walk time with it
//! - [`verlet_integrator_3d`] is one kick-drift-kick step of a particle group
//!   under an [`AccelSet3`]

use super::forces::AccelSet3;
use super::states::{NVec3, Particle};

/// Relative slack (in units of the step) below which a leftover sliver is
/// merged into the previous step instead of becoming its own substep
pub const SUBSTEP_TOLERANCE: f64 = 1.0e-9;

/// End times of the substeps covering `from -> to` with step `step`.
///
/// Whole steps come first, then one partial step if the remainder is not
/// negligible. The last value is exactly `to`, so clocks that are set from
/// these values land on the target without accumulated rounding.
/// Yields nothing when `to <= from`.
pub fn substep_ends(from: f64, to: f64, step: f64) -> impl Iterator<Item = f64> {
    let span = to - from;
    let count = if span > 0.0 && step > 0.0 {
        let ratio = span / step;
        let mut whole = ratio.floor();
        if ratio - whole > 1.0 - SUBSTEP_TOLERANCE {
            whole += 1.0;
        }
        let partial = span - whole * step > SUBSTEP_TOLERANCE * step;
        (whole as usize + partial as usize).max(1)
    } else {
        0
    };

    (1..=count).map(move |k| if k == count { to } else { from + k as f64 * step })
}

/// Advance `particles` by one step using velocity-Verlet.
/// Uses two force evaluations per step and updates positions and velocities
/// in place; `t` is the time at the start of the step.
pub fn verlet_integrator_3d(particles: &mut [Particle], forces: &AccelSet3, t: f64, dt: f64) {
    let n = particles.len();
    if n == 0 { // no particles, return
        return;
    }
    let half_dt = 0.5 * dt; // half step dt/2

    // a_n from x_n at time t_n
    let mut a_old = vec![NVec3::zeros(); n];
    forces.accumulate_accels(t, particles, &mut a_old);

    // Kick: v_n+1/2 = v_n + (1/2 * dt) * a_n
    for (p, a) in particles.iter_mut().zip(a_old.iter()) {
        p.v += half_dt * *a;
    }

    // Drift: full-step position: x_n+1 = x_n + dt v_n+1/2
    for p in particles.iter_mut() {
        p.x += dt * p.v;
    }

    // a_n+1 from x_n+1 at time t_n+1
    let mut a_new = vec![NVec3::zeros(); n];
    forces.accumulate_accels(t + dt, particles, &mut a_new);

    // Second kick: v_n+1 = v_half + (dt/2) * a_n+1
    for (p, a) in particles.iter_mut().zip(a_new.iter()) {
        p.v += half_dt * *a;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_steps_land_exactly_on_target() {
        let ends: Vec<f64> = substep_ends(0.0, 1.0, 0.01).collect();
        assert_eq!(ends.len(), 100);
        assert_eq!(*ends.last().unwrap(), 1.0);
    }

    #[test]
    fn remainder_becomes_partial_step() {
        let ends: Vec<f64> = substep_ends(0.0, 0.25, 0.1).collect();
        assert_eq!(ends.len(), 3);
        assert!((ends[1] - 0.2).abs() < 1e-15);
        assert_eq!(ends[2], 0.25);
    }

    #[test]
    fn short_interval_is_one_partial_step() {
        let ends: Vec<f64> = substep_ends(1.0, 1.05, 0.1).collect();
        assert_eq!(ends, vec![1.05]);
    }

    #[test]
    fn empty_or_backward_interval_yields_nothing() {
        assert_eq!(substep_ends(2.0, 2.0, 0.1).count(), 0);
        assert_eq!(substep_ends(2.0, 1.0, 0.1).count(), 0);
    }
}
