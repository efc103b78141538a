//! Bridge coupling of independent gravity members
//!
//! The coupler owns an ordered list of [`BridgeMember`]s and a directed
//! coupling graph. Each substep of size `dt` is a kick-drift-kick split:
//!
//! 1. kick: every member's particles receive `a·dt/2`, where `a` is the sum of
//!    the fields of all partners it is coupled to, evaluated at the pre-drift
//!    positions,
//! 2. drift: every member runs its own dynamics to `t + dt`,
//! 3. kick: accelerations are recomputed at the new positions and the second
//!    half kick is applied.
//!
//! Accelerations for a kick are gathered for all members before any velocity
//! is written, so the order of partners never matters. A substep that fails
//! is rolled back, leaving every member at the last completed boundary.

use log::{debug, info, warn};

use crate::simulation::error::{BridgeError, Result};
use crate::simulation::integrator::substep_ends;
use crate::simulation::member::BridgeMember;
use crate::simulation::params::{BridgeParameters, Coupling};
use crate::simulation::states::{Checkpoint, NVec3, Particle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouplerState {
    /// No evolution performed yet; members and couplings may still change
    Idle,
    /// Has advanced at least once
    Stepping,
    /// Terminal, members have been stopped
    Stopped,
}

pub struct BridgeCoupler {
    members: Vec<Box<dyn BridgeMember>>,
    params: BridgeParameters,
    model_time: f64,
    state: CouplerState,
}

impl BridgeCoupler {
    pub fn new(params: BridgeParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            model_time: params.t_start,
            members: Vec::new(),
            params,
            state: CouplerState::Idle,
        })
    }

    /// Register a member; returns its index in the coupling graph
    pub fn add_member(&mut self, member: Box<dyn BridgeMember>) -> Result<usize> {
        self.ensure_idle("add a member")?;
        if member.model_time() != self.model_time {
            return Err(BridgeError::InvalidConfiguration(format!(
                "member '{}' starts at t = {} but the bridge starts at t = {}",
                member.label(),
                member.model_time(),
                self.model_time
            )));
        }
        debug!("bridge: member {} = '{}'", self.members.len(), member.label());
        self.members.push(member);
        Ok(self.members.len() - 1)
    }

    /// Let member `i` feel member `j`.
    /// The first explicit coupling replaces the fully-connected default.
    pub fn add_coupling(&mut self, i: usize, j: usize) -> Result<()> {
        self.ensure_idle("change couplings")?;
        check_pair(i, j, self.members.len())?;

        if let Coupling::Pairs(pairs) = &mut self.params.coupling {
            if !pairs.contains(&(i, j)) {
                pairs.push((i, j));
            }
        } else {
            self.params.coupling = Coupling::Pairs(vec![(i, j)]);
        }
        Ok(())
    }

    /// Resolved coupling graph as ordered `(receiver, source)` pairs
    pub fn couplings(&self) -> Vec<(usize, usize)> {
        match &self.params.coupling {
            Coupling::FullyConnected => {
                let n = self.members.len();
                (0..n)
                    .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
                    .collect()
            }
            Coupling::Pairs(pairs) => pairs.clone(),
        }
    }

    /// Every coupling must join two distinct registered members
    pub fn validate_couplings(&self) -> Result<()> {
        for (i, j) in self.couplings() {
            check_pair(i, j, self.members.len())?;
        }
        Ok(())
    }

    pub fn timestep(&self) -> f64 {
        self.params.timestep
    }

    pub fn set_timestep(&mut self, timestep: f64) -> Result<()> {
        let candidate = BridgeParameters {
            timestep,
            ..self.params.clone()
        };
        candidate.validate()?;
        self.params = candidate;
        Ok(())
    }

    pub fn model_time(&self) -> f64 {
        self.model_time
    }

    pub fn state(&self) -> CouplerState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Box<dyn BridgeMember>] {
        &self.members
    }

    pub fn member(&self, index: usize) -> Option<&dyn BridgeMember> {
        self.members.get(index).map(|m| &**m)
    }

    /// Copy of every member's particles, in member order
    pub fn particles(&self) -> Vec<Particle> {
        self.members
            .iter()
            .flat_map(|m| m.particles().iter().cloned())
            .collect()
    }

    pub fn positions(&self) -> Vec<NVec3> {
        self.members
            .iter()
            .flat_map(|m| m.particles().iter().map(|p| p.x))
            .collect()
    }

    /// Advance the coupled system to `target_time`
    pub fn advance(&mut self, target_time: f64) -> Result<()> {
        if self.state == CouplerState::Stopped {
            return Err(BridgeError::Stopped);
        }
        if !(target_time >= self.model_time) {
            return Err(BridgeError::InvalidTimeOrder {
                requested: target_time,
                current: self.model_time,
            });
        }
        self.check_consistency()?;

        self.validate_couplings()?;
        let edges = self.couplings();

        if target_time > self.model_time {
            self.state = CouplerState::Stepping;
        }
        let t_begin = self.model_time;
        let mut substeps = 0usize;

        for t_next in substep_ends(self.model_time, target_time, self.params.timestep) {
            let checkpoints: Vec<Checkpoint> = self.members.iter().map(|m| m.checkpoint()).collect();

            if let Err(err) = self.substep(&edges, t_next) {
                warn!(
                    "bridge: substep {} -> {} failed ({err}); rolling back",
                    self.model_time, t_next
                );
                for (member, checkpoint) in self.members.iter_mut().zip(checkpoints) {
                    member.restore(checkpoint);
                }
                return Err(err);
            }

            self.model_time = t_next;
            substeps += 1;
        }

        self.check_consistency()?;
        debug!(
            "bridge: advanced {} -> {} in {} substeps",
            t_begin, self.model_time, substeps
        );
        Ok(())
    }

    /// Stop every member in registration order. Idempotent.
    pub fn stop(&mut self) {
        if self.state == CouplerState::Stopped {
            return;
        }
        for member in self.members.iter_mut() {
            member.stop();
        }
        self.state = CouplerState::Stopped;
        info!("bridge: stopped at t = {}", self.model_time);
    }

    fn ensure_idle(&self, action: &str) -> Result<()> {
        match self.state {
            CouplerState::Idle => Ok(()),
            CouplerState::Stopped => Err(BridgeError::Stopped),
            CouplerState::Stepping => Err(BridgeError::InvalidConfiguration(format!(
                "cannot {action} once the bridge has advanced"
            ))),
        }
    }

    fn check_consistency(&self) -> Result<()> {
        for (index, member) in self.members.iter().enumerate() {
            if member.model_time() != self.model_time {
                return Err(BridgeError::StateConsistency {
                    member: index,
                    member_time: member.model_time(),
                    coupler_time: self.model_time,
                });
            }
        }
        Ok(())
    }

    /// One kick-drift-kick substep ending at `t_next`
    fn substep(&mut self, edges: &[(usize, usize)], t_next: f64) -> Result<()> {
        let half_dt = 0.5 * (t_next - self.model_time);

        self.kick(edges, half_dt)?;
        for member in self.members.iter_mut() {
            member.evolve_model(t_next)?;
        }
        self.kick(edges, half_dt)
    }

    fn kick(&mut self, edges: &[(usize, usize)], dt: f64) -> Result<()> {
        let accelerations = self.accelerations(edges)?;

        for (member, accs) in self.members.iter_mut().zip(accelerations) {
            for (p, a) in member.particles_mut().iter_mut().zip(accs) {
                p.v += a * dt;
            }
        }
        Ok(())
    }

    /// Acceleration of every particle of every member from its partners
    fn accelerations(&self, edges: &[(usize, usize)]) -> Result<Vec<Vec<NVec3>>> {
        let mut out: Vec<Vec<NVec3>> = self
            .members
            .iter()
            .map(|m| vec![NVec3::zeros(); m.particles().len()])
            .collect();

        for &(receiver, source) in edges {
            let field = &self.members[source];
            for (a, p) in out[receiver].iter_mut().zip(self.members[receiver].particles()) {
                *a += field.gravity_at(&p.x)?;
            }
        }
        Ok(out)
    }
}

fn check_pair(i: usize, j: usize, n: usize) -> Result<()> {
    if i == j {
        return Err(BridgeError::InvalidConfiguration(format!(
            "member {i} cannot be coupled to itself"
        )));
    }
    if i >= n || j >= n {
        return Err(BridgeError::InvalidConfiguration(format!(
            "coupling ({i}, {j}) refers to a missing member (have {n})"
        )));
    }
    Ok(())
}
