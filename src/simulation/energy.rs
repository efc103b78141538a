//! Energy and momentum diagnostics over a bridge.
//!
//! Nothing here is stored between calls: every quantity is recomputed from
//! the members' current state. The driver keeps an initial [`EnergySnapshot`]
//! and compares later ones against it with [`EnergySnapshot::relative_drift`].

use serde::Deserialize;

use crate::simulation::bridge::BridgeCoupler;
use crate::simulation::error::{BridgeError, Result};
use crate::simulation::states::NVec3;

/// How the potential energy of bridged members is accounted for.
/// The two conventions describe different quantities and are never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyConvention {
    /// Internal energy of each member plus the energy of each particle in
    /// the fields of the members it is coupled to. A pair coupled both ways
    /// is counted once (each direction weighted 1/2).
    #[default]
    External,
    /// Each member's binding energy in its own field (`m Φ_own`), falling
    /// back to its internal energy when it defines none. No coupling term.
    SelfBinding,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergySnapshot {
    pub kinetic: f64,
    pub potential: f64, // internal + interaction
    pub internal: f64, // sum of members' own potential energies
    pub interaction: f64, // coupling energy, zero under `SelfBinding`
}

impl EnergySnapshot {
    pub fn total(&self) -> f64 {
        self.kinetic + self.potential
    }

    /// `((Ek - Ek0) + (Ep - Ep0)) / (Ek + Ep)`
    ///
    /// Falls back to the absolute change when the current total is zero.
    pub fn relative_drift(&self, initial: &EnergySnapshot) -> f64 {
        let change = (self.kinetic - initial.kinetic) + (self.potential - initial.potential);
        let total = self.total();
        if total == 0.0 {
            change
        } else {
            change / total
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnergyTracker {
    convention: EnergyConvention,
}

impl EnergyTracker {
    pub fn new(convention: EnergyConvention) -> Self {
        Self { convention }
    }

    pub fn convention(&self) -> EnergyConvention {
        self.convention
    }

    /// Reject a bridge whose energy is not finite under this convention,
    /// e.g. `SelfBinding` with an unsoftened point-mass source (`m Φ(0)`).
    pub fn check(&self, bridge: &BridgeCoupler) -> Result<()> {
        if self.convention == EnergyConvention::SelfBinding {
            for member in bridge.members() {
                if let Some(e) = member.self_energy().filter(|e| !e.is_finite()) {
                    return Err(BridgeError::InvalidConfiguration(format!(
                        "self-binding energy of '{}' is {e}; soften or extend its field",
                        member.label()
                    )));
                }
            }
        }
        let snapshot = self.measure(bridge);
        if !snapshot.total().is_finite() {
            return Err(BridgeError::InvalidConfiguration(format!(
                "initial energy is not finite ({:?})",
                snapshot
            )));
        }
        Ok(())
    }

    pub fn measure(&self, bridge: &BridgeCoupler) -> EnergySnapshot {
        let kinetic: f64 = bridge.members().iter().map(|m| m.kinetic_energy()).sum();

        let (internal, interaction) = match self.convention {
            EnergyConvention::External => {
                let internal: f64 = bridge.members().iter().map(|m| m.potential_energy()).sum();
                (internal, interaction_energy(bridge))
            }
            EnergyConvention::SelfBinding => {
                let internal: f64 = bridge
                    .members()
                    .iter()
                    .map(|m| m.self_energy().unwrap_or_else(|| m.potential_energy()))
                    .sum();
                (internal, 0.0)
            }
        };

        EnergySnapshot {
            kinetic,
            potential: internal + interaction,
            internal,
            interaction,
        }
    }
}

/// `Σ_(i feels j) w_ij Σ_{p in i} m_p Φ_j(x_p)`, `w_ij = 1/2` when `(j, i)`
/// is coupled too
pub fn interaction_energy(bridge: &BridgeCoupler) -> f64 {
    let edges = bridge.couplings();
    let members = bridge.members();

    edges
        .iter()
        .map(|&(receiver, source)| {
            let weight = if edges.contains(&(source, receiver)) { 0.5 } else { 1.0 };
            let field = &members[source];
            let felt: f64 = members[receiver]
                .particles()
                .iter()
                .map(|p| p.m * field.potential_at(&p.x))
                .sum();
            weight * felt
        })
        .sum()
}

pub fn total_mass(bridge: &BridgeCoupler) -> f64 {
    bridge
        .members()
        .iter()
        .flat_map(|m| m.particles())
        .map(|p| p.m)
        .sum()
}

/// Mass-weighted mean position; the origin for a massless system
pub fn center_of_mass(bridge: &BridgeCoupler) -> NVec3 {
    let mass = total_mass(bridge);
    if mass == 0.0 {
        return NVec3::zeros();
    }
    let weighted: NVec3 = bridge
        .members()
        .iter()
        .flat_map(|m| m.particles())
        .fold(NVec3::zeros(), |acc, p| acc + p.m * p.x);
    weighted / mass
}

/// Compute total linear momentum: sum_i m_i * v_i
pub fn total_momentum(bridge: &BridgeCoupler) -> NVec3 {
    bridge
        .members()
        .iter()
        .flat_map(|m| m.particles())
        .fold(NVec3::zeros(), |acc, p| acc + p.momentum())
}
